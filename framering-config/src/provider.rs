//! Configuration provider using Figment

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::types::FrameringConfig;
use crate::ConfigResult;

/// Base name of discoverable configuration files.
pub const CONFIG_FILE_STEM: &str = "framering";

/// Prefix of the environment variables read by the provider.
pub const ENV_PREFIX: &str = "FRAMERING_";

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (.toml extension)
    Toml,
    /// YAML format (.yaml or .yml extensions)
    Yaml,
    /// JSON format (.json extension)
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat {
            format: ext.to_string(),
        })
    }
}

/// Loads [`FrameringConfig`] from layered sources.
///
/// Sources merge in precedence order, later ones overriding earlier ones:
/// 1. Built-in defaults
/// 2. The configuration file, when one was given or discovered
/// 3. `FRAMERING_`-prefixed environment variables
pub struct ConfigProvider {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigProvider {
    /// Create a provider that reads defaults and environment variables only
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read the given configuration file as well. The file must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Look for `framering.{toml,yaml,yml,json}` in `dir` and use the first found.
    pub fn discover_in(mut self, dir: &Path) -> Self {
        for ext in ["toml", "yaml", "yml", "json"] {
            let candidate = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            trace!(path = %candidate.display(), "probing for configuration file");
            if candidate.is_file() {
                debug!(path = %candidate.display(), "discovered configuration file");
                self.file = Some(candidate);
                break;
            }
        }
        self
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge every source, extract the configuration and validate it.
    pub fn load(&self) -> ConfigResult<FrameringConfig> {
        let figment = self.build_figment()?;
        let config: FrameringConfig = figment.extract()?;
        config.validate()?;
        debug!(
            namespace = %config.namespace,
            meta_prefix = %config.meta_prefix,
            "loaded framering configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(FrameringConfig::default()));

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            figment = match ConfigFormat::from_path(path)? {
                ConfigFormat::Toml => figment.merge(Toml::file(path)),
                ConfigFormat::Yaml => figment.merge(Yaml::file(path)),
                ConfigFormat::Json => figment.merge(Json::file(path)),
            };
        }

        // Flat keys: FRAMERING_META_PREFIX -> meta_prefix
        let figment = figment.merge(
            Env::prefixed(&self.env_prefix).map(|key| key.as_str().to_lowercase().into()),
        );

        Ok(figment)
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Load the configuration from defaults, `dir`'s configuration file and the environment.
pub fn load_configuration(dir: &Path) -> ConfigResult<FrameringConfig> {
    ConfigProvider::new().discover_in(dir).load()
}
