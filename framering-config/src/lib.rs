//! Framering configuration management using Figment
//!
//! Every option the framework recognizes lives in [`FrameringConfig`], with a
//! default for each. Configuration is merged from built-in defaults, an optional
//! `framering.{toml,yaml,yml,json}` file and `FRAMERING_`-prefixed environment
//! variables, then validated eagerly.
//!
//! ```no_run
//! use framering_config::ConfigProvider;
//!
//! let config = ConfigProvider::new()
//!     .discover_in(std::path::Path::new("."))
//!     .load()?;
//! println!("namespace: {}", config.namespace);
//! # Ok::<(), framering_config::ConfigError>(())
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export FRAMERING_META_PREFIX="site_"              # → meta_prefix
//! export FRAMERING_ALLOW_EMPTY_FIELD_VALUES="true"  # → allow_empty_field_values
//! export FRAMERING_UNKNOWN_RULE_KEYS="ignore"       # → unknown_rule_keys
//! ```

/// Error types and handling
pub mod error;
/// Figment-backed configuration provider
pub mod provider;
/// The configuration struct
pub mod types;

pub use error::ConfigError;
pub use provider::{load_configuration, ConfigFormat, ConfigProvider, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{FrameringConfig, UnknownRuleKeyPolicy};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
