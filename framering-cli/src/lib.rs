//! Framering debug tool.
//!
//! The binary is a thin wrapper: argument parsing lives in [`cli`], each
//! command in [`list`] or [`inspect`].

pub mod cli;
pub mod inspect;
pub mod list;

pub use cli::{Cli, Commands, PageArgs};

use std::path::Path;

use anyhow::Context;
use framering::Framering;
use framering_config::{load_configuration, ConfigProvider, FrameringConfig};

/// Exit code for a submission rejected by validation.
pub const VALIDATION_EXIT_CODE: i32 = 2;

/// Configuration from `path`, or discovered in the current directory.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FrameringConfig> {
    let config = match path {
        Some(path) => ConfigProvider::new().with_file(path).load()?,
        None => load_configuration(&std::env::current_dir()?)?,
    };
    Ok(config)
}

/// An initialized context holding the components defined in `file`.
pub fn load_app(config: FrameringConfig, file: &Path) -> anyhow::Result<Framering> {
    let mut app = Framering::new(config)?;
    let count = app
        .load_components_file(file)
        .with_context(|| format!("loading components from {}", file.display()))?;
    tracing::debug!(components = count, file = %file.display(), "loaded components");
    app.initialize();
    Ok(app)
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
