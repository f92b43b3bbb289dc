//! CLI definition for the framering debug tool.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Framering debug tool
///
/// Inspect component definitions, evaluate their rules against a page, and
/// render or process their forms without a host.
#[derive(Parser, Debug)]
#[command(name = "framering")]
#[command(version)]
#[command(about = "Inspect, render and process Framering components")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (defaults to framering.{toml,yaml,yml,json} in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The page a component's rules are evaluated against.
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Post type being edited
    #[arg(long)]
    pub post_type: Option<String>,
    /// The page is the home page
    #[arg(long)]
    pub home: bool,
    /// The page is an archive, of the given post type when one is named
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub archive: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered field kinds
    Fields {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the components in a definition file
    Components {
        /// YAML file holding a list of components
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate each component's rules against a page
    Check {
        /// YAML file holding a list of components
        file: PathBuf,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Render every component's fields
    Render {
        /// YAML file holding a list of components
        file: PathBuf,
        /// JSON submission payload to fill current values from
        #[arg(long)]
        values: Option<PathBuf>,
        /// Print HTML instead of JSON descriptors
        #[arg(long)]
        html: bool,
    },
    /// Process a submission payload with every component's form
    Process {
        /// YAML file holding a list of components
        file: PathBuf,
        /// JSON submission payload
        payload: PathBuf,
    },
}
