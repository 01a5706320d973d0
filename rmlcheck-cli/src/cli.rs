use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rmlcheck",
    about = "Consistency checks for RML/R2RML mappings",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file (defaults to ./rmlcheck.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the predicates declared by the mapping
    Predicates {
        /// Mapping document (Turtle)
        mapping: Option<PathBuf>,
    },

    /// Group declared objects by predicate
    Objects {
        /// Mapping document (Turtle)
        mapping: Option<PathBuf>,
    },

    /// Compile subject templates and match them against each other
    Templates {
        /// Mapping document (Turtle)
        mapping: Option<PathBuf>,

        #[command(flatten)]
        templates: TemplateArgs,
    },

    /// Materialize subjects for each predicate from the relational store
    Subjects {
        /// Mapping document (Turtle)
        mapping: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Run every check and produce one report
    Check {
        /// Mapping document (Turtle)
        mapping: Option<PathBuf>,

        #[command(flatten)]
        templates: TemplateArgs,

        #[command(flatten)]
        store: StoreArgs,

        /// Skip materialization even when a store is configured
        #[arg(long)]
        no_materialize: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct TemplateArgs {
    /// Value substituted for every placeholder in example identifiers
    #[arg(long)]
    pub sentinel: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct StoreArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "RMLCHECK_DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON file mapping each query to its rows (takes precedence over --database-url)
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Match every materialized identifier against its own template
    #[arg(long, conflicts_with = "no_verify")]
    pub verify: bool,

    /// Skip identifier verification even when the config file enables it
    #[arg(long)]
    pub no_verify: bool,
}

/// Report format
#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
