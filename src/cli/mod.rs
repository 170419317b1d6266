//! Command-line parsing for the `insight` binary.
//!
//! Argument parsing and command dispatch stay separate from the decoder and
//! classifier; `app` turns these structs into library calls.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::LevelMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "insight",
    version,
    about = "Decode model parameter names and classify test statistics"
)]
pub struct Cli {
    /// Log debug events to stderr (`INSIGHT_LOG` takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode raw parameter names into a taxonomy table.
    Decode(DecodeArgs),
    /// Print the test-statistic family of a model type.
    Statistic(StatisticArgs),
    /// Classify (and optionally decode) many models from a JSON descriptor file.
    Batch(BatchArgs),
    /// List registered naming schemes and their aliases.
    Schemes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser, Clone)]
pub struct DecodeArgs {
    /// Parameter list: text (one name per line) or CSV with a `Parameter` column; `-` for stdin.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Naming scheme tag or back-end class (see `insight schemes`).
    #[arg(short, long, env = "INSIGHT_SCHEME", default_value = "generic")]
    pub scheme: String,

    /// Keep random-effect levels in their own column or fold them into the group.
    #[arg(long, value_enum, default_value_t = LevelMode::Separate)]
    pub levels: LevelMode,

    /// Response name of a multivariate model (repeatable).
    #[arg(long = "response", value_name = "NAME")]
    pub responses: Vec<String>,

    /// Declared random-effect grouping factor (repeatable).
    #[arg(long = "random-factor", value_name = "NAME")]
    pub random_factors: Vec<String>,

    /// Model term in call form, e.g. `s(Subject, bs = "re")` (repeatable).
    #[arg(long = "term", value_name = "TERM")]
    pub terms: Vec<String>,

    /// The model uses a mixture family.
    #[arg(long)]
    pub mixture: bool,

    #[arg(short, long, value_enum, env = "INSIGHT_FORMAT", default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct StatisticArgs {
    /// Back-end type tag, e.g. `lm`, `glmerMod`, `htest`.
    #[arg(long)]
    pub class: String,

    #[arg(long)]
    pub family: Option<String>,

    #[arg(long)]
    pub link: Option<String>,

    /// Hypothesis-test description (for `htest` objects).
    #[arg(long = "method")]
    pub test_method: Option<String>,

    /// Coefficient-summary column name (repeatable).
    #[arg(long = "column", value_name = "NAME")]
    pub columns: Vec<String>,

    /// Degrees of freedom (repeatable; `inf` and `nan` accepted).
    #[arg(long = "df", value_name = "X", allow_negative_numbers = true)]
    pub df: Vec<f64>,

    #[arg(long)]
    pub multivariate: bool,

    /// Print a descriptive line instead of the bare token.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    /// JSON array of model descriptors; `-` for stdin.
    #[arg(value_name = "DESCRIPTORS")]
    pub input: PathBuf,

    /// Write results to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
