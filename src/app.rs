//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - reads parameter lists / descriptor files
//! - runs the decoder, the classifier, or a batch
//! - prints or writes the results

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::classify::{ModelQuery, classify};
use crate::cli::{BatchArgs, Command, DecodeArgs, OutputFormat, StatisticArgs};
use crate::decode::{DecodeHints, NamingScheme, decode};
use crate::domain::statistic_token;
use crate::error::AppError;

/// Entry point for the `insight` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse_from(std::env::args());
    init_tracing(cli.verbose);

    match cli.command {
        Command::Decode(args) => handle_decode(args),
        Command::Statistic(args) => handle_statistic(args),
        Command::Batch(args) => handle_batch(args),
        Command::Schemes => {
            print!("{}", crate::report::format_schemes());
            Ok(())
        }
    }
}

/// Stderr logging; `INSIGHT_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("INSIGHT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn handle_decode(args: DecodeArgs) -> Result<(), AppError> {
    let scheme = NamingScheme::lookup(&args.scheme)?.with_levels(args.levels);
    let raw = crate::io::read_parameters(&args.input)?;
    let table = decode(&raw, scheme, &hints_from_args(&args))?;

    let mut out = crate::io::open_output(args.output.as_deref())?;
    match args.format {
        OutputFormat::Table => out
            .write_all(crate::report::format_table(&table).as_bytes())
            .map_err(|e| AppError::new(2, format!("Failed to write table: {e}")))?,
        OutputFormat::Json => crate::io::write_table_json(out, scheme, &table)?,
        OutputFormat::Csv => crate::io::write_table_csv(out, &table)?,
    }
    Ok(())
}

pub fn hints_from_args(args: &DecodeArgs) -> DecodeHints {
    DecodeHints::default()
        .with_responses(args.responses.iter().cloned())
        .with_random_factors(args.random_factors.iter().cloned())
        .with_terms(args.terms.iter().cloned())
        .with_mixture(args.mixture)
}

fn handle_statistic(args: StatisticArgs) -> Result<(), AppError> {
    let query = query_from_args(&args);
    let statistic = classify(&query)?;
    if args.long {
        println!("{}", crate::report::format_statistic(&query, statistic));
    } else {
        println!("{}", statistic_token(statistic));
    }
    Ok(())
}

pub fn query_from_args(args: &StatisticArgs) -> ModelQuery {
    let mut query = ModelQuery::new(&args.class).with_columns(args.columns.iter().cloned());
    if let Some(family) = &args.family {
        query = query.with_family(family);
    }
    if let Some(link) = &args.link {
        query = query.with_link(link);
    }
    if let Some(method) = &args.test_method {
        query = query.with_test_method(method);
    }
    if !args.df.is_empty() {
        query = query.with_df(args.df.clone());
    }
    if args.multivariate {
        query = query.multivariate();
    }
    query
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let descriptors = crate::io::read_descriptors(&args.input)?;
    let results = crate::batch::run_batch(&descriptors);
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    tracing::info!(models = results.len(), failed, "batch finished");

    let out = crate::io::open_output(args.output.as_deref())?;
    crate::io::write_batch_json(out, &results)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::Statistic;

    #[test]
    fn statistic_args_become_a_query() {
        let cli = Cli::parse_from([
            "insight",
            "statistic",
            "--class",
            "glmmPQL",
            "--family",
            "poisson",
            "--column",
            "t-value",
        ]);
        let Command::Statistic(args) = cli.command else {
            panic!("expected statistic");
        };
        let query = query_from_args(&args);
        assert_eq!(query.family.as_deref(), Some("poisson"));
        assert_eq!(query.summary_columns, vec!["t-value"]);
        assert!(query.degrees_of_freedom.is_none());
        assert_eq!(classify(&query).unwrap(), Some(Statistic::Z));
    }

    #[test]
    fn decode_args_become_hints() {
        let cli = Cli::parse_from([
            "insight",
            "decode",
            "-",
            "--random-factor",
            "Subject",
            "--term",
            "s(Subject, bs = \"re\")",
            "--mixture",
        ]);
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        let hints = hints_from_args(&args);
        assert_eq!(hints.random_factors, vec!["Subject"]);
        assert_eq!(hints.terms.len(), 1);
        assert!(hints.mixture);
        assert!(hints.responses.is_empty());
    }
}
