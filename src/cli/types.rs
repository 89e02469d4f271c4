//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{batch::BatchArgs, run::RunArgs};

/// Top-level command line.
#[derive(Parser)]
#[command(name = "arcadia")]
#[command(about = "Arcadia - adaptive arcade game generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .arcadia/config.yaml plus ARCADIA_* variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a fixed number of candidates in concurrent batches
    Batch(BatchArgs),

    /// Generate one candidate at a time until enough are accepted
    Run(RunArgs),

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "arcadia", "batch", "-n", "25", "--batch-size", "10", "--json", "--seed", "7",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.count, Some(25));
                assert_eq!(args.batch_size, Some(10));
                assert_eq!(args.seed, Some(7));
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_parse_run_with_config_path() {
        let cli =
            Cli::try_parse_from(["arcadia", "--config", "custom.yaml", "run", "--target", "3"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(matches!(cli.command, Commands::Run(RunArgs { target: Some(3), .. })));
    }

    #[test]
    fn test_batch_short_flags_do_not_clash_with_config() {
        let cli = Cli::try_parse_from([
            "arcadia", "batch", "-k", "4", "-b", "8", "-c", "local.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("local.yaml")));
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.concurrency, Some(4));
                assert_eq!(args.batch_size, Some(8));
            }
            _ => panic!("expected batch"),
        }
    }
}
