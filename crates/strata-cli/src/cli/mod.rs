//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `strata build` - Build every (or the selected) variant
//! - `strata check` - Validate the config and plan without bundling

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command};

/// strata - layered multi-variant bundle builds
#[derive(Parser, Debug)]
#[command(
    name = "strata",
    version,
    about = "Layered multi-variant bundle builds",
    long_about = "strata builds several variants of one library from a single source tree.\n\
                  Each variant is checked against an explicitly enumerated layer: a variant\n\
                  may forbid the layer, contain only the layer, or be unrestricted."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every classified import edge and per-variant timing.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn build_defaults() {
        let cli = Cli::try_parse_from(["strata", "build"]).unwrap();
        match cli.command {
            Command::Build(args) => {
                assert!(args.config.is_none());
                assert!(args.variant.is_empty());
                assert!(args.jobs.is_none());
                assert!(!args.dry_run);
            }
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn build_accepts_repeated_variants() {
        let cli = Cli::try_parse_from([
            "strata",
            "build",
            "--config",
            "pkg/strata.toml",
            "--variant",
            "lite",
            "--variant",
            "persistence",
            "--jobs",
            "2",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.config, Some(PathBuf::from("pkg/strata.toml")));
        assert_eq!(args.variant, vec!["lite", "persistence"]);
        assert_eq!(args.jobs, Some(2));
    }

    #[test]
    fn zero_jobs_is_rejected() {
        assert!(Cli::try_parse_from(["strata", "build", "--jobs", "0"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strata", "check", "--no-color", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["strata", "-v", "-q", "build"]).is_err());
    }
}
