use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available strata subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build variants
    ///
    /// Builds every variant declared in the config concurrently. Each variant
    /// is checked against its layer; a violating variant writes nothing and
    /// makes the command exit with a non-zero status.
    Build(BuildArgs),

    /// Validate configuration without bundling
    ///
    /// Checks the config schema, that the source root and every entry exist,
    /// that layers are non-empty and that each variant has both formats.
    Check(CheckArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to strata.toml (or a package.json with a `strata` field)
    ///
    /// If not provided, searches the current directory.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build only the named variant (repeatable)
    ///
    /// Examples:
    ///   strata build --variant lite
    ///   strata build --variant lite --variant persistence
    #[arg(long, value_name = "NAME")]
    pub variant: Vec<String>,

    /// Maximum number of variants built at once
    ///
    /// Overrides `settings.parallel_jobs` and `STRATA_PARALLEL_JOBS`.
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Run every check and bundle, but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to strata.toml (or a package.json with a `strata` field)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
