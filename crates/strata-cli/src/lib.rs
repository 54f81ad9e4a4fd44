//! strata CLI - layered multi-variant builds from a declarative config.
//!
//! The binary is a thin surface over [`strata_bundler`]: it discovers
//! `strata.toml` (or the `strata` field of `package.json`), converts it into a
//! [`strata_bundler::BuildPlan`], runs every variant and reports the outcome.
//!
//! # Modules
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `build` and `check`
//! - [`config`] - config loading, settings layering and plan conversion
//! - [`error`] - [`CliError`] and its miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal status messages and summaries

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
