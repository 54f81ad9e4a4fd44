//! Command implementations.
//!
//! - [`build`] - build every (or the selected) variant
//! - [`check`] - validate config and plan without bundling

pub mod build;
pub mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
