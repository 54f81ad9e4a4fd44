//! Writing variant artifacts to disk.

pub mod writer;

pub use writer::{WrittenFile, write_artifacts};
