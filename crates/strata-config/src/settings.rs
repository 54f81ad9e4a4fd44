//! Global settings shared by every variant build.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub log_level: Option<String>,

    /// Upper bound on concurrently running variant builds.
    #[serde(default)]
    pub parallel_jobs: Option<usize>,
}
