//! Engine configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Game engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Where learned knowledge is persisted. `None` keeps everything
    /// in memory for the process lifetime.
    pub dataset_path: Option<PathBuf>,

    /// Upper bound on clarifying questions per refinement search
    #[serde(default = "default_max_refine_questions")]
    pub max_refine_questions: usize,

    /// Seconds of inactivity before a session may be reclaimed
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: i64,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_refine_questions == 0 {
            return Err(ValidationError::InvalidRefineBudget);
        }
        if self.session_idle_secs <= 0 {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        if let Some(path) = &self.dataset_path {
            if path.is_dir() {
                return Err(ValidationError::DatasetPathIsDirectory);
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            max_refine_questions: default_max_refine_questions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_max_refine_questions() -> usize {
    8
}

fn default_session_idle_secs() -> i64 {
    1800
}
