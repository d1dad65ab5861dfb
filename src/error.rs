//! Error taxonomy for the interaction pipeline.

use std::path::{Path, PathBuf};

/// Result alias used throughout the inference core.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures the inference core can surface to a boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Fewer than two catalog drugs were recognised in the input.
    #[error("At least two known drugs required (recognised: {})", display_list(.found))]
    InsufficientEntities { found: Vec<String> },

    /// Model artifact or reference dataset missing or malformed.
    #[error("failed to load {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// The label decoder produced something outside {mild, moderate, severe}.
    #[error("unexpected severity label {label:?}; artifact does not match the mild/moderate/severe contract")]
    UnexpectedLabel { label: String },

    /// The recommendation table holds more than one row for a drug.
    #[error("recommendation data fault for {drug:?}: {} alternatives recorded ({})", .alternatives.len(), .alternatives.join(", "))]
    RecommendationDataFault {
        drug: String,
        alternatives: Vec<String>,
    },
}

impl PipelineError {
    /// Build an artifact load error for `path`.
    pub fn artifact(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn unexpected_label(label: impl Into<String>) -> Self {
        Self::UnexpectedLabel {
            label: label.into(),
        }
    }

    /// Whether the caller, rather than the deployment, must fix the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InsufficientEntities { .. })
    }
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
