//! Shared DTOs for JSON requests and responses.

use serde::{Deserialize, Serialize};

use crate::nlp::AnalysisMode;

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: String,
    /// Falls back to the server's configured mode.
    #[serde(default)]
    pub mode: Option<AnalysisMode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_drugs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogDto {
    pub count: usize,
    pub drugs: Vec<String>,
}
