//! Reader for the labelled interaction table.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{PipelineError, Result};

/// One `drug1,drug2,severity` row.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRow {
    pub drug1: String,
    pub drug2: String,
    pub severity: String,
}

impl InteractionRow {
    /// Text unit the classifier is trained and queried on.
    pub fn pair_text(&self) -> String {
        format!("{} {}", self.drug1.trim(), self.drug2.trim())
    }
}

/// Load every row of the interaction CSV.
///
/// Missing columns, unreadable files and blank drug cells are load errors.
pub fn load_rows(path: &Path) -> Result<Vec<InteractionRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::artifact(path, e.to_string()))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<InteractionRow>().enumerate() {
        let row = result.map_err(|e| PipelineError::artifact(path, e.to_string()))?;
        if row.drug1.is_empty() || row.drug2.is_empty() {
            return Err(PipelineError::artifact(
                path,
                format!("row {} has an empty drug column", idx + 1),
            ));
        }
        rows.push(row);
    }
    info!(path = %path.display(), rows = rows.len(), "loaded interaction rows");
    Ok(rows)
}
