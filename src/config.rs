//! Runtime configuration utilities for ddi-assistant.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::nlp::{ner::ExtractorKind, pairs::AnalysisMode};

const DEFAULT_MODEL_PATH: &str = "./model/interaction_model.json";
const DEFAULT_PARALLEL_THRESHOLD: usize = 16;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for reference datasets.
    pub data_dir: PathBuf,
    /// Interaction table with `drug1,drug2,severity` columns.
    pub interactions_csv: PathBuf,
    /// Recommendation table with `drug,alternative` columns.
    pub recommendations_csv: PathBuf,
    /// Serialized encoder + classifier + label decoder bundle.
    pub model_path: PathBuf,
    /// Pair selection policy applied when a request does not pick one.
    pub analysis_mode: AnalysisMode,
    /// Catalog scanning strategy.
    pub extractor: ExtractorKind,
    /// Pair count from which batch scoring fans out across worker threads.
    pub parallel_threshold: usize,
}

impl Settings {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unset keys take their defaults and
    /// unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let interactions_csv = lookup("INTERACTIONS_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("drug_interactions.csv"));
        let recommendations_csv = lookup("RECOMMENDATIONS_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("drug_recommendations.csv"));
        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let analysis_mode = match lookup("ANALYSIS_MODE") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("parsing ANALYSIS_MODE")?,
            None => AnalysisMode::default(),
        };
        let extractor = match lookup("EXTRACTOR") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("parsing EXTRACTOR")?,
            None => ExtractorKind::default(),
        };
        let parallel_threshold = match lookup("PARALLEL_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("parsing PARALLEL_THRESHOLD={raw:?}"))?,
            None => DEFAULT_PARALLEL_THRESHOLD,
        };

        Ok(Self {
            data_dir,
            interactions_csv,
            recommendations_csv,
            model_path,
            analysis_mode,
            extractor,
            parallel_threshold,
        })
    }

    /// Settings rooted at `data_dir` with every other knob at its default.
    pub fn with_data_dir(data_dir: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            interactions_csv: data_dir.join("drug_interactions.csv"),
            recommendations_csv: data_dir.join("drug_recommendations.csv"),
            model_path: model_path.as_ref().to_path_buf(),
            data_dir,
            analysis_mode: AnalysisMode::default(),
            extractor: ExtractorKind::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
