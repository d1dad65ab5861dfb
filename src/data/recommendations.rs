//! Static drug -> safer alternative lookup.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{PipelineError, Result},
    nlp::relclf::Severity,
};

/// Shown when the table has nothing for a risky drug.
pub const NO_ALTERNATIVE: &str = "No safer alternative found";

/// Outcome of a recommendation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Recommendation {
    /// Exactly one alternative is recorded.
    Alternative(String),
    /// The table has no row for the drug.
    NoneFound,
    /// The table has several rows for the drug; none is chosen.
    Ambiguous(Vec<String>),
}

impl Recommendation {
    /// Value for the `recommended_alternative` field of a report entry.
    pub fn display_value(&self) -> &str {
        match self {
            Self::Alternative(alt) => alt,
            Self::NoneFound | Self::Ambiguous(_) => NO_ALTERNATIVE,
        }
    }

    /// Data-quality warning carried alongside the entry, if any.
    pub fn data_fault(&self, drug: &str) -> Option<PipelineError> {
        match self {
            Self::Ambiguous(alternatives) => Some(PipelineError::RecommendationDataFault {
                drug: drug.to_string(),
                alternatives: alternatives.clone(),
            }),
            _ => None,
        }
    }
}

/// Resolves safer alternatives for drugs in a risky pair.
pub trait Recommender: Send + Sync {
    /// Only called for moderate and severe results.
    fn resolve(&self, drug: &str, severity: Severity) -> Recommendation;
}

#[derive(Debug, Deserialize)]
struct RecommendationRow {
    drug: String,
    alternative: String,
}

/// Recommendation table keyed by lowercase drug name.
#[derive(Debug, Clone, Default)]
pub struct RecommendationTable {
    rows: IndexMap<String, Vec<String>>,
}

impl RecommendationTable {
    /// Build from `(drug, alternative)` pairs, keeping every row per drug.
    ///
    /// Pairs with a blank side carry no recommendation and are skipped; use
    /// [`RecommendationTable::load`] for tables that must be complete.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut rows: IndexMap<String, Vec<String>> = IndexMap::new();
        for (drug, alternative) in pairs {
            let key = drug.as_ref().trim().to_lowercase();
            let alternative = alternative.as_ref().trim();
            if key.is_empty() || alternative.is_empty() {
                continue;
            }
            rows.entry(key).or_default().push(alternative.to_string());
        }
        Self { rows }
    }

    /// Load the recommendation CSV and report duplicate drugs as data faults.
    ///
    /// Blank drug or alternative cells are load errors.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PipelineError::artifact(path, e.to_string()))?;
        let mut pairs = Vec::new();
        for (idx, result) in reader.deserialize::<RecommendationRow>().enumerate() {
            let row = result.map_err(|e| PipelineError::artifact(path, e.to_string()))?;
            if row.drug.is_empty() || row.alternative.is_empty() {
                return Err(PipelineError::artifact(
                    path,
                    format!("row {} has an empty drug or alternative column", idx + 1),
                ));
            }
            pairs.push((row.drug, row.alternative));
        }
        let table = Self::from_pairs(pairs);
        for fault in table.data_faults() {
            warn!(%fault, "recommendation table has duplicate rows");
        }
        info!(path = %path.display(), drugs = table.len(), "loaded recommendation table");
        Ok(table)
    }

    /// Every drug recorded more than once.
    pub fn data_faults(&self) -> Vec<PipelineError> {
        self.rows
            .iter()
            .filter(|(_, alts)| alts.len() > 1)
            .map(|(drug, alts)| PipelineError::RecommendationDataFault {
                drug: drug.clone(),
                alternatives: alts.clone(),
            })
            .collect()
    }

    /// Case-insensitive exact lookup.
    pub fn lookup(&self, drug: &str) -> Recommendation {
        match self.rows.get(&drug.trim().to_lowercase()) {
            None => Recommendation::NoneFound,
            Some(alts) if alts.len() == 1 => Recommendation::Alternative(alts[0].clone()),
            Some(alts) => Recommendation::Ambiguous(alts.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Recommender for RecommendationTable {
    fn resolve(&self, drug: &str, severity: Severity) -> Recommendation {
        debug_assert!(severity.is_risky(), "recommendations are for risky pairs only");
        self.lookup(drug)
    }
}
