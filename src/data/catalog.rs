//! Canonical drug vocabulary recognised by the extractor.

use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::{
    data::interactions::{self, InteractionRow},
    error::{PipelineError, Result},
};

/// Immutable set of canonical drug names keyed by their lowercase form.
///
/// Iteration follows first appearance in the source table, which keeps
/// extraction tie-breaks stable across runs.
#[derive(Debug, Clone, Default)]
pub struct DrugCatalog {
    names: IndexMap<String, String>,
}

impl DrugCatalog {
    /// Build a catalog from canonical names; the first spelling of a key wins.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = IndexMap::new();
        for name in names {
            let canonical = name.as_ref().trim();
            if canonical.is_empty() {
                continue;
            }
            map.entry(canonical.to_lowercase())
                .or_insert_with(|| canonical.to_string());
        }
        Self { names: map }
    }

    /// Union of both drug columns of the interaction table.
    pub fn from_rows(rows: &[InteractionRow]) -> Self {
        Self::from_names(
            rows.iter()
                .flat_map(|row| [row.drug1.as_str(), row.drug2.as_str()]),
        )
    }

    /// Load the catalog from the interaction CSV. Severities are ignored here.
    pub fn load(path: &Path) -> Result<Self> {
        let rows = interactions::load_rows(path)?;
        let catalog = Self::from_rows(&rows);
        if catalog.is_empty() {
            return Err(PipelineError::artifact(path, "no drug names found"));
        }
        info!(path = %path.display(), drugs = catalog.len(), "loaded drug catalog");
        Ok(catalog)
    }

    /// Case-insensitive membership.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.trim().to_lowercase())
    }

    /// Canonical spelling for a name in any case.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.names
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// `(lowercase key, canonical name)` in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
