//! Service object wiring extraction, pairing, scoring and recommendations.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    config::Settings,
    data::{DrugCatalog, RecommendationTable, Recommender},
    error::Result,
    nlp::{
        ner::{self, Ner},
        pairs,
        relclf::{self, SeverityClassifier, SeverityScorer},
        AnalysisMode,
    },
    report::{self, InteractionReport, ScoredPair},
};

/// Startup-loaded, read-only resources shared by every request.
#[derive(Clone)]
pub struct InteractionService {
    catalog: Arc<DrugCatalog>,
    ner: Arc<dyn Ner>,
    scorer: Arc<dyn SeverityScorer>,
    recommender: Arc<dyn Recommender>,
    default_mode: AnalysisMode,
    parallel_threshold: usize,
}

impl InteractionService {
    /// Load catalog, model and recommendation table. Any failure is fatal.
    pub fn load(settings: &Settings) -> Result<Self> {
        let catalog = DrugCatalog::load(&settings.interactions_csv)?;
        let ner = ner::load_model(&catalog, settings.extractor)?;
        let classifier = SeverityClassifier::load(&settings.model_path)?;
        let recommendations = RecommendationTable::load(&settings.recommendations_csv)?;
        info!(
            drugs = catalog.len(),
            model_version = classifier.model_version(),
            mode = %settings.analysis_mode,
            "interaction service ready"
        );
        Ok(Self {
            catalog: Arc::new(catalog),
            ner,
            scorer: Arc::new(classifier),
            recommender: Arc::new(recommendations),
            default_mode: settings.analysis_mode,
            parallel_threshold: settings.parallel_threshold,
        })
    }

    /// Assemble from explicit parts; used by tests and embedders.
    pub fn from_parts(
        catalog: DrugCatalog,
        ner: Arc<dyn Ner>,
        scorer: Arc<dyn SeverityScorer>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ner,
            scorer,
            recommender,
            default_mode: AnalysisMode::default(),
            parallel_threshold: 16,
        }
    }

    pub fn with_default_mode(mut self, mode: AnalysisMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &DrugCatalog {
        &self.catalog
    }

    pub fn default_mode(&self) -> AnalysisMode {
        self.default_mode
    }

    /// Canonical drug names in `text`, first occurrence first.
    pub fn extract(&self, text: &str) -> Vec<String> {
        ner::extract_names(self.ner.as_ref(), text)
    }

    /// Run the full pipeline. `mode` falls back to the configured default.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn analyze(&self, text: &str, mode: Option<AnalysisMode>) -> Result<InteractionReport> {
        let mode = mode.unwrap_or(self.default_mode);
        let drugs = self.extract(text);
        debug!(?drugs, "extracted drugs");

        let pairs = pairs::enumerate(&drugs, mode)?;
        let results = relclf::score_batch(self.scorer.as_ref(), &pairs, self.parallel_threshold)?;

        let scored = pairs
            .into_iter()
            .zip(results)
            .map(|(pair, result)| {
                let recommendation = result
                    .severity
                    .is_risky()
                    .then(|| self.recommender.resolve(&pair.drug_b, result.severity));
                ScoredPair {
                    pair,
                    result,
                    recommendation,
                }
            })
            .collect();

        let report = report::assemble(mode, drugs, scored);
        info!(%mode, pairs = report.entries.len(), "analysis complete");
        Ok(report)
    }
}
