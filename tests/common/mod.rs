//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use ddi_assistant::{
    data::{DrugCatalog, Recommendation, RecommendationTable, Recommender},
    nlp::{
        ner::{self, ExtractorKind},
        ClassificationResult, Pair, Severity, SeverityScorer,
    },
    InteractionService,
};

/// Scorer returning a fixed severity per unordered pair, counting calls.
#[derive(Default)]
pub struct SpyScorer {
    table: HashMap<(String, String), Severity>,
    fallback: Option<Severity>,
    pub calls: AtomicUsize,
}

impl SpyScorer {
    pub fn new(entries: &[(&str, &str, Severity)]) -> Self {
        let table = entries
            .iter()
            .map(|(a, b, s)| (Pair::new(*a, *b).key(), *s))
            .collect();
        Self {
            table,
            fallback: Some(Severity::Mild),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SeverityScorer for SpyScorer {
    fn score(&self, pair: &Pair) -> ddi_assistant::Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let severity = self
            .table
            .get(&pair.key())
            .copied()
            .or(self.fallback)
            .unwrap_or(Severity::Mild);
        let probabilities = Severity::ALL
            .iter()
            .map(|s| (*s, if *s == severity { 0.8 } else { 0.1 }))
            .collect();
        Ok(ClassificationResult {
            severity,
            confidence: 0.8,
            probabilities,
        })
    }
}

/// Recommendation table wrapper recording every drug it is asked about.
pub struct SpyRecommender {
    inner: RecommendationTable,
    pub asked: Mutex<Vec<(String, Severity)>>,
}

impl SpyRecommender {
    pub fn new(rows: &[(&str, &str)]) -> Self {
        Self {
            inner: RecommendationTable::from_pairs(rows.iter().copied()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.asked.lock().unwrap().len()
    }
}

impl Recommender for SpyRecommender {
    fn resolve(&self, drug: &str, severity: Severity) -> Recommendation {
        self.asked
            .lock()
            .unwrap()
            .push((drug.to_string(), severity));
        self.inner.lookup(drug)
    }
}

pub const CATALOG: &[&str] = &[
    "paracetamol",
    "aspirin",
    "warfarin",
    "ibuprofen",
    "tramadol",
    "sertraline",
];

pub fn catalog() -> DrugCatalog {
    DrugCatalog::from_names(CATALOG)
}

/// Service over [`CATALOG`] with the given doubles.
pub fn service(scorer: Arc<SpyScorer>, recommender: Arc<SpyRecommender>) -> InteractionService {
    let catalog = catalog();
    let ner = ner::load_model(&catalog, ExtractorKind::Regex).unwrap();
    InteractionService::from_parts(catalog, ner, scorer, recommender)
}
