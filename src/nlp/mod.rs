//! Text side of the pipeline: extraction, pairing, encoding and scoring.

pub mod features;
pub mod ner;
pub mod pairs;
pub mod relclf;

pub use ner::{ExtractorKind, Mention, Ner};
pub use pairs::{AnalysisMode, Pair};
pub use relclf::{ClassificationResult, Severity, SeverityClassifier, SeverityScorer};
