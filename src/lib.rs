//! Drug-drug interaction severity inference.
//!
//! Free text is scanned for catalog drug names, the recognised drugs are
//! paired, each pair is scored by a TF-IDF + logistic regression artifact, and
//! risky pairs get a safer alternative from a static table:
//!
//! ```text
//! text -> ner -> pairs -> relclf (per pair) -> recommendations -> report
//! ```
//!
//! [`pipeline::InteractionService`] owns the loaded resources and is the
//! entry point for the CLI and the HTTP API.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;
pub mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
pub use pipeline::InteractionService;
