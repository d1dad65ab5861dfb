//! Reference dataset loaders.

pub mod catalog;
pub mod interactions;
pub mod recommendations;

pub use catalog::DrugCatalog;
pub use recommendations::{Recommendation, RecommendationTable, Recommender, NO_ALTERNATIVE};
