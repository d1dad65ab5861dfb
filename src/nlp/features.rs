//! TF-IDF text encoder for drug pair text.

use std::collections::{BTreeMap, HashMap, HashSet};

use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing",
        "down", "during", "each", "either", "else", "even", "every", "few", "for", "from",
        "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
        "himself", "his", "how", "however", "i", "ie", "if", "in", "into", "is", "it", "its",
        "itself", "just", "least", "less", "may", "me", "might", "more", "most", "much", "must",
        "my", "myself", "neither", "never", "no", "nor", "not", "now", "of", "off", "often",
        "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
        "per", "rather", "same", "she", "should", "since", "so", "some", "still", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "though", "through", "thus", "to", "too", "under",
        "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "when",
        "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with",
        "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Fitted TF-IDF vocabulary and inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfEncoder {
    /// Term -> feature column.
    pub vocabulary: BTreeMap<String, usize>,
    /// Smoothed idf per column.
    pub idf: Vec<f64>,
    /// Inclusive n-gram bounds.
    pub ngram_range: (usize, usize),
    /// Drop English stop words before building n-grams.
    pub stop_words: bool,
}

impl TfidfEncoder {
    /// Learn vocabulary and idf from `documents`. Columns follow term order.
    pub fn fit<S: AsRef<str>>(documents: &[S], ngram_range: (usize, usize), stop_words: bool) -> Self {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let terms: HashSet<String> = analyze(doc.as_ref(), ngram_range, stop_words)
                .into_iter()
                .collect();
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }
        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (column, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, column);
        }
        debug!(terms = vocabulary.len(), docs = documents.len(), "fitted tf-idf encoder");
        Self {
            vocabulary,
            idf,
            ngram_range,
            stop_words,
        }
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Terms of `text` in the order they occur, including out-of-vocabulary ones.
    pub fn terms(&self, text: &str) -> Vec<String> {
        analyze(text, self.ngram_range, self.stop_words)
    }

    /// L2-normalised tf-idf vector; unknown terms contribute nothing.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }
        let mut vector = Array1::zeros(self.n_features());
        for (column, tf) in counts {
            vector[column] = tf * self.idf[column];
        }
        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector /= norm;
        }
        vector
    }

    /// Stack encoded documents into a `(docs, features)` matrix.
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f64> {
        let mut matrix = Array2::zeros((documents.len(), self.n_features()));
        for (row, doc) in documents.iter().enumerate() {
            matrix.row_mut(row).assign(&self.transform(doc.as_ref()));
        }
        matrix
    }

    /// Structural consistency of a deserialised encoder.
    pub fn validate(&self) -> Result<(), String> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} entries",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &column) in &self.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(format!("column {column} assigned twice (at {term:?})")),
                None => return Err(format!("term {term:?} maps to out-of-range column {column}")),
            }
        }
        if let Some(bad) = self.idf.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(format!("idf value {bad} is not a positive finite number"));
        }
        Ok(())
    }
}

/// Lowercase, tokenise, optionally drop stop words, then emit n-grams.
pub fn analyze(text: &str, ngram_range: (usize, usize), stop_words: bool) -> Vec<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| !stop_words || !STOP_WORDS.contains(token))
        .collect();

    let (min_n, max_n) = ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}
