//! Candidate pair enumeration over extracted mentions.

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Policy for which pairs of an input are analysed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Every unordered pair, `(i, j)` with `i < j` in extraction order.
    #[default]
    Exhaustive,
    /// Only the first two mentions.
    FirstPair,
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "exhaustive" | "all" => Ok(Self::Exhaustive),
            "first-pair" | "first" => Ok(Self::FirstPair),
            other => Err(format!(
                "unknown analysis mode {other:?}; expected exhaustive or first-pair"
            )),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exhaustive => "exhaustive",
            Self::FirstPair => "first-pair",
        })
    }
}

/// Two distinct mentions, kept in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub drug_a: String,
    pub drug_b: String,
}

impl Pair {
    pub fn new(drug_a: impl Into<String>, drug_b: impl Into<String>) -> Self {
        Self {
            drug_a: drug_a.into(),
            drug_b: drug_b.into(),
        }
    }

    /// Text unit handed to the classifier: `"<a> <b>"`.
    pub fn joint_text(&self) -> String {
        format!("{} {}", self.drug_a, self.drug_b)
    }

    /// Order-independent identity, so `key(A, B) == key(B, A)`.
    pub fn key(&self) -> (String, String) {
        let a = self.drug_a.to_lowercase();
        let b = self.drug_b.to_lowercase();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Build the pairs selected by `mode`; fails before any scoring when `n < 2`.
pub fn enumerate(mentions: &[String], mode: AnalysisMode) -> Result<Vec<Pair>> {
    if mentions.len() < 2 {
        return Err(PipelineError::InsufficientEntities {
            found: mentions.to_vec(),
        });
    }
    let pairs = match mode {
        AnalysisMode::FirstPair => vec![Pair::new(&mentions[0], &mentions[1])],
        AnalysisMode::Exhaustive => {
            let n = mentions.len();
            let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
            for i in 0..n {
                for j in (i + 1)..n {
                    pairs.push(Pair::new(&mentions[i], &mentions[j]));
                }
            }
            pairs
        }
    };
    Ok(pairs)
}
