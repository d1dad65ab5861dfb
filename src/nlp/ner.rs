//! Dictionary-based drug mention extraction over the loaded catalog.

use std::{fmt, str::FromStr, sync::Arc};

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::{
    data::DrugCatalog,
    error::{PipelineError, Result},
};

/// Catalog size from which `ExtractorKind::Auto` switches to the automaton.
pub const AUTOMATON_THRESHOLD: usize = 1_000;

/// Unicode `\w`, the class both scanners draw word boundaries around.
static WORD_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w$").expect("valid word regex"));

/// A catalog drug confirmed present in the input, with its first offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Trait for drug extractors.
pub trait Ner: Send + Sync {
    /// Canonical names found as whole words, deduplicated, first occurrence first.
    fn extract(&self, text: &str) -> Vec<Mention>;
}

/// Scanning strategy over the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// One word-bounded regex per catalog entry.
    Regex,
    /// Single multi-pattern automaton with a word-boundary check.
    Automaton,
    /// Regex below [`AUTOMATON_THRESHOLD`] entries, automaton above.
    #[default]
    Auto,
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regex" => Ok(Self::Regex),
            "automaton" | "aho-corasick" => Ok(Self::Automaton),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown extractor {other:?}; expected regex, automaton or auto"
            )),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Regex => "regex",
            Self::Automaton => "automaton",
            Self::Auto => "auto",
        })
    }
}

/// Linear scan: one `\b<name>\b` pattern per catalog entry.
pub struct RegexScanner {
    patterns: Vec<(String, Regex)>,
}

impl RegexScanner {
    pub fn new(catalog: &DrugCatalog) -> Result<Self> {
        let patterns = catalog
            .entries()
            .map(|(key, canonical)| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(key)))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (canonical.to_string(), re))
                    .map_err(|e| {
                        PipelineError::artifact("drug catalog", format!("pattern for {key:?}: {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl Ner for RegexScanner {
    fn extract(&self, text: &str) -> Vec<Mention> {
        let found = self
            .patterns
            .iter()
            .filter_map(|(name, re)| {
                re.find(text).map(|m| Mention {
                    name: name.clone(),
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect();
        order_mentions(found)
    }
}

/// Multi-pattern scan built once at load time.
pub struct AutomatonScanner {
    automaton: AhoCorasick,
    names: Vec<String>,
}

impl AutomatonScanner {
    pub fn new(catalog: &DrugCatalog) -> Result<Self> {
        let (keys, names): (Vec<&str>, Vec<String>) = catalog
            .entries()
            .map(|(key, canonical)| (key, canonical.to_string()))
            .unzip();
        let automaton = AhoCorasick::new(&keys)
            .map_err(|e| PipelineError::artifact("drug catalog", e.to_string()))?;
        Ok(Self { automaton, names })
    }
}

impl Ner for AutomatonScanner {
    fn extract(&self, text: &str) -> Vec<Mention> {
        // Patterns are lowercase keys, so scan a lowercased copy. Offsets refer
        // to that copy but keep their relative order.
        let lower = text.to_lowercase();
        let mut first: Vec<Option<Mention>> = vec![None; self.names.len()];
        for m in self.automaton.find_overlapping_iter(&lower) {
            let slot = &mut first[m.pattern().as_usize()];
            if slot.is_some() || !is_word_bounded(&lower, m.start(), m.end()) {
                continue;
            }
            *slot = Some(Mention {
                name: self.names[m.pattern().as_usize()].clone(),
                start: m.start(),
                end: m.end(),
            });
        }
        order_mentions(first.into_iter().flatten().collect())
    }
}

/// Same semantics as a regex `\b` on both ends of `text[start..end]`.
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let (Some(first), Some(last)) = (matched.chars().next(), matched.chars().next_back()) else {
        return false;
    };
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let boundary = |outside: Option<char>, inside: char| {
        outside.map_or(false, is_word_char) != is_word_char(inside)
    };
    boundary(before, first) && boundary(after, last)
}

fn is_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(c.encode_utf8(&mut buf))
}

/// First-occurrence order; a longer name wins a shared start offset.
fn order_mentions(mut mentions: Vec<Mention>) -> Vec<Mention> {
    mentions.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    mentions
}

/// Pick and build the scanner for `kind`.
pub fn load_model(catalog: &DrugCatalog, kind: ExtractorKind) -> Result<Arc<dyn Ner>> {
    let resolved = match kind {
        ExtractorKind::Auto if catalog.len() >= AUTOMATON_THRESHOLD => ExtractorKind::Automaton,
        ExtractorKind::Auto => ExtractorKind::Regex,
        other => other,
    };
    debug!(requested = %kind, %resolved, drugs = catalog.len(), "building extractor");
    Ok(match resolved {
        ExtractorKind::Automaton => Arc::new(AutomatonScanner::new(catalog)?) as Arc<dyn Ner>,
        _ => Arc::new(RegexScanner::new(catalog)?) as Arc<dyn Ner>,
    })
}

/// Canonical names only, for callers that do not need offsets.
pub fn extract_names(ner: &dyn Ner, text: &str) -> Vec<String> {
    ner.extract(text).into_iter().map(|m| m.name).collect()
}
