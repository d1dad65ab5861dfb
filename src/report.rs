//! Assembly of scored pairs into the user-facing interaction report.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    data::Recommendation,
    nlp::{AnalysisMode, ClassificationResult, Pair, Severity},
};

pub const DISCLAIMER: &str = "This system is for educational and research purposes only and \
                              is not a substitute for professional medical advice.";

const SEPARATOR_WIDTH: usize = 60;

/// Fixed explanation per tier.
pub fn explanation(severity: Severity) -> &'static str {
    match severity {
        Severity::Mild => "Low interaction risk based on learned dataset patterns.",
        Severity::Moderate => {
            "Known interaction patterns; monitoring or dosage adjustment recommended."
        }
        Severity::Severe => "High-risk drug combination with potential serious adverse effects.",
    }
}

/// One-line guidance per tier.
pub fn advice(severity: Severity) -> &'static str {
    match severity {
        Severity::Mild => "Usually safe.",
        Severity::Moderate => "Caution required.",
        Severity::Severe => "Avoid combination.",
    }
}

/// A pair together with everything computed for it.
#[derive(Debug, Clone)]
pub struct ScoredPair {
    pub pair: Pair,
    pub result: ClassificationResult,
    /// Present exactly when the severity is risky.
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub confidence_percent: f64,
    pub explanation: String,
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_alternative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_warning: Option<String>,
    #[serde(skip)]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionReport {
    pub mode: AnalysisMode,
    pub detected_drugs: Vec<String>,
    pub entries: Vec<ReportEntry>,
    pub disclaimer: String,
}

/// Build the report in pair order. Severity decisions are taken as given.
pub fn assemble(
    mode: AnalysisMode,
    detected_drugs: Vec<String>,
    scored: Vec<ScoredPair>,
) -> InteractionReport {
    let entries = scored
        .into_iter()
        .map(|ScoredPair { pair, result, recommendation }| {
            let data_warning = recommendation
                .as_ref()
                .and_then(|rec| rec.data_fault(&pair.drug_b))
                .map(|fault| fault.to_string());
            ReportEntry {
                severity: result.severity,
                confidence_percent: result.confidence_percent(),
                explanation: explanation(result.severity).to_string(),
                advice: advice(result.severity).to_string(),
                recommended_alternative: recommendation
                    .as_ref()
                    .map(|rec| rec.display_value().to_string()),
                data_warning,
                recommendation,
                drug_a: pair.drug_a,
                drug_b: pair.drug_b,
            }
        })
        .collect();

    InteractionReport {
        mode,
        detected_drugs,
        entries,
        disclaimer: DISCLAIMER.to_string(),
    }
}

impl InteractionReport {
    /// Plain-text layout for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Detected drugs: {}", self.detected_drugs.join(", "));
        for entry in &self.entries {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} + {}", entry.drug_a, entry.drug_b);
            let _ = writeln!(
                out,
                "Severity: {} ({}%)",
                entry.severity.as_str().to_uppercase(),
                entry.confidence_percent
            );
            let _ = writeln!(out, "{}", entry.advice);
            let _ = writeln!(out, "{}", entry.explanation);
            if let Some(alt) = &entry.recommended_alternative {
                let _ = writeln!(out, "Safer alternative: {alt}");
            }
            if let Some(warning) = &entry.data_warning {
                let _ = writeln!(out, "Data warning: {warning}");
            }
            let _ = writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH));
        }
        let _ = writeln!(out);
        let _ = write!(out, "{}", self.disclaimer);
        out
    }
}
