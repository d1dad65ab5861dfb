//! Severity classification of drug pairs against a versioned model artifact.

use std::{fmt, fs, path::Path};

use anyhow::{bail, Context};
use linfa::{dataset::DatasetBase, prelude::Fit};
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    data::interactions::InteractionRow,
    error::{PipelineError, Result},
    nlp::{features::TfidfEncoder, pairs::Pair},
};

/// Only artifact layout this build understands.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Closed set of interaction severity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Label-encoder order: class index `i` is `ALL[i]`.
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// Moderate and severe results get a recommendation.
    pub fn is_risky(&self) -> bool {
        !matches!(self, Self::Mild)
    }

    /// Decode a label string; anything outside the closed set is fatal.
    pub fn decode(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            _ => Err(PipelineError::unexpected_label(label)),
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Mild => 0,
            Self::Moderate => 1,
            Self::Severe => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winning tier, its probability mass, and the full distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub severity: Severity,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// One entry per tier, in decoder order; sums to 1.
    pub probabilities: Vec<(Severity, f64)>,
}

impl ClassificationResult {
    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 10_000.0).round() / 100.0
    }
}

/// Scores a pair's joint text.
pub trait SeverityScorer: Send + Sync {
    fn score(&self, pair: &Pair) -> Result<ClassificationResult>;
}

/// Score every pair, fanning out across the rayon pool from `parallel_threshold`
/// pairs. Output order always matches `pairs`.
pub fn score_batch(
    scorer: &dyn SeverityScorer,
    pairs: &[Pair],
    parallel_threshold: usize,
) -> Result<Vec<ClassificationResult>> {
    if pairs.len() > 1 && pairs.len() >= parallel_threshold {
        debug!(pairs = pairs.len(), "scoring pairs in parallel");
        pairs.par_iter().map(|pair| scorer.score(pair)).collect()
    } else {
        pairs.iter().map(|pair| scorer.score(pair)).collect()
    }
}

/// Weights of a multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticWeights {
    /// `[n_classes][n_features]`.
    pub coefficients: Vec<Vec<f64>>,
    /// `[n_classes]`.
    pub intercepts: Vec<f64>,
}

/// On-disk bundle: encoder, classifier and label decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_version: String,
    pub encoder: TfidfEncoder,
    pub classifier: LogisticWeights,
    /// Class index -> severity label.
    pub labels: Vec<String>,
}

/// Loaded, validated model. Read-only after construction.
#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    model_version: String,
    encoder: TfidfEncoder,
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
    decoder: Vec<Severity>,
}

impl SeverityClassifier {
    /// Read and validate the artifact at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| PipelineError::artifact(path, e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|e| PipelineError::artifact(path, e.to_string()))?;
        let classifier = Self::from_artifact(artifact, path)?;
        info!(
            path = %path.display(),
            model_version = %classifier.model_version,
            features = classifier.encoder.n_features(),
            "loaded interaction model"
        );
        Ok(classifier)
    }

    /// Validate a deserialised artifact. `origin` names it in errors.
    pub fn from_artifact(artifact: ModelArtifact, origin: &Path) -> Result<Self> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(PipelineError::artifact(
                origin,
                format!(
                    "format_version {} is not supported (expected {ARTIFACT_FORMAT_VERSION})",
                    artifact.format_version
                ),
            ));
        }
        artifact
            .encoder
            .validate()
            .map_err(|reason| PipelineError::artifact(origin, reason))?;

        let decoder = artifact
            .labels
            .iter()
            .map(|label| Severity::decode(label))
            .collect::<Result<Vec<_>>>()?;
        let mut distinct = decoder.clone();
        distinct.sort();
        distinct.dedup();
        if decoder.len() != Severity::ALL.len() || distinct.len() != Severity::ALL.len() {
            return Err(PipelineError::unexpected_label(format!(
                "[{}]",
                artifact.labels.join(", ")
            )));
        }

        let n_features = artifact.encoder.n_features();
        let LogisticWeights {
            coefficients,
            intercepts,
        } = artifact.classifier;
        if coefficients.len() != decoder.len() || intercepts.len() != decoder.len() {
            return Err(PipelineError::artifact(
                origin,
                format!(
                    "classifier has {} coefficient rows and {} intercepts for {} labels",
                    coefficients.len(),
                    intercepts.len(),
                    decoder.len()
                ),
            ));
        }
        if let Some((class, row)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(PipelineError::artifact(
                origin,
                format!(
                    "coefficient row {class} has {} weights, encoder has {n_features} features",
                    row.len()
                ),
            ));
        }
        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        if flat.iter().chain(intercepts.iter()).any(|w| !w.is_finite()) {
            return Err(PipelineError::artifact(origin, "classifier weights must be finite"));
        }
        let coefficients = Array2::from_shape_vec((decoder.len(), n_features), flat)
            .map_err(|e| PipelineError::artifact(origin, e.to_string()))?;

        Ok(Self {
            model_version: artifact.model_version,
            encoder: artifact.encoder,
            coefficients,
            intercepts: Array1::from(intercepts),
            decoder,
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn encoder(&self) -> &TfidfEncoder {
        &self.encoder
    }

    /// Probability per class index, via a numerically stable softmax.
    pub fn predict_proba(&self, text: &str) -> Array1<f64> {
        let features = self.encoder.transform(text);
        let logits = self.coefficients.dot(&features) + &self.intercepts;
        let max = logits.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let exp = logits.mapv(|v| (v - max).exp());
        let total = exp.sum();
        exp / total
    }

    /// Classify a raw text unit. Ties go to the lowest class index.
    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let probs = self.predict_proba(text);
        let mut best = 0;
        for (idx, &p) in probs.iter().enumerate() {
            if p > probs[best] {
                best = idx;
            }
        }
        ClassificationResult {
            severity: self.decoder[best],
            confidence: probs[best].clamp(0.0, 1.0),
            probabilities: self
                .decoder
                .iter()
                .copied()
                .zip(probs.iter().copied())
                .collect(),
        }
    }

    /// Serialisable form of this model.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: self.model_version.clone(),
            encoder: self.encoder.clone(),
            classifier: LogisticWeights {
                coefficients: self
                    .coefficients
                    .axis_iter(Axis(0))
                    .map(|row| row.to_vec())
                    .collect(),
                intercepts: self.intercepts.to_vec(),
            },
            labels: self.decoder.iter().map(|s| s.as_str().to_string()).collect(),
        }
    }

    /// Write the artifact as pretty JSON, creating parent folders.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.to_artifact())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), model_version = %self.model_version, "wrote model artifact");
        Ok(())
    }
}

impl SeverityScorer for SeverityClassifier {
    fn score(&self, pair: &Pair) -> Result<ClassificationResult> {
        let result = self.classify_text(&pair.joint_text());
        debug!(
            drug_a = %pair.drug_a,
            drug_b = %pair.drug_b,
            severity = %result.severity,
            confidence = result.confidence,
            "scored pair"
        );
        Ok(result)
    }
}

/// Knobs for offline training.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    pub seed: u64,
    pub max_iterations: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            max_iterations: 1000,
        }
    }
}

/// Precision/recall for one tier on the hold-out split.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub severity: Severity,
    pub precision: f64,
    pub recall: f64,
    pub support: usize,
}

/// Hold-out evaluation of a freshly trained model.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: usize,
    /// `None` when nothing was held out.
    pub accuracy: Option<f64>,
    pub per_class: Vec<ClassMetrics>,
}

/// Fit encoder and classifier on labelled rows and evaluate on a seeded split.
pub fn train(
    rows: &[InteractionRow],
    options: &TrainOptions,
) -> anyhow::Result<(SeverityClassifier, TrainingReport)> {
    if !(0.0..1.0).contains(&options.test_fraction) {
        bail!("test fraction must be in [0, 1), got {}", options.test_fraction);
    }
    let labels = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            Severity::decode(&row.severity).with_context(|| format!("row {}", idx + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let texts: Vec<String> = rows.iter().map(InteractionRow::pair_text).collect();

    // Vocabulary covers every row, as the held-out rows name catalog drugs too.
    let encoder = TfidfEncoder::fit(&texts, (1, 2), true);

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(options.seed));
    let n_test = ((rows.len() as f64) * options.test_fraction).ceil() as usize;
    let (test_idx, train_idx) = order.split_at(n_test.min(rows.len()));

    for severity in Severity::ALL {
        if !train_idx.iter().any(|&i| labels[i] == severity) {
            bail!(
                "training split has no {severity} rows; add data or lower the test fraction"
            );
        }
    }

    let train_texts: Vec<&str> = train_idx.iter().map(|&i| texts[i].as_str()).collect();
    let x = encoder.transform_batch(&train_texts);
    let y: Array1<usize> = train_idx.iter().map(|&i| labels[i].index()).collect();
    let dataset = DatasetBase::new(x, y);

    let fitted = MultiLogisticRegression::default()
        .max_iterations(options.max_iterations)
        .fit(&dataset)
        .context("fitting logistic regression")?;

    let n_features = encoder.n_features();
    let params = fitted.params();
    let coefficients = if params.dim() == (n_features, Severity::ALL.len()) {
        params.t().to_owned()
    } else if params.dim() == (Severity::ALL.len(), n_features) {
        params.to_owned()
    } else {
        bail!("unexpected parameter shape {:?}", params.dim());
    };

    let classifier = SeverityClassifier {
        model_version: format!(
            "tfidf-logreg-r{}-s{}-f{}",
            rows.len(),
            options.seed,
            n_features
        ),
        encoder,
        coefficients,
        intercepts: fitted.intercept().to_owned(),
        decoder: Severity::ALL.to_vec(),
    };

    let report = evaluate(&classifier, test_idx, &texts, &labels, train_idx.len());
    info!(
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        accuracy = ?report.accuracy,
        "trained interaction model"
    );
    Ok((classifier, report))
}

fn evaluate(
    classifier: &SeverityClassifier,
    test_idx: &[usize],
    texts: &[String],
    labels: &[Severity],
    train_rows: usize,
) -> TrainingReport {
    let predicted: Vec<(Severity, Severity)> = test_idx
        .iter()
        .map(|&i| (labels[i], classifier.classify_text(&texts[i]).severity))
        .collect();
    let correct = predicted.iter().filter(|(truth, pred)| truth == pred).count();
    let accuracy = (!predicted.is_empty()).then(|| correct as f64 / predicted.len() as f64);

    let per_class = Severity::ALL
        .iter()
        .map(|&severity| {
            let tp = predicted
                .iter()
                .filter(|(t, p)| *t == severity && *p == severity)
                .count();
            let predicted_pos = predicted.iter().filter(|(_, p)| *p == severity).count();
            let support = predicted.iter().filter(|(t, _)| *t == severity).count();
            let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
            ClassMetrics {
                severity,
                precision: ratio(tp, predicted_pos),
                recall: ratio(tp, support),
                support,
            }
        })
        .collect();

    TrainingReport {
        train_rows,
        test_rows: test_idx.len(),
        features: classifier.encoder.n_features(),
        accuracy,
        per_class,
    }
}
