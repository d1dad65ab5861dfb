use std::{fs, path::Path};

use ddi_assistant::{
    nlp::{
        features::TfidfEncoder,
        relclf::{score_batch, LogisticWeights, ModelArtifact, SeverityClassifier},
        Pair, Severity, SeverityScorer,
    },
    PipelineError,
};

/// Three-class model keyed on one drug per tier.
fn artifact() -> ModelArtifact {
    let encoder = TfidfEncoder::fit(
        &["warfarin aspirin", "paracetamol aspirin", "lithium ibuprofen"],
        (1, 2),
        true,
    );
    let n = encoder.n_features();
    let mut coefficients = vec![vec![0.0; n]; 3];
    coefficients[0][encoder.vocabulary["paracetamol"]] = 4.0;
    coefficients[1][encoder.vocabulary["lithium"]] = 4.0;
    coefficients[2][encoder.vocabulary["warfarin"]] = 4.0;
    ModelArtifact {
        format_version: 1,
        model_version: "test-1".into(),
        encoder,
        classifier: LogisticWeights {
            coefficients,
            intercepts: vec![0.0, 0.0, 0.0],
        },
        labels: vec!["mild".into(), "moderate".into(), "severe".into()],
    }
}

fn build(artifact: ModelArtifact) -> Result<SeverityClassifier, PipelineError> {
    SeverityClassifier::from_artifact(artifact, Path::new("memory"))
}

#[test]
fn picks_the_most_probable_tier() {
    let model = build(artifact()).unwrap();

    let severe = model.score(&Pair::new("warfarin", "aspirin")).unwrap();
    assert_eq!(severe.severity, Severity::Severe);
    let mild = model.score(&Pair::new("paracetamol", "aspirin")).unwrap();
    assert_eq!(mild.severity, Severity::Mild);
    let moderate = model.score(&Pair::new("Lithium", "IBUPROFEN")).unwrap();
    assert_eq!(moderate.severity, Severity::Moderate);
}

#[test]
fn confidence_is_a_probability_and_the_distribution_sums_to_one() {
    let model = build(artifact()).unwrap();
    for text in ["warfarin aspirin", "nothing known here", "", "lithium warfarin"] {
        let result = model.classify_text(text);
        assert!((0.0..=1.0).contains(&result.confidence));
        let total: f64 = result.probabilities.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9, "{text:?} sums to {total}");
        let winner = result
            .probabilities
            .iter()
            .find(|(s, _)| *s == result.severity)
            .unwrap();
        assert_eq!(winner.1, result.confidence);
    }
}

#[test]
fn unknown_text_falls_back_to_the_first_class_on_ties() {
    let model = build(artifact()).unwrap();
    let result = model.classify_text("completely unrelated");
    assert_eq!(result.severity, Severity::Mild);
    assert!((result.confidence - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(result.confidence_percent(), 33.33);
}

#[test]
fn labels_may_come_in_any_order() {
    let mut shuffled = artifact();
    shuffled.labels = vec!["severe".into(), "mild".into(), "moderate".into()];
    let model = build(shuffled).unwrap();
    // Row 2 (warfarin weight) now decodes as "moderate".
    assert_eq!(model.classify_text("warfarin aspirin").severity, Severity::Moderate);
}

#[test]
fn foreign_label_is_rejected() {
    let mut bad = artifact();
    bad.labels[2] = "contraindicated".into();
    match build(bad) {
        Err(PipelineError::UnexpectedLabel { label }) => assert_eq!(label, "contraindicated"),
        other => panic!("expected unexpected label, got {other:?}"),
    }
}

#[test]
fn duplicate_or_missing_labels_are_rejected() {
    let mut duplicated = artifact();
    duplicated.labels = vec!["mild".into(), "mild".into(), "severe".into()];
    assert!(matches!(build(duplicated), Err(PipelineError::UnexpectedLabel { .. })));

    let mut two = artifact();
    two.labels.pop();
    two.classifier.coefficients.pop();
    two.classifier.intercepts.pop();
    assert!(matches!(build(two), Err(PipelineError::UnexpectedLabel { .. })));
}

#[test]
fn inconsistent_shapes_are_load_errors() {
    let mut short_row = artifact();
    short_row.classifier.coefficients[1].pop();
    assert!(matches!(build(short_row), Err(PipelineError::ArtifactLoad { .. })));

    let mut missing_intercept = artifact();
    missing_intercept.classifier.intercepts.pop();
    assert!(matches!(build(missing_intercept), Err(PipelineError::ArtifactLoad { .. })));

    let mut bad_idf = artifact();
    bad_idf.encoder.idf.push(1.0);
    assert!(matches!(build(bad_idf), Err(PipelineError::ArtifactLoad { .. })));

    let mut nan = artifact();
    nan.classifier.intercepts[0] = f64::NAN;
    assert!(matches!(build(nan), Err(PipelineError::ArtifactLoad { .. })));

    let mut future = artifact();
    future.format_version = 2;
    assert!(matches!(build(future), Err(PipelineError::ArtifactLoad { .. })));
}

#[test]
fn load_reads_json_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, serde_json::to_string(&artifact()).unwrap()).unwrap();

    let model = SeverityClassifier::load(&path).unwrap();
    assert_eq!(model.model_version(), "test-1");
    let reloaded = model.to_artifact();
    assert_eq!(reloaded.labels, artifact().labels);
    assert_eq!(reloaded.encoder.vocabulary, artifact().encoder.vocabulary);
    assert_eq!(
        model.classify_text("warfarin aspirin").severity,
        Severity::Severe
    );
}

#[test]
fn missing_or_corrupt_artifact_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    match SeverityClassifier::load(&missing) {
        Err(PipelineError::ArtifactLoad { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected load error, got {other:?}"),
    }

    let corrupt = dir.path().join("corrupt.json");
    fs::write(&corrupt, "{\"format_version\": 1, \"labels\": [").unwrap();
    assert!(matches!(
        SeverityClassifier::load(&corrupt),
        Err(PipelineError::ArtifactLoad { .. })
    ));
}

#[test]
fn batch_scoring_preserves_order_sequential_and_parallel() {
    let model = build(artifact()).unwrap();
    let pairs: Vec<Pair> = (0..40)
        .map(|i| match i % 3 {
            0 => Pair::new("warfarin", "aspirin"),
            1 => Pair::new("paracetamol", "aspirin"),
            _ => Pair::new("lithium", "ibuprofen"),
        })
        .collect();

    let sequential = score_batch(&model, &pairs, usize::MAX).unwrap();
    let parallel = score_batch(&model, &pairs, 4).unwrap();
    assert_eq!(sequential, parallel);
    assert_eq!(sequential[0].severity, Severity::Severe);
    assert_eq!(sequential[1].severity, Severity::Mild);
    assert_eq!(sequential[2].severity, Severity::Moderate);
}

#[test]
fn severity_labels_decode_case_insensitively_only_within_the_closed_set() {
    assert_eq!(Severity::decode(" Severe ").unwrap(), Severity::Severe);
    assert!(matches!(
        Severity::decode("major"),
        Err(PipelineError::UnexpectedLabel { .. })
    ));
    assert!(Severity::Moderate.is_risky());
    assert!(!Severity::Mild.is_risky());
}
