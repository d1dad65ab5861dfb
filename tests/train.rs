use std::path::Path;

use ddi_assistant::{
    config::Settings,
    data::interactions::{self, InteractionRow},
    nlp::{
        relclf::{self, SeverityClassifier, TrainOptions},
        Severity,
    },
    InteractionService,
};

fn dataset() -> Vec<InteractionRow> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/drug_interactions.csv");
    interactions::load_rows(&path).unwrap()
}

fn row(drug1: &str, drug2: &str, severity: &str) -> InteractionRow {
    InteractionRow {
        drug1: drug1.into(),
        drug2: drug2.into(),
        severity: severity.into(),
    }
}

#[test]
fn trains_a_valid_three_class_artifact() {
    let rows = dataset();
    let (model, report) = relclf::train(&rows, &TrainOptions::default()).unwrap();

    assert_eq!(report.train_rows + report.test_rows, rows.len());
    assert_eq!(report.test_rows, (rows.len() as f64 * 0.2).ceil() as usize);
    assert_eq!(report.per_class.len(), 3);
    let accuracy = report.accuracy.unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let artifact = model.to_artifact();
    assert_eq!(artifact.labels, vec!["mild", "moderate", "severe"]);
    let reloaded = SeverityClassifier::from_artifact(artifact, Path::new("trained")).unwrap();

    let result = reloaded.classify_text("warfarin aspirin");
    let total: f64 = result.probabilities.iter().map(|(_, p)| p).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!((0.0..=1.0).contains(&result.confidence));
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let rows = dataset();
    let options = TrainOptions::default();
    let (first, _) = relclf::train(&rows, &options).unwrap();
    let (second, _) = relclf::train(&rows, &options).unwrap();
    assert_eq!(first.to_artifact(), second.to_artifact());
}

#[test]
fn saved_artifact_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model/interaction_model.json");
    let (model, _) = relclf::train(&dataset(), &TrainOptions::default()).unwrap();
    model.save(&path).unwrap();

    let loaded = SeverityClassifier::load(&path).unwrap();
    assert_eq!(loaded.model_version(), model.model_version());
    assert_eq!(
        loaded.classify_text("paracetamol caffeine").severity,
        model.classify_text("paracetamol caffeine").severity
    );
}

#[test]
fn missing_tier_in_training_rows_is_refused() {
    let rows = vec![
        row("warfarin", "aspirin", "severe"),
        row("paracetamol", "aspirin", "mild"),
        row("paracetamol", "caffeine", "mild"),
    ];
    let options = TrainOptions {
        test_fraction: 0.0,
        ..TrainOptions::default()
    };
    let err = relclf::train(&rows, &options).unwrap_err();
    assert!(err.to_string().contains(Severity::Moderate.as_str()));
}

#[test]
fn unknown_severity_in_training_rows_is_refused() {
    let rows = vec![
        row("warfarin", "aspirin", "severe"),
        row("paracetamol", "aspirin", "trivial"),
    ];
    assert!(relclf::train(&rows, &TrainOptions::default()).is_err());
}

#[test]
fn service_loads_a_trained_artifact_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("interaction_model.json");
    let (model, _) = relclf::train(&dataset(), &TrainOptions::default()).unwrap();
    model.save(&model_path).unwrap();

    let settings = Settings::with_data_dir(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data"),
        &model_path,
    );
    let service = InteractionService::load(&settings).unwrap();
    assert!(service.catalog().contains("warfarin"));

    let report = service
        .analyze("Taking Warfarin with aspirin and ibuprofen", None)
        .unwrap();
    assert_eq!(report.detected_drugs.len(), 3);
    assert_eq!(report.entries.len(), 3);
    for entry in &report.entries {
        assert_eq!(
            entry.recommendation.is_some(),
            entry.severity.is_risky(),
            "{} + {}",
            entry.drug_a,
            entry.drug_b
        );
    }
}
