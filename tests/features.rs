use ddi_assistant::nlp::features::{analyze, TfidfEncoder};

#[test]
fn analyzer_lowercases_drops_stop_words_and_short_tokens() {
    let terms = analyze("Warfarin and the Aspirin x", (1, 1), true);
    assert_eq!(terms, vec!["warfarin", "aspirin"]);

    let kept = analyze("Warfarin and aspirin", (1, 1), false);
    assert_eq!(kept, vec!["warfarin", "and", "aspirin"]);
}

#[test]
fn bigrams_join_adjacent_tokens_after_stop_word_removal() {
    let terms = analyze("warfarin with aspirin", (1, 2), true);
    assert_eq!(terms, vec!["warfarin", "aspirin", "warfarin aspirin"]);
}

#[test]
fn idf_is_smoothed_and_vectors_are_unit_length() {
    let docs = ["warfarin aspirin", "paracetamol aspirin"];
    let encoder = TfidfEncoder::fit(&docs, (1, 1), true);

    let aspirin = encoder.vocabulary["aspirin"];
    let warfarin = encoder.vocabulary["warfarin"];
    // In every document: ln(3/3) + 1.
    assert!((encoder.idf[aspirin] - 1.0).abs() < 1e-12);
    assert!((encoder.idf[warfarin] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);

    let v = encoder.transform("warfarin aspirin");
    assert!((v.dot(&v) - 1.0).abs() < 1e-12);
    assert!(v[warfarin] > v[aspirin]);
}

#[test]
fn unknown_terms_encode_to_zero() {
    let encoder = TfidfEncoder::fit(&["warfarin aspirin"], (1, 2), true);
    let v = encoder.transform("nothing familiar");
    assert_eq!(v.len(), encoder.n_features());
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn vocabulary_columns_follow_term_order() {
    let encoder = TfidfEncoder::fit(&["zinc aspirin", "codeine"], (1, 1), true);
    let terms: Vec<&str> = encoder.vocabulary.keys().map(String::as_str).collect();
    assert_eq!(terms, vec!["aspirin", "codeine", "zinc"]);
    assert_eq!(encoder.vocabulary["aspirin"], 0);
    assert_eq!(encoder.vocabulary["zinc"], 2);
    assert!(encoder.validate().is_ok());
}

#[test]
fn validate_catches_broken_encoders() {
    let mut encoder = TfidfEncoder::fit(&["warfarin aspirin"], (1, 1), true);
    encoder.vocabulary.insert("extra".into(), 7);
    encoder.idf.push(1.0);
    assert!(encoder.validate().is_err());

    let mut ngrams = TfidfEncoder::fit(&["warfarin aspirin"], (1, 1), true);
    ngrams.ngram_range = (2, 1);
    assert!(ngrams.validate().is_err());
}
