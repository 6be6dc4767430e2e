//! Integration tests for the deidentify / reidentify cycle

use delilah::config::DeidentificationConfig;
use delilah::deidentify::{
    find_placeholders, Deidentifier, PatternRegistry, PhiCategory, PlaceholderGenerator,
    ReferenceTableStore,
};
use delilah::domain::{DelilahError, SessionId};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const REPORT: &str = "\
OCCUPATIONAL THERAPY ASSESSMENT REPORT

Client name: John Smith
DOB: 04/12/1968
Claim No.: ABC-123456
Phone: (555) 123-4567

BACKGROUND:
Mr. John Smith was referred by Dr. Jane Doe following a fall at work.
John Smith reported ongoing pain in the lower back.";

fn deidentifier(dir: &Path, seed: u64) -> Deidentifier {
    Deidentifier::with_registry(
        PatternRegistry::default_patterns().unwrap(),
        ReferenceTableStore::new(dir),
    )
    .with_generator(PlaceholderGenerator::seeded(seed))
}

#[test]
fn test_round_trip_restores_report() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 1);

    let scrubbed = deidentifier.deidentify(REPORT);
    assert!(!scrubbed.contains("John Smith"));
    assert!(!scrubbed.contains("Jane Doe"));
    assert!(!scrubbed.contains("04/12/1968"));
    assert!(!scrubbed.contains("ABC-123456"));
    assert!(!scrubbed.contains("123-4567"));
    assert!(scrubbed.contains("OCCUPATIONAL THERAPY ASSESSMENT REPORT"));

    assert_eq!(deidentifier.reidentify(&scrubbed), REPORT);
}

#[test]
fn test_every_category_is_counted() {
    let dir = TempDir::new().unwrap();
    let outcome = deidentifier(dir.path(), 2).deidentify_with_outcome(REPORT);

    for category in [
        PhiCategory::Name,
        PhiCategory::Date,
        PhiCategory::Phone,
        PhiCategory::IdNumber,
    ] {
        assert!(
            outcome.by_category.get(&category).copied().unwrap_or(0) > 0,
            "no {category} substitutions"
        );
    }
    assert_eq!(find_placeholders(&outcome.text).len(), outcome.substitutions());
}

#[test]
fn test_deidentify_is_idempotent_within_session() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 3);

    let once = deidentifier.deidentify(REPORT);
    let table_size = deidentifier.reference_table().len();
    let twice = deidentifier.deidentify(&once);

    assert_eq!(twice, once);
    assert_eq!(deidentifier.reference_table().len(), table_size);
}

#[test]
fn test_repeated_original_gets_distinct_placeholders() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 4);
    let text = "Seen by Mr. Tom Baker. Later, Mr. Tom Baker called again.";

    let outcome = deidentifier.deidentify_with_outcome(text);
    assert_eq!(outcome.substitutions(), 2);
    assert_ne!(outcome.placeholders[0], outcome.placeholders[1]);

    let table = deidentifier.reference_table();
    assert_eq!(table.get(&outcome.placeholders[0]), Some("Mr. Tom Baker"));
    assert_eq!(table.get(&outcome.placeholders[1]), Some("Mr. Tom Baker"));
    assert_eq!(deidentifier.reidentify(&outcome.text), text);
}

#[test]
fn test_placeholders_unique_across_calls() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 5);

    let mut issued = HashSet::new();
    for name in ["Alan Green", "Beth White", "Carl Brown", "Dana Black"] {
        let outcome = deidentifier.deidentify_with_outcome(&format!("Dr. {name} signed off."));
        for placeholder in outcome.placeholders {
            assert!(issued.insert(placeholder), "placeholder issued twice");
        }
    }
    assert_eq!(issued.len(), 4);
}

#[test]
fn test_protected_phrases_are_left_alone() {
    let dir = TempDir::new().unwrap();
    let registry = PatternRegistry::default_patterns()
        .unwrap()
        .with_exclusions(["Jane Doe"]);
    let deidentifier = Deidentifier::with_registry(registry, ReferenceTableStore::new(dir.path()));

    // Containment is enough: the match "Dr. Jane Doe" contains the phrase
    let text = "Dr. Jane Doe and Mr. John Smith attended.";
    let scrubbed = deidentifier.deidentify(text);
    assert!(scrubbed.contains("Dr. Jane Doe"));
    assert!(!scrubbed.contains("John Smith"));
}

#[test]
fn test_library_exclusions_cover_assessment_labels() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 6);

    let text = "Assessment Date: 03/05/2024";
    assert_eq!(deidentifier.deidentify(text), text);
}

#[test]
fn test_persist_and_reload_in_new_session() {
    let dir = TempDir::new().unwrap();
    let first = deidentifier(dir.path(), 7);
    let scrubbed = first.deidentify(REPORT);
    let path = first.persist().unwrap();
    assert!(path.exists());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("ref_table_"));

    let second = deidentifier(dir.path(), 8);
    assert!(second.load(first.session_id()));
    assert_eq!(second.reidentify(&scrubbed), REPORT);

    let sessions = ReferenceTableStore::new(dir.path()).list_sessions().unwrap();
    assert_eq!(sessions, vec![first.session_id().clone()]);
}

#[test]
fn test_back_to_back_sessions_keep_separate_tables() {
    let dir = TempDir::new().unwrap();
    let first = deidentifier(dir.path(), 21);
    let second = deidentifier(dir.path(), 22);
    assert_ne!(first.session_id(), second.session_id());

    let scrubbed_first = first.deidentify("Mr. John Smith was seen.");
    let scrubbed_second = second.deidentify("Mrs. Jane Doe was seen.");
    let first_path = first.persist().unwrap();
    let second_path = second.persist().unwrap();
    assert_ne!(first_path, second_path);

    let restored_first = deidentifier(dir.path(), 23);
    assert!(restored_first.load(first.session_id()));
    assert_eq!(
        restored_first.reidentify(&scrubbed_first),
        "Mr. John Smith was seen."
    );

    let restored_second = deidentifier(dir.path(), 24);
    assert!(restored_second.load(second.session_id()));
    assert_eq!(
        restored_second.reidentify(&scrubbed_second),
        "Mrs. Jane Doe was seen."
    );

    let sessions = ReferenceTableStore::new(dir.path()).list_sessions().unwrap();
    assert_eq!(sessions.len(), 2);
}

#[test]
fn test_persist_never_replaces_another_sessions_table() {
    let dir = TempDir::new().unwrap();
    let session = SessionId::new("20240101_090000").unwrap();

    let owner = deidentifier(dir.path(), 25).with_session_id(session.clone());
    let scrubbed = owner.deidentify("Patient name: Mary Jones");
    owner.persist().unwrap();

    let intruder = deidentifier(dir.path(), 26).with_session_id(session.clone());
    intruder.deidentify("Patient name: Peter Brown");
    let err = intruder.persist().unwrap_err();
    assert!(matches!(err, DelilahError::TableExists(_)));

    let reader = deidentifier(dir.path(), 27);
    assert!(reader.load(&session));
    assert_eq!(reader.reidentify(&scrubbed), "Patient name: Mary Jones");
}

#[test]
fn test_repeated_persist_updates_own_table() {
    let dir = TempDir::new().unwrap();
    let deidentifier_a = deidentifier(dir.path(), 28);
    let first = deidentifier_a.deidentify("Patient name: Mary Jones");
    deidentifier_a.persist().unwrap();
    let second = deidentifier_a.deidentify("Seen by Dr. Jane Doe.");
    deidentifier_a.persist().unwrap();

    let reader = deidentifier(dir.path(), 29);
    assert!(reader.load(deidentifier_a.session_id()));
    assert_eq!(reader.reidentify(&first), "Patient name: Mary Jones");
    assert_eq!(reader.reidentify(&second), "Seen by Dr. Jane Doe.");
}

#[test]
fn test_load_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let first = deidentifier(dir.path(), 9);
    let scrubbed = first.deidentify("Patient name: Mary Jones");
    let path = first.persist().unwrap();

    let other_dir = TempDir::new().unwrap();
    let second = deidentifier(other_dir.path(), 10);
    assert!(second.load_path(&path));
    assert_eq!(second.reidentify(&scrubbed), "Patient name: Mary Jones");
}

#[test]
fn test_malformed_table_is_rejected() {
    let dir = TempDir::new().unwrap();
    let session = SessionId::new("20240101_000000").unwrap();
    let store = ReferenceTableStore::new(dir.path());
    fs::write(store.path_for(&session), "{ not json").unwrap();

    let deidentifier = deidentifier(dir.path(), 11);
    assert!(deidentifier.try_load(&session).is_err());
    assert!(!deidentifier.load(&session));
    assert!(deidentifier.reference_table().is_empty());
}

#[test]
fn test_reidentify_leaves_unknown_placeholders() {
    let dir = TempDir::new().unwrap();
    let deidentifier = deidentifier(dir.path(), 12);
    let text = "Signed by [NAME_zzzzzzzz].";
    assert_eq!(deidentifier.reidentify(text), text);
}

#[test]
fn test_concurrent_deidentify_shares_one_table() {
    let dir = TempDir::new().unwrap();
    let deidentifier = Arc::new(deidentifier(dir.path(), 13));
    let names = [
        "Alice Moore",
        "Brian Clark",
        "Chloe Lewis",
        "David Young",
        "Emma Walker",
        "Frank Hall",
        "Grace Allen",
        "Henry King",
    ];

    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let deidentifier = Arc::clone(&deidentifier);
            let text = format!("Mr. {name} attended the session.");
            thread::spawn(move || (text.clone(), deidentifier.deidentify(&text)))
        })
        .collect();

    let results: Vec<(String, String)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(deidentifier.reference_table().len(), names.len());
    for (original, scrubbed) in results {
        assert_ne!(original, scrubbed);
        assert_eq!(deidentifier.reidentify(&scrubbed), original);
    }
}

#[test]
fn test_custom_pattern_library_from_config() {
    let dir = TempDir::new().unwrap();
    let library = dir.path().join("patterns.toml");
    fs::write(
        &library,
        r#"
exclusions = []

[[categories]]
category = "ID_NUMBER"
patterns = ['(?<!\w)Badge:\s*\d{4}(?!\w)']
"#,
    )
    .unwrap();

    let config = DeidentificationConfig {
        reference_table_dir: Some(dir.path().join("tables")),
        pattern_library: Some(library),
        ..Default::default()
    };
    let deidentifier = Deidentifier::new(&config).unwrap();

    let scrubbed = deidentifier.deidentify("Badge: 1234 for Mr. John Smith");
    assert!(!scrubbed.contains("1234"));
    assert!(scrubbed.contains("Mr. John Smith"));
    assert!(scrubbed.contains("[ID_NUMBER_"));
}

#[test]
fn test_audit_log_holds_no_plaintext() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit").join("audit.log");

    let mut config = DeidentificationConfig {
        reference_table_dir: Some(dir.path().join("tables")),
        ..Default::default()
    };
    config.audit.enabled = true;
    config.audit.log_path = audit_path.clone();

    let deidentifier = Deidentifier::new(&config).unwrap();
    deidentifier.deidentify("Dr. Jane Doe, Phone: 555-123-4567");

    let audit = fs::read_to_string(audit_path).unwrap();
    assert_eq!(audit.lines().count(), 1);
    assert!(!audit.contains("Jane Doe"));
    assert!(!audit.contains("555-123-4567"));

    let entry: serde_json::Value = serde_json::from_str(audit.trim()).unwrap();
    assert_eq!(entry["substitutions"], 2);
    assert_eq!(entry["value_hashes"].as_array().unwrap().len(), 2);
}
