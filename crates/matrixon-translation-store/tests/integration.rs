//! Black-box integration tests against the public `Store` API.
//!
//! These exercise the crate the way an external consumer would: only
//! through `matrixon_translation_store::Store`, never through its
//! private modules. Unit-level coverage of the wire formats and
//! projection math lives in each module's own `#[cfg(test)]` block.

use matrixon_translation_store::{Store, WireFormat};
use tempfile::NamedTempFile;

fn temp_log() -> NamedTempFile {
    NamedTempFile::new().expect("create temp file")
}

#[test_log::test]
fn binary_truncation_tolerance_end_to_end() {
    let temp = temp_log();
    let path = temp.path().to_path_buf();

    {
        let store = Store::open(&path, WireFormat::Binary).unwrap();
        store
            .write_new_translation("file", "File", "en", "alice")
            .unwrap();
        store
            .write_new_translation("open", "Open", "en", "alice")
            .unwrap();
        store.close().unwrap();
    }

    let good_len = std::fs::metadata(&path).unwrap().len();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&[0x7f, 0x01]); // a dangling partial frame
    std::fs::write(&path, &bytes).unwrap();

    let store = Store::open(&path, WireFormat::Binary).unwrap();
    assert_eq!(store.edits_count(), 2);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
}

#[test_log::test]
fn csv_open_fails_on_any_malformed_row() {
    let temp = temp_log();
    std::fs::write(temp.path(), "s,0,File\nt,not-a-timestamp,alice,en,0,File\n").unwrap();
    assert!(Store::open(temp.path(), WireFormat::Csv).is_err());
}

#[test_log::test]
fn binary_and_csv_untranslated_domains_differ() {
    let binary_path = temp_log();
    let binary_store = Store::open(binary_path.path(), WireFormat::Binary).unwrap();
    binary_store
        .write_new_translation("file", "File", "en", "alice")
        .unwrap();
    // Binary domain is only interned languages: just "en" was ever used.
    assert_eq!(binary_store.untranslated_count(), 0);

    let csv_path = temp_log();
    let csv_store = Store::open(csv_path.path(), WireFormat::Csv).unwrap();
    csv_store
        .write_new_translation("file", "File", "en", "alice")
        .unwrap();
    // CSV domain is the whole closed registry: every other language still
    // has one untranslated active phrase.
    assert_eq!(
        csv_store.untranslated_count(),
        matrixon_translation_store::LANGUAGES.len() - 1
    );
}

#[test_log::test]
fn progress_percent_stays_within_bounds_across_a_longer_session() {
    let path = temp_log();
    let store = Store::open(path.path(), WireFormat::Csv).unwrap();

    let phrases = ["file", "open", "save", "close", "quit", "help"];
    for phrase in phrases {
        store
            .write_new_translation(phrase, &format!("{phrase}-en"), "en", "alice")
            .unwrap();
    }
    store
        .write_new_translation("file", "plik", "pl", "bob")
        .unwrap();
    store
        .update_strings_list(&phrases.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .unwrap();

    for info in store.lang_infos() {
        let p = info.progress_percent();
        assert!(p <= 100, "{} had progress {p}", info.code);
    }
}

#[test_log::test]
fn active_set_idempotence() {
    let path = temp_log();
    let store = Store::open(path.path(), WireFormat::Binary).unwrap();
    let set = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let first = store.update_strings_list(&set).unwrap();
    let second = store.update_strings_list(&set).unwrap();

    assert!(second.added.is_empty());
    assert!(second.deleted.is_empty());
    assert!(second.undeleted.is_empty());
    assert_eq!(first.added.len(), 3);
    assert_eq!(store.strings_count(), 3);
}

#[test_log::test]
fn recent_edits_matches_reversed_suffix() {
    let path = temp_log();
    let store = Store::open(path.path(), WireFormat::Binary).unwrap();
    for i in 0..5 {
        store
            .write_new_translation(&format!("phrase{i}"), &format!("text{i}"), "en", "alice")
            .unwrap();
    }
    assert_eq!(store.edits_count(), 5);

    let newest_three: Vec<_> = store
        .recent_edits(Some(3))
        .into_iter()
        .map(|e| e.text)
        .collect();
    assert_eq!(
        newest_three,
        vec!["text4".to_string(), "text3".to_string(), "text2".to_string()]
    );
}

#[test_log::test]
fn reopening_an_empty_path_creates_a_fresh_store() {
    let path = temp_log();
    std::fs::remove_file(path.path()).unwrap();
    let store = Store::open(path.path(), WireFormat::Csv).unwrap();
    assert_eq!(store.edits_count(), 0);
    assert_eq!(store.strings_count(), 0);
}
