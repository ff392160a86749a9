//! Public store API
//!
//! ## Purpose
//! `Store` is the crate's only public entry point: every operation of
//! spec.md §4.1, plus the snapshot/stats views SPEC_FULL.md supplements
//! (downloadable snapshot, admin dashboard). Every operation acquires
//! the store's single mutex for its entire duration (spec.md §5).
//!
//! ## Invariants
//! - A public operation that fails after mutating the in-memory index
//!   but before the log write completes leaves the index ahead of disk
//!   by at most the records of that one call; the next successful call
//!   with the same input is a no-op on the index (interning is
//!   idempotent) and repairs the divergence. No operation partially
//!   writes a frame or row to disk — `Log::append_*` builds the whole
//!   batch in memory before issuing one write.
//! - `update_strings_list` never emits a retire/restore record for a
//!   phrase that doesn't change active-set membership (resolved Open
//!   Question, see DESIGN.md), for either wire format.
//!   - Tested by: `store::tests::update_strings_list_is_silent_on_no_op`.
//! - `snapshot_binary` writes `InternUser`/`InternLanguage` records in
//!   the order its own traversal first discovers them, which is not in
//!   general the order the source store originally interned them in —
//!   every `BinaryRecord::Edit` it emits must therefore carry ids
//!   translated through the remap built alongside those intern
//!   records, never the source store's own ids.
//!   - Tested by: `store::tests::snapshot_binary_remaps_user_and_language_ids`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, info, instrument};

use crate::codec::{binary, csv as csv_codec};
use crate::error::{Result, StoreError};
use crate::languages;
use crate::log::Log;
use crate::query;
use crate::record::{BinaryRecord, CsvRecord};
use crate::state::{Edit, StoreState, WireFormat};

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The result of `update_strings_list`, relative to the prior active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSetDelta {
    /// Phrases that did not exist in the interner before this call.
    pub added: Vec<String>,
    /// Previously-active phrases the new set excludes.
    pub deleted: Vec<String>,
    /// Previously-inactive (but already interned) phrases the new set includes.
    pub undeleted: Vec<String>,
}

/// Aggregate counts for an admin-style overview (SPEC_FULL.md §4.6 supplement).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStats {
    pub phrase_count: usize,
    pub user_count: usize,
    pub edit_count: usize,
    pub lang_infos: Vec<query::LangInfo>,
}

struct Inner {
    state: StoreState,
    log: Log,
}

/// A concurrency-safe, append-only translation log store backed by one
/// on-disk file (spec.md §1/§2).
pub struct Store {
    inner: Mutex<Inner>,
}

/// Resolves `code` to a language id in `state`'s domain, or `None` if
/// the code is real but hasn't been used by this store yet (only
/// possible for binary stores, whose language ids come from a per-file
/// interner rather than the closed registry).
fn resolve_known_lang_id(state: &StoreState, code: &str) -> Result<Option<u32>> {
    if !languages::is_known_code(code) {
        return Err(StoreError::InvalidLanguageCode(code.to_string()));
    }
    Ok(match state.format {
        WireFormat::Binary => state.lang_interner.id_of(code),
        WireFormat::Csv => languages::lang_id(code),
    })
}

/// The latest edit per `(phrase_id, lang_id)` pair, in a deterministic order.
fn latest_translations(state: &StoreState) -> BTreeMap<(u32, u32), &Edit> {
    let mut map = BTreeMap::new();
    for edit in &state.edits {
        map.insert((edit.phrase_id, edit.lang_id), edit);
    }
    map
}

impl Store {
    /// Opens (creating if absent) the log at `path`, replaying any
    /// existing records. `format` only matters for a fresh file — an
    /// existing one is always read in whatever format it was written.
    #[instrument(skip(path))]
    pub fn open(path: impl AsRef<Path>, format: WireFormat) -> Result<Self> {
        let (log, state) = Log::open(path, format)?;
        info!(
            ?format,
            phrases = state.phrases.len(),
            users = state.users.len(),
            edits = state.edits.len(),
            "opened translation store"
        );
        Ok(Self {
            inner: Mutex::new(Inner { state, log }),
        })
    }

    /// Flushes and syncs the log file. Best-effort (spec.md §5).
    #[instrument(skip(self))]
    pub fn close(&self) -> Result<()> {
        self.inner.lock().unwrap().log.sync()
    }

    pub fn format(&self) -> WireFormat {
        self.inner.lock().unwrap().log.format()
    }

    /// The reserved *import* user id for this store's wire format
    /// (binary: 1, CSV: 0 — see DESIGN.md for the resolved Open Question).
    pub fn import_user_id(&self) -> u32 {
        self.inner.lock().unwrap().state.import_user_id()
    }

    #[instrument(skip(self, translation))]
    pub fn write_new_translation(
        &self,
        phrase: &str,
        translation: &str,
        lang_code: &str,
        user: &str,
    ) -> Result<()> {
        if !languages::is_known_code(lang_code) {
            return Err(StoreError::InvalidLanguageCode(lang_code.to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let timestamp = now();
        let (phrase_id, phrase_is_new) = inner.state.intern_phrase(phrase);
        let (user_id, user_is_new) = inner.state.intern_user(user);

        let lang_id = match inner.state.format {
            WireFormat::Binary => {
                let mut records = Vec::new();
                if phrase_is_new {
                    debug!(phrase_id, phrase, "interned new phrase");
                    records.push(BinaryRecord::InternPhrase(phrase.to_string()));
                }
                if user_is_new {
                    records.push(BinaryRecord::InternUser(user.to_string()));
                }
                let (lang_id, lang_is_new) = inner.state.intern_language(lang_code);
                if lang_is_new {
                    records.push(BinaryRecord::InternLanguage(lang_code.to_string()));
                }
                records.push(BinaryRecord::Edit {
                    lang_id,
                    user_id,
                    phrase_id,
                    text: translation.to_string(),
                });
                inner.log.append_binary(timestamp, &records)?;
                lang_id
            }
            WireFormat::Csv => {
                let mut records = Vec::new();
                if phrase_is_new {
                    debug!(phrase_id, phrase, "interned new phrase");
                    records.push(CsvRecord::DeclarePhrase {
                        id: phrase_id,
                        text: phrase.to_string(),
                    });
                }
                records.push(CsvRecord::Edit {
                    timestamp,
                    user: user.to_string(),
                    lang_code: lang_code.to_string(),
                    phrase_id,
                    text: translation.to_string(),
                });
                inner.log.append_csv(&records)?;
                languages::lang_id(lang_code).expect("validated above")
            }
        };

        inner.state.push_edit(Edit {
            lang_id,
            user_id,
            phrase_id,
            text: translation.to_string(),
            timestamp,
        });
        Ok(())
    }

    /// For each language with at least one prior edit of `src_phrase`,
    /// replays its latest translation onto `dst_phrase` with a fresh
    /// timestamp. A no-op (but still interns `dst_phrase`) when
    /// `src_phrase` has never been translated — see DESIGN.md.
    #[instrument(skip(self))]
    pub fn duplicate_translation(&self, src_phrase: &str, dst_phrase: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let src_id = inner
            .state
            .phrases
            .id_of(src_phrase)
            .ok_or_else(|| StoreError::UnknownPhrase(src_phrase.to_string()))?;

        let mut latest: BTreeMap<u32, (u32, String)> = BTreeMap::new();
        for edit in &inner.state.edits {
            if edit.phrase_id == src_id {
                latest.insert(edit.lang_id, (edit.user_id, edit.text.clone()));
            }
        }

        let timestamp = now();
        let (dst_id, dst_is_new) = inner.state.intern_phrase(dst_phrase);

        let mut binary_records = Vec::new();
        let mut csv_records = Vec::new();
        if dst_is_new {
            match inner.state.format {
                WireFormat::Binary => {
                    binary_records.push(BinaryRecord::InternPhrase(dst_phrase.to_string()))
                }
                WireFormat::Csv => csv_records.push(CsvRecord::DeclarePhrase {
                    id: dst_id,
                    text: dst_phrase.to_string(),
                }),
            }
        }

        let mut new_edits = Vec::new();
        for (lang_id, (user_id, text)) in &latest {
            match inner.state.format {
                WireFormat::Binary => binary_records.push(BinaryRecord::Edit {
                    lang_id: *lang_id,
                    user_id: *user_id,
                    phrase_id: dst_id,
                    text: text.clone(),
                }),
                WireFormat::Csv => {
                    let lang_code = inner.state.lang_code(*lang_id).unwrap_or("").to_string();
                    let user = inner.state.users.get(*user_id).unwrap_or("").to_string();
                    csv_records.push(CsvRecord::Edit {
                        timestamp,
                        user,
                        lang_code,
                        phrase_id: dst_id,
                        text: text.clone(),
                    });
                }
            }
            new_edits.push(Edit {
                lang_id: *lang_id,
                user_id: *user_id,
                phrase_id: dst_id,
                text: text.clone(),
                timestamp,
            });
        }

        match inner.state.format {
            WireFormat::Binary => {
                if !binary_records.is_empty() {
                    inner.log.append_binary(timestamp, &binary_records)?;
                }
            }
            WireFormat::Csv => {
                if !csv_records.is_empty() {
                    inner.log.append_csv(&csv_records)?;
                }
            }
        }
        for edit in new_edits {
            inner.state.push_edit(edit);
        }
        Ok(())
    }

    /// Sets the active set to exactly `new_phrases`, interning any
    /// phrase not already known, and returns the partition relative to
    /// the prior active set.
    #[instrument(skip(self, new_phrases))]
    pub fn update_strings_list(&self, new_phrases: &[String]) -> Result<ActiveSetDelta> {
        let mut inner = self.inner.lock().unwrap();
        let timestamp = now();
        let prior_active = inner.state.active.clone();

        let mut new_ids: HashSet<u32> = HashSet::new();
        let mut newly_interned: HashSet<u32> = HashSet::new();
        let mut added = Vec::new();
        let mut binary_records = Vec::new();
        let mut csv_records = Vec::new();

        for phrase in new_phrases {
            let (id, is_new) = inner.state.intern_phrase(phrase);
            new_ids.insert(id);
            if is_new {
                newly_interned.insert(id);
                added.push(phrase.clone());
                match inner.state.format {
                    WireFormat::Binary => {
                        binary_records.push(BinaryRecord::InternPhrase(phrase.clone()))
                    }
                    WireFormat::Csv => {
                        csv_records.push(CsvRecord::DeclarePhrase {
                            id,
                            text: phrase.clone(),
                        })
                    }
                }
            }
        }

        let mut deleted = Vec::new();
        for &id in prior_active.difference(&new_ids) {
            deleted.push(inner.state.phrases.get(id).unwrap_or("").to_string());
            if inner.state.format == WireFormat::Binary {
                binary_records.push(BinaryRecord::Retire(id));
            }
        }

        let mut undeleted = Vec::new();
        for &id in new_ids.difference(&prior_active) {
            if newly_interned.contains(&id) {
                continue;
            }
            undeleted.push(inner.state.phrases.get(id).unwrap_or("").to_string());
            if inner.state.format == WireFormat::Binary {
                binary_records.push(BinaryRecord::Restore(id));
            }
        }

        inner.state.set_active_exact(new_ids.iter().copied());

        match inner.state.format {
            WireFormat::Binary => {
                if !binary_records.is_empty() {
                    inner.log.append_binary(timestamp, &binary_records)?;
                }
            }
            WireFormat::Csv => {
                // Mirrors the binary branch above: a call that changes
                // nothing relative to `prior_active` (and therefore
                // leaves `added`/`deleted`/`undeleted` all empty) writes
                // nothing to the log either — see DESIGN.md's resolution
                // of Open Question 2.
                if !(added.is_empty() && deleted.is_empty() && undeleted.is_empty()) {
                    let mut ids: Vec<u32> = new_ids.iter().copied().collect();
                    ids.sort_unstable();
                    csv_records.push(CsvRecord::ActiveSet { timestamp, ids });
                    inner.log.append_csv(&csv_records)?;
                }
            }
        }

        deleted.sort();
        undeleted.sort();
        info!(
            added = added.len(),
            deleted = deleted.len(),
            undeleted = undeleted.len(),
            "updated active strings list"
        );
        Ok(ActiveSetDelta {
            added,
            deleted,
            undeleted,
        })
    }

    pub fn langs_count(&self) -> usize {
        self.inner.lock().unwrap().state.languages_with_edits().len()
    }

    pub fn strings_count(&self) -> usize {
        self.inner.lock().unwrap().state.active.len()
    }

    pub fn edits_count(&self) -> usize {
        self.inner.lock().unwrap().state.edits.len()
    }

    pub fn untranslated_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        query::untranslated_count(&inner.state)
    }

    pub fn untranslated_for_lang(&self, code: &str) -> Result<usize> {
        let inner = self.inner.lock().unwrap();
        match resolve_known_lang_id(&inner.state, code)? {
            Some(lang_id) => Ok(query::untranslated_for_lang(&inner.state, lang_id)),
            None => Ok(0),
        }
    }

    pub fn lang_infos(&self) -> Vec<query::LangInfo> {
        let inner = self.inner.lock().unwrap();
        query::lang_infos(&inner.state)
    }

    pub fn recent_edits(&self, max: Option<usize>) -> Vec<query::EditView> {
        let inner = self.inner.lock().unwrap();
        query::recent_edits(&inner.state, max)
    }

    pub fn edits_for_lang(&self, code: &str, max: Option<usize>) -> Result<Vec<query::EditView>> {
        let inner = self.inner.lock().unwrap();
        match resolve_known_lang_id(&inner.state, code)? {
            Some(lang_id) => Ok(query::edits_for_lang(&inner.state, lang_id, max)),
            None => Ok(Vec::new()),
        }
    }

    pub fn edits_by_user(&self, name: &str) -> Vec<query::EditView> {
        let inner = self.inner.lock().unwrap();
        match inner.state.users.id_of(name) {
            Some(user_id) => query::edits_by_user(&inner.state, user_id),
            None => Vec::new(),
        }
    }

    pub fn translators(&self) -> Vec<(String, usize)> {
        let inner = self.inner.lock().unwrap();
        query::translators(&inner.state)
    }

    pub fn get_unused_strings(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        query::get_unused_strings(&inner.state)
    }

    /// Aggregate counts plus the full per-language breakdown, for an
    /// admin-style overview (SPEC_FULL.md §4.1 supplement).
    pub fn snapshot_stats(&self) -> SnapshotStats {
        let inner = self.inner.lock().unwrap();
        SnapshotStats {
            phrase_count: inner.state.phrases.len(),
            user_count: inner.state.users.len(),
            edit_count: inner.state.edits.len(),
            lang_infos: query::lang_infos(&inner.state),
        }
    }

    /// Writes a minimal CSV log that reconstructs to an equivalent
    /// state (current phrases, current per-(phrase, language)
    /// translations, current active set) — not a replay of the actual
    /// history (SPEC_FULL.md §4.1 supplement, "downloadable snapshot").
    #[instrument(skip(self, writer))]
    pub fn snapshot_csv<W: Write>(&self, writer: W) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);

        for (id, text) in inner.state.phrases.iter() {
            csv_codec::write_record(
                &mut csv_writer,
                &CsvRecord::DeclarePhrase {
                    id,
                    text: text.to_string(),
                },
            )?;
        }
        for ((phrase_id, lang_id), edit) in latest_translations(&inner.state) {
            let lang_code = inner.state.lang_code(lang_id).unwrap_or("").to_string();
            let user = inner.state.users.get(edit.user_id).unwrap_or("").to_string();
            csv_codec::write_record(
                &mut csv_writer,
                &CsvRecord::Edit {
                    timestamp: edit.timestamp,
                    user,
                    lang_code,
                    phrase_id,
                    text: edit.text.clone(),
                },
            )?;
        }
        let mut active: Vec<u32> = inner.state.active.iter().copied().collect();
        active.sort_unstable();
        csv_codec::write_record(
            &mut csv_writer,
            &CsvRecord::ActiveSet {
                timestamp: now(),
                ids: active,
            },
        )?;
        csv_writer.flush()?;
        Ok(())
    }

    /// Binary counterpart of [`Store::snapshot_csv`].
    #[instrument(skip(self, writer))]
    pub fn snapshot_binary<W: Write>(&self, mut writer: W) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        let ts = now();

        for (_, text) in inner.state.phrases.iter() {
            let payload = binary::encode_record(&BinaryRecord::InternPhrase(text.to_string()));
            writer.write_all(&binary::encode_frame(ts, &payload))?;
        }

        // `latest` is ordered by (phrase_id, lang_id), not by the order
        // the source store originally interned users/languages in — so
        // each first sighting here gets a *fresh* sequential id, tracked
        // in these remaps, and every edit below must be translated
        // through them rather than carrying the source store's own ids.
        let latest = latest_translations(&inner.state);
        let mut user_remap: HashMap<u32, u32> = HashMap::new();
        let mut lang_remap: HashMap<u32, u32> = HashMap::new();
        for ((_, lang_id), edit) in &latest {
            if !user_remap.contains_key(&edit.user_id) {
                user_remap.insert(edit.user_id, user_remap.len() as u32);
                let name = inner.state.users.get(edit.user_id).unwrap_or("");
                let payload = binary::encode_record(&BinaryRecord::InternUser(name.to_string()));
                writer.write_all(&binary::encode_frame(ts, &payload))?;
            }
            if !lang_remap.contains_key(lang_id) {
                lang_remap.insert(*lang_id, lang_remap.len() as u32);
                let code = inner.state.lang_code(*lang_id).unwrap_or("");
                let payload = binary::encode_record(&BinaryRecord::InternLanguage(code.to_string()));
                writer.write_all(&binary::encode_frame(ts, &payload))?;
            }
        }

        for ((phrase_id, lang_id), edit) in &latest {
            let payload = binary::encode_record(&BinaryRecord::Edit {
                lang_id: lang_remap[lang_id],
                user_id: user_remap[&edit.user_id],
                phrase_id: *phrase_id,
                text: edit.text.clone(),
            });
            writer.write_all(&binary::encode_frame(edit.timestamp, &payload))?;
        }

        for (id, _) in inner.state.phrases.iter() {
            if !inner.state.active.contains(&id) {
                let payload = binary::encode_record(&BinaryRecord::Retire(id));
                writer.write_all(&binary::encode_frame(ts, &payload))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "matrixon-translation-store-store-test-{name}-{:?}",
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test_log::test]
    fn scenario_s1_s2_s3_s4_s5() {
        let path = temp_path("scenarios");
        let store = Store::open(&path, WireFormat::Binary).unwrap();

        // S1
        store
            .write_new_translation("foo", "foo-us", "en", "user1")
            .unwrap();
        assert_eq!(store.edits_count(), 1);
        assert_eq!(store.strings_count(), 1);

        // S2
        store
            .write_new_translation("foo", "foo-pl", "pl", "user1")
            .unwrap();
        assert_eq!(store.edits_count(), 2);

        // S3
        store
            .write_new_translation("bar", "bar-pl", "pl", "user1")
            .unwrap();
        assert_eq!(store.edits_count(), 3);
        assert_eq!(store.strings_count(), 2);

        // S4
        store.duplicate_translation("foo", "foo2").unwrap();
        assert_eq!(store.edits_count(), 5);

        // S5
        let delta = store
            .update_strings_list(&[
                "foo".to_string(),
                "bar".to_string(),
                "go".to_string(),
            ])
            .unwrap();
        assert_eq!(delta.added, vec!["go".to_string()]);
        assert!(delta.deleted.contains(&"foo2".to_string()));
        assert_eq!(store.strings_count(), 3);
        let unused = store.get_unused_strings();
        assert!(unused.contains(&"foo2".to_string()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn scenario_s6_single_active_phrase() {
        let path = temp_path("s6");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        store
            .write_new_translation("file", "File", "en", "user1")
            .unwrap();

        let infos = store.lang_infos();
        let en = infos.iter().find(|i| i.code == "en").unwrap();
        assert_eq!(en.untranslated_count, 0);
        assert_eq!(en.active.len(), 1);
        assert_eq!(en.active[0].history, vec!["File".to_string()]);

        for info in &infos {
            if info.code != "en" {
                assert_eq!(info.untranslated_count, 1);
            }
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn unknown_language_code_is_rejected() {
        let path = temp_path("bad-lang");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        let err = store
            .write_new_translation("foo", "bar", "xx-nope", "user1")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidLanguageCode(_)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn duplicate_translation_on_untranslated_phrase_is_a_no_op() {
        let path = temp_path("dup-noop");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        store.update_strings_list(&["foo".to_string()]).unwrap();
        store.duplicate_translation("foo", "foo2").unwrap();
        assert_eq!(store.edits_count(), 0);
        assert!(store.strings_count() == 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn duplicate_translation_on_unknown_phrase_errors() {
        let path = temp_path("dup-unknown");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        let err = store
            .duplicate_translation("never-seen", "dst")
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownPhrase(_)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn update_strings_list_is_silent_on_no_op() {
        let path = temp_path("update-idempotent");
        let store = Store::open(&path, WireFormat::Binary).unwrap();
        let set = vec!["a".to_string(), "b".to_string()];
        store.update_strings_list(&set).unwrap();
        let delta = store.update_strings_list(&set).unwrap();
        assert!(delta.added.is_empty());
        assert!(delta.deleted.is_empty());
        assert!(delta.undeleted.is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    /// Same property as `update_strings_list_is_silent_on_no_op`, but for
    /// the CSV format and asserting on-disk growth directly — a repeated
    /// call with the same set must not append an `as` row (DESIGN.md's
    /// resolution of Open Question 2 applies to both wire formats).
    #[test_log::test]
    fn update_strings_list_is_silent_on_no_op_csv() {
        let path = temp_path("update-idempotent-csv");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        let set = vec!["a".to_string(), "b".to_string()];
        store.update_strings_list(&set).unwrap();
        store.close().unwrap();
        let len_after_first = std::fs::metadata(&path).unwrap().len();

        let delta = store.update_strings_list(&set).unwrap();
        store.close().unwrap();
        let len_after_second = std::fs::metadata(&path).unwrap().len();

        assert!(delta.added.is_empty());
        assert!(delta.deleted.is_empty());
        assert!(delta.undeleted.is_empty());
        assert_eq!(
            len_after_first, len_after_second,
            "a no-op update_strings_list call must not grow the CSV log"
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn translators_excludes_import_user() {
        let path = temp_path("import-user");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        let import_id = store.import_user_id();
        assert_eq!(import_id, 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn replay_fidelity_across_reopen() {
        let path = temp_path("replay-fidelity");
        {
            let store = Store::open(&path, WireFormat::Binary).unwrap();
            store
                .write_new_translation("foo", "Foo-EN", "en", "alice")
                .unwrap();
            store
                .write_new_translation("foo", "Foo-PL", "pl", "alice")
                .unwrap();
            store.close().unwrap();
        }
        let reopened = Store::open(&path, WireFormat::Binary).unwrap();
        assert_eq!(reopened.edits_count(), 2);
        assert_eq!(reopened.strings_count(), 1);
        let recent: Vec<_> = reopened.recent_edits(None).into_iter().map(|e| e.text).collect();
        assert_eq!(recent, vec!["Foo-PL".to_string(), "Foo-EN".to_string()]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn snapshot_csv_roundtrips_through_a_fresh_store() {
        let path = temp_path("snapshot-csv-src");
        let store = Store::open(&path, WireFormat::Csv).unwrap();
        store
            .write_new_translation("file", "File", "en", "alice")
            .unwrap();

        let mut buf = Vec::new();
        store.snapshot_csv(&mut buf).unwrap();

        let snap_path = temp_path("snapshot-csv-dst");
        std::fs::write(&snap_path, &buf).unwrap();
        let reopened = Store::open(&snap_path, WireFormat::Csv).unwrap();
        assert_eq!(reopened.strings_count(), 1);
        assert_eq!(reopened.edits_count(), 1);

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&snap_path).unwrap();
    }

    /// Regression test for a snapshot that discovers a later-interned
    /// user before an earlier-interned one, purely because of
    /// `latest_translations`' `(phrase_id, lang_id)` traversal order.
    /// Without a remap, the re-encoded `Edit` records would carry the
    /// *source* store's ids and get silently misattributed once replayed
    /// against the snapshot's own fresh interners.
    ///
    /// Built so the mismatch is forced rather than coincidental: alice is
    /// the first user ever interned (id 0) and translates "phraseA", but
    /// bob (id 1) later re-translates that same (phrase, language) pair,
    /// overwriting it in `latest_translations`. Alice's surviving edit is
    /// on a *larger* phrase id ("phraseC"), so sorting `latest` by
    /// `(phrase_id, lang_id)` visits bob before alice — the reverse of
    /// their original interning order.
    #[test_log::test]
    fn snapshot_binary_remaps_user_and_language_ids() {
        let path = temp_path("snapshot-binary-remap-src");
        let store = Store::open(&path, WireFormat::Binary).unwrap();

        store
            .write_new_translation("phraseA", "v1", "en", "alice")
            .unwrap();
        store
            .write_new_translation("phraseB", "v2", "pl", "bob")
            .unwrap();
        store
            .write_new_translation("phraseC", "v3", "en", "alice")
            .unwrap();
        // Overwrites the (phraseA, en) slot with bob's edit, so the
        // smallest-sorted `latest` entry now belongs to the *second*
        // interned user.
        store
            .write_new_translation("phraseA", "v4", "en", "bob")
            .unwrap();

        let mut buf = Vec::new();
        store.snapshot_binary(&mut buf).unwrap();

        let snap_path = temp_path("snapshot-binary-remap-dst");
        std::fs::write(&snap_path, &buf).unwrap();
        let reopened = Store::open(&snap_path, WireFormat::Binary).unwrap();

        assert_eq!(reopened.edits_count(), store.edits_count());
        assert_eq!(reopened.strings_count(), store.strings_count());

        let mut expected_translators = store.translators();
        let mut actual_translators = reopened.translators();
        expected_translators.sort();
        actual_translators.sort();
        assert_eq!(actual_translators, expected_translators);

        let mut expected_edits: Vec<_> = store
            .recent_edits(None)
            .into_iter()
            .map(|e| (e.user, e.lang_code, e.phrase, e.text))
            .collect();
        let mut actual_edits: Vec<_> = reopened
            .recent_edits(None)
            .into_iter()
            .map(|e| (e.user, e.lang_code, e.phrase, e.text))
            .collect();
        expected_edits.sort();
        actual_edits.sort();
        assert_eq!(
            actual_edits, expected_edits,
            "snapshot_binary must preserve which user/language each edit belongs to"
        );

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&snap_path).unwrap();
    }
}
