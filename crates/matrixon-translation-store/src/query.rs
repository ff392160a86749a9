//! Query / projection engine
//!
//! ## Purpose
//! Builds every read-only view over [`crate::state::StoreState`]: per-
//! language progress (`lang_infos`), recency windows, per-user history,
//! the translator leaderboard, and the active/unused partition. None of
//! these mutate state or alias its buffers — every function here returns
//! owned data (spec.md §3: "readers of projections receive owned
//! copies").
//!
//! ## Invariants
//! - `lang_infos` sorts by untranslated-count descending, with display
//!   name ascending as the tie-break.
//!   - Tested by: `query::tests::lang_infos_sorts_by_untranslated_desc_then_name`.
//! - The *active* translation list sorts untranslated phrases (empty
//!   history) before translated ones; the *unused* list does not apply
//!   that rule.
//!   - Tested by: `query::tests::active_list_puts_untranslated_first`.
//! - `TransProgressPercent` is `floor(100*(A-U)/A)`, or 100 when `A == 0`.
//!   - Tested by: `query::tests::progress_percent_is_100_when_active_is_empty`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::languages;
use crate::state::StoreState;

const TRIM_CHARS: &[char] = &[';', ',', ':', '(', ')', '[', ']', '&', '_', ' '];

/// Normalizes a phrase for sort comparison: trims `;,:()[]&_` and spaces
/// from both ends, then lowercases. Display text is left untouched —
/// this is a comparison key only.
fn normalize_for_sort(s: &str) -> String {
    s.trim_matches(|c| TRIM_CHARS.contains(&c)).to_lowercase()
}

/// One phrase's translation history in a given language. The last
/// element of `history` is the current translation; an empty history
/// means the phrase is untranslated in that language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub phrase_id: u32,
    pub phrase: String,
    pub history: Vec<String>,
}

impl Translation {
    pub fn is_translated(&self) -> bool {
        !self.history.is_empty()
    }
}

/// Per-language progress summary (spec.md §4.1 `lang_infos`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LangInfo {
    pub code: String,
    pub display_name: String,
    pub active: Vec<Translation>,
    pub unused: Vec<Translation>,
    pub untranslated_count: usize,
}

impl LangInfo {
    /// `floor(100*(active_size-untranslated)/active_size)`, or 100 if
    /// the language has no active phrases at all (spec.md §4.1).
    pub fn progress_percent(&self) -> u32 {
        let active_size = self.active.len();
        if active_size == 0 {
            return 100;
        }
        let translated = active_size.saturating_sub(self.untranslated_count);
        ((translated * 100) / active_size) as u32
    }
}

/// A resolved edit, suitable for display (spec.md §4.1 `recent_edits`,
/// `edits_for_lang`, `edits_by_user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditView {
    pub timestamp: i64,
    pub user: String,
    pub lang_code: String,
    pub phrase_id: u32,
    pub phrase: String,
    pub text: String,
}

fn edit_view(state: &StoreState, index: usize) -> EditView {
    let edit = &state.edits[index];
    EditView {
        timestamp: edit.timestamp,
        user: state.users.get(edit.user_id).unwrap_or("?").to_string(),
        lang_code: state.lang_code(edit.lang_id).unwrap_or("?").to_string(),
        phrase_id: edit.phrase_id,
        phrase: state.phrases.get(edit.phrase_id).unwrap_or("?").to_string(),
        text: edit.text.clone(),
    }
}

/// Builds the active/unused partition of every known phrase's history
/// in one language.
fn translations_for_lang(state: &StoreState, lang_id: u32) -> (Vec<Translation>, Vec<Translation>) {
    let mut histories: HashMap<u32, Vec<String>> = HashMap::new();
    for edit in &state.edits {
        if edit.lang_id == lang_id {
            histories.entry(edit.phrase_id).or_default().push(edit.text.clone());
        }
    }

    let mut active = Vec::new();
    let mut unused = Vec::new();
    for (phrase_id, phrase) in state.phrases.iter() {
        let translation = Translation {
            phrase_id,
            phrase: phrase.to_string(),
            history: histories.remove(&phrase_id).unwrap_or_default(),
        };
        if state.active.contains(&phrase_id) {
            active.push(translation);
        } else {
            unused.push(translation);
        }
    }

    active.sort_by(|a, b| {
        (a.is_translated(), normalize_for_sort(&a.phrase))
            .cmp(&(b.is_translated(), normalize_for_sort(&b.phrase)))
    });
    unused.sort_by_key(|t| normalize_for_sort(&t.phrase));
    (active, unused)
}

/// Count of active phrases with no edit in `lang_id`.
pub fn untranslated_for_lang(state: &StoreState, lang_id: u32) -> usize {
    let translated: HashSet<u32> = state
        .edits
        .iter()
        .filter(|e| e.lang_id == lang_id && state.active.contains(&e.phrase_id))
        .map(|e| e.phrase_id)
        .collect();
    state.active.len().saturating_sub(translated.len())
}

/// Sum of `untranslated_for_lang` over the store's language domain
/// (spec.md §4.6: binary stores range over interned languages, CSV
/// stores range over the whole closed registry — see
/// [`StoreState::language_domain`]).
pub fn untranslated_count(state: &StoreState) -> usize {
    state
        .language_domain()
        .into_iter()
        .map(|lang_id| untranslated_for_lang(state, lang_id))
        .sum()
}

/// Full per-language summary, sorted by untranslated-count descending
/// with display name ascending as the tie-break (spec.md §8 property 6).
pub fn lang_infos(state: &StoreState) -> Vec<LangInfo> {
    let mut infos: Vec<LangInfo> = state
        .language_domain()
        .into_iter()
        .map(|lang_id| {
            let code = state.lang_code(lang_id).unwrap_or("").to_string();
            let display_name = languages::lang_name_by_code(&code);
            let (active, unused) = translations_for_lang(state, lang_id);
            let untranslated_count = untranslated_for_lang(state, lang_id);
            LangInfo {
                code,
                display_name,
                active,
                unused,
                untranslated_count,
            }
        })
        .collect();
    infos.sort_by(|a, b| {
        b.untranslated_count
            .cmp(&a.untranslated_count)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    infos
}

/// The `max` most recent edits, newest first. `max = None` returns all.
pub fn recent_edits(state: &StoreState, max: Option<usize>) -> Vec<EditView> {
    let cap = max.unwrap_or(state.edits.len());
    (0..state.edits.len())
        .rev()
        .take(cap)
        .map(|i| edit_view(state, i))
        .collect()
}

/// `recent_edits`, filtered to one language.
pub fn edits_for_lang(state: &StoreState, lang_id: u32, max: Option<usize>) -> Vec<EditView> {
    let cap = max.unwrap_or(usize::MAX);
    (0..state.edits.len())
        .rev()
        .filter(|&i| state.edits[i].lang_id == lang_id)
        .take(cap)
        .map(|i| edit_view(state, i))
        .collect()
}

/// Every edit by `user_id`, newest first.
pub fn edits_by_user(state: &StoreState, user_id: u32) -> Vec<EditView> {
    (0..state.edits.len())
        .rev()
        .filter(|&i| state.edits[i].user_id == user_id)
        .map(|i| edit_view(state, i))
        .collect()
}

/// Per-translator edit counts, excluding the reserved *import* user id,
/// sorted by count descending then name ascending.
pub fn translators(state: &StoreState) -> Vec<(String, usize)> {
    let import_id = state.import_user_id();
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for edit in &state.edits {
        if edit.user_id != import_id {
            *counts.entry(edit.user_id).or_insert(0) += 1;
        }
    }
    let mut list: Vec<(String, usize)> = counts
        .into_iter()
        .filter_map(|(id, count)| state.users.get(id).map(|name| (name.to_string(), count)))
        .collect();
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    list
}

/// Phrases present in the interner but not in the active set, sorted by
/// normalized text.
pub fn get_unused_strings(state: &StoreState) -> Vec<String> {
    let mut unused: Vec<String> = state
        .phrases
        .iter()
        .filter(|(id, _)| !state.active.contains(id))
        .map(|(_, text)| text.to_string())
        .collect();
    unused.sort_by_key(|t| normalize_for_sort(t));
    unused
}
