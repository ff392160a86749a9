//! In-memory index and state
//!
//! ## Purpose
//! Holds everything the store knows after replaying (or appending to) its
//! log: the phrase/user interners, the append-order edit vector, the
//! active-phrase set, and — for the binary wire format only — a private
//! interner for language codes (spec.md §4.3: "the binary format uses
//! per-file language interning; the CSV format uses the closed language
//! registry for stable language ids").
//!
//! ## Mental model
//! This module is the single place that mutates the five invariants of
//! spec.md §3. Both the live write path (`store::Store`) and the replay
//! path (`log::replay`) drive state changes through these methods, which
//! is what gives property 2 ("replay fidelity") its foundation: there is
//! exactly one way to apply an intern, an edit, a retire, or a restore.
//!
//! ## Invariants
//! - Every `phrase_id`/`user_id`/`lang_id` an `Edit` carries refers to an
//!   already-interned entity.
//!   - Enforced in: callers of `push_edit` (see `store.rs`, `log.rs`)
//!     must intern first; `push_edit` itself does not validate, since by
//!     the time it runs in the live path the ids are freshly minted.
//!   - Tested by: `log::tests::binary_replay_rejects_edit_with_unknown_id`
//!     (enforced in `log::apply_binary_record`, not here — this module
//!     has no path that can construct an `Edit` with a dangling id).
//! - The active set is always a subset of interned phrase ids.
//!   - Enforced in: `StoreState::restore`/`intern_phrase` only ever
//!     insert ids that came out of `self.phrases`.

use std::collections::HashSet;

use crate::interner::Interner;

/// Which wire format a given log file uses. Fixed at file-creation time
/// (spec.md §4.3) and is the only thing that changes the language-id
/// model and the "untranslated" domain (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Binary,
    Csv,
}

/// One translation event: phrase `phrase_id`, translated by `user_id`
/// into language `lang_id`, at `timestamp` (Unix seconds). Immutable once
/// appended (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub lang_id: u32,
    pub user_id: u32,
    pub phrase_id: u32,
    pub text: String,
    pub timestamp: i64,
}

/// Reserved *import* user id, fixed per wire format (spec.md §9 Open
/// Question, resolved in DESIGN.md): edits attributed to a prior system
/// rather than a live translator carry this id and are excluded from
/// [`crate::query::translators`].
pub const IMPORT_USER_ID_BINARY: u32 = 1;
pub const IMPORT_USER_ID_CSV: u32 = 0;

#[derive(Debug, Clone)]
pub struct StoreState {
    pub format: WireFormat,
    pub phrases: Interner,
    pub users: Interner,
    /// Only populated (and only consulted) when `format == WireFormat::Binary`.
    pub lang_interner: Interner,
    pub edits: Vec<Edit>,
    pub active: HashSet<u32>,
}

impl StoreState {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            phrases: Interner::new(),
            users: Interner::new(),
            lang_interner: Interner::new(),
            edits: Vec::new(),
            active: HashSet::new(),
        }
    }

    pub fn import_user_id(&self) -> u32 {
        match self.format {
            WireFormat::Binary => IMPORT_USER_ID_BINARY,
            WireFormat::Csv => IMPORT_USER_ID_CSV,
        }
    }

    /// Interns `text` as a phrase, auto-assigning the next id. A newly
    /// interned phrase joins the active set by default (spec.md's
    /// lifecycle note that a phrase is "created at first reference");
    /// `update_strings_list` is the only operation that can retire it.
    pub fn intern_phrase(&mut self, text: &str) -> (u32, bool) {
        let (id, is_new) = self.phrases.intern(text);
        if is_new {
            self.active.insert(id);
        }
        (id, is_new)
    }

    /// Declares a phrase at an explicit id (CSV `s,strId,text` row).
    /// Fails if `id` isn't the next id this interner would assign —
    /// spec.md §4.5: "Binary `s`/user/lang intern records must assign
    /// the next expected id," which the CSV reader applies identically
    /// to its own `s` rows.
    pub fn declare_phrase(&mut self, id: u32, text: &str) -> Result<(), u32> {
        self.phrases.intern_at(id, text)?;
        self.active.insert(id);
        Ok(())
    }

    pub fn intern_user(&mut self, name: &str) -> (u32, bool) {
        self.users.intern(name)
    }

    /// Binary-only: interns a language code into the per-file language
    /// interner.
    pub fn intern_language(&mut self, code: &str) -> (u32, bool) {
        debug_assert_eq!(self.format, WireFormat::Binary);
        self.lang_interner.intern(code)
    }

    /// Removes `phrase_id` from the active set. Returns whether it was
    /// present beforehand — callers use this to decide whether a
    /// double-retire warning applies (spec.md §4.5).
    pub fn retire(&mut self, phrase_id: u32) -> bool {
        self.active.remove(&phrase_id)
    }

    /// Adds `phrase_id` to the active set. Returns whether it was newly
    /// inserted (false means it was already active — a double-restore).
    pub fn restore(&mut self, phrase_id: u32) -> bool {
        self.active.insert(phrase_id)
    }

    /// CSV `as` record: replaces the active set wholesale.
    pub fn set_active_exact(&mut self, ids: impl IntoIterator<Item = u32>) {
        self.active = ids.into_iter().collect();
    }

    pub fn push_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// The language ids this store's queries should range over.
    ///
    /// Binary stores only ever intern a language right before the edit
    /// that references it (see `store::Store::write_new_translation`),
    /// so "interned" and "has at least one edit" coincide — the domain
    /// is simply every interned language. CSV stores never intern
    /// languages at all; their id space is the whole closed registry,
    /// so the domain is every registry entry regardless of whether it
    /// has been used yet. This is the one place binary and CSV stores
    /// behave differently, called out explicitly in spec.md §4.6.
    pub fn language_domain(&self) -> Vec<u32> {
        match self.format {
            WireFormat::Binary => (0..self.lang_interner.len() as u32).collect(),
            WireFormat::Csv => (0..crate::languages::LANGUAGES.len() as u32).collect(),
        }
    }

    /// Resolves a language id to its ISO-ish code, regardless of format.
    pub fn lang_code(&self, lang_id: u32) -> Option<&str> {
        match self.format {
            WireFormat::Binary => self.lang_interner.get(lang_id),
            WireFormat::Csv => crate::languages::lang_by_id(lang_id).map(|l| l.code),
        }
    }

    /// Languages that actually have at least one edit, regardless of
    /// format — this is `langs_count()`'s domain (spec.md §4.1), which
    /// unlike `untranslated_count` is not format-dependent.
    pub fn languages_with_edits(&self) -> std::collections::BTreeSet<u32> {
        self.edits.iter().map(|e| e.lang_id).collect()
    }
}
