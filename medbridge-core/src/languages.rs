//! Languages offered to callers, with display names.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// Whether the phrasebook and term tooling are tuned for this language.
    pub medical_terms_support: bool,
}

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    medical_terms_support: bool,
) -> Language {
    Language {
        code,
        name,
        native_name,
        medical_terms_support,
    }
}

pub const LANGUAGES: [Language; 12] = [
    lang("en", "English", "English", true),
    lang("es", "Spanish", "Español", true),
    lang("fr", "French", "Français", true),
    lang("de", "German", "Deutsch", true),
    lang("zh", "Chinese", "中文", false),
    lang("ja", "Japanese", "日本語", false),
    lang("ar", "Arabic", "العربية", false),
    lang("pt", "Portuguese", "Português", false),
    lang("ru", "Russian", "Русский", false),
    lang("hi", "Hindi", "हिन्दी", false),
    lang("it", "Italian", "Italiano", false),
    lang("ko", "Korean", "한국어", false),
];

pub fn language_by_code(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// English display name, or `code` itself when unknown.
pub fn language_name(code: &str) -> &str {
    language_by_code(code).map(|l| l.name).unwrap_or(code)
}

pub fn native_name(code: &str) -> &str {
    language_by_code(code).map(|l| l.native_name).unwrap_or(code)
}

pub fn has_medical_terms_support(code: &str) -> bool {
    language_by_code(code).is_some_and(|l| l.medical_terms_support)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_or_fall_back_to_code() {
        assert_eq!(language_name("de"), "German");
        assert_eq!(native_name("ja"), "日本語");
        assert_eq!(language_name("sv"), "sv");
        assert_eq!(native_name("sv"), "sv");
    }

    #[test]
    fn medical_support_flags() {
        assert!(has_medical_terms_support("es"));
        assert!(!has_medical_terms_support("ko"));
        assert!(!has_medical_terms_support("xx"));
    }
}
