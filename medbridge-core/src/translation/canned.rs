//! `CannedTranslator`: placeholder that answers with a fixed phrase.

use tracing::debug;

use super::{primary_subtag, Translator};
use crate::error::Result;

const CANNED: [(&str, &str); 5] = [
    ("es", "Texto traducido al español"),
    ("fr", "Texte traduit en français"),
    ("de", "Text ins Deutsche übersetzt"),
    ("zh", "翻译成中文的文本"),
    ("ar", "نص مترجم إلى العربية"),
];

/// Returns the canned phrase for the target language, or the input unchanged
/// when the language has no entry.
///
/// Lookup uses the primary subtag, so regional tags share an entry: `es-MX`
/// and `es` both get the Spanish phrase. An exact-code table would echo
/// `es-MX` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedTranslator;

impl Translator for CannedTranslator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let lang = primary_subtag(target_language);
        match CANNED.iter().find(|(code, _)| *code == lang) {
            Some((_, phrase)) => Ok((*phrase).to_string()),
            None => {
                debug!(language = target_language, "no canned phrase, echoing input");
                Ok(text.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages_get_canned_phrase() {
        let t = CannedTranslator;
        assert_eq!(t.translate("hello", "es").unwrap(), "Texto traducido al español");
        assert_eq!(t.translate("hello", "fr-CA").unwrap(), "Texte traduit en français");
        assert_eq!(t.translate("hello", "es-MX").unwrap(), "Texto traducido al español");
        assert_eq!(t.translate("hello", "ar").unwrap(), "نص مترجم إلى العربية");
    }

    #[test]
    fn unknown_language_echoes_input() {
        assert_eq!(CannedTranslator.translate("hello", "ja").unwrap(), "hello");
        assert_eq!(CannedTranslator.translate("", "ko").unwrap(), "");
    }
}
