//! Text translation backends.
//!
//! No real machine translation lives here. `CannedTranslator` returns a fixed
//! phrase per target language and `PhrasebookTranslator` layers a small medical
//! phrasebook on top of another backend. A network-backed translator slots in
//! behind the same trait.

pub mod canned;
pub mod phrasebook;

pub use canned::CannedTranslator;
pub use phrasebook::PhrasebookTranslator;

use crate::error::Result;

/// Contract for translation backends.
pub trait Translator: Send + Sync + 'static {
    /// Translate `text` into `target_language` (ISO 639-1 code, e.g. `"es"`).
    fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Primary subtag of a language tag: `"es-MX"` → `"es"`.
pub(crate) fn primary_subtag(language: &str) -> String {
    language
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::primary_subtag;

    #[test]
    fn primary_subtag_strips_region() {
        assert_eq!(primary_subtag("es-MX"), "es");
        assert_eq!(primary_subtag("ZH_cn"), "zh");
        assert_eq!(primary_subtag("fr"), "fr");
    }
}
