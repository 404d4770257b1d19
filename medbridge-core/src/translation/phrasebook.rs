//! `PhrasebookTranslator`: exact-match medical phrases with a fallback backend.
//!
//! Lookup order:
//! 1. source == target → input unchanged
//! 2. whole-utterance match (trimmed, case-insensitive) in the phrasebook
//! 3. the wrapped translator

use std::collections::HashMap;

use tracing::debug;

use super::{primary_subtag, Translator};
use crate::error::Result;

const PHRASE_KEYS: [&str; 16] = [
    "i want to report a stomach ache",
    "i have a headache",
    "i need medication for pain",
    "i am allergic to penicillin",
    "i need help",
    "when can i take my medication",
    "how often should i take this pill",
    "i need to see a doctor",
    "i feel dizzy",
    "i have a fever",
    "i have chest pain",
    "i need an ambulance",
    "where is the hospital",
    "where is the pharmacy",
    "i need water",
    "i need to rest",
];

const EN_ES: [&str; 16] = [
    "Quiero reportar un dolor de estómago",
    "Tengo dolor de cabeza",
    "Necesito medicamentos para el dolor",
    "Soy alérgico a la penicilina",
    "Necesito ayuda",
    "¿Cuándo puedo tomar mi medicamento?",
    "¿Con qué frecuencia debo tomar esta pastilla?",
    "Necesito ver a un doctor",
    "Me siento mareado",
    "Tengo fiebre",
    "Tengo dolor en el pecho",
    "Necesito una ambulancia",
    "¿Dónde está el hospital?",
    "¿Dónde está la farmacia?",
    "Necesito agua",
    "Necesito descansar",
];

const EN_FR: [&str; 16] = [
    "Je voudrais signaler des maux d'estomac",
    "J'ai mal à la tête",
    "J'ai besoin de médicaments contre la douleur",
    "Je suis allergique à la pénicilline",
    "J'ai besoin d'aide",
    "Quand puis-je prendre mon médicament?",
    "À quelle fréquence dois-je prendre ce comprimé?",
    "J'ai besoin de voir un médecin",
    "Je me sens étourdi",
    "J'ai de la fièvre",
    "J'ai une douleur à la poitrine",
    "J'ai besoin d'une ambulance",
    "Où est l'hôpital?",
    "Où est la pharmacie?",
    "J'ai besoin d'eau",
    "J'ai besoin de me reposer",
];

const EN_DE: [&str; 16] = [
    "Ich möchte Bauchschmerzen melden",
    "Ich habe Kopfschmerzen",
    "Ich brauche Medikamente gegen Schmerzen",
    "Ich bin allergisch gegen Penicillin",
    "Ich brauche Hilfe",
    "Wann kann ich mein Medikament nehmen?",
    "Wie oft soll ich diese Tablette einnehmen?",
    "Ich muss einen Arzt aufsuchen",
    "Mir ist schwindelig",
    "Ich habe Fieber",
    "Ich habe Brustschmerzen",
    "Ich brauche einen Krankenwagen",
    "Wo ist das Krankenhaus?",
    "Wo ist die Apotheke?",
    "Ich brauche Wasser",
    "Ich muss mich ausruhen",
];

/// English-source phrasebook.
pub struct PhrasebookTranslator<T> {
    source_language: String,
    /// (target language, lowercase phrase) → translation.
    phrases: HashMap<(String, String), &'static str>,
    fallback: T,
}

impl<T: Translator> PhrasebookTranslator<T> {
    /// Phrasebook for English input, falling back to `fallback`.
    pub fn new(fallback: T) -> Self {
        Self::with_source_language("en", fallback)
    }

    pub fn with_source_language(source_language: &str, fallback: T) -> Self {
        let source_language = primary_subtag(source_language);
        let mut phrases = HashMap::new();
        if source_language == "en" {
            for (target, table) in [("es", &EN_ES), ("fr", &EN_FR), ("de", &EN_DE)] {
                for (key, phrase) in PHRASE_KEYS.iter().zip(table.iter()) {
                    phrases.insert((target.to_string(), (*key).to_string()), *phrase);
                }
            }
        }
        Self {
            source_language,
            phrases,
            fallback,
        }
    }

    /// Exact phrasebook hit, if any.
    pub fn lookup(&self, text: &str, target_language: &str) -> Option<&'static str> {
        let key = (primary_subtag(target_language), text.trim().to_lowercase());
        self.phrases.get(&key).copied()
    }
}

impl<T: Translator> Translator for PhrasebookTranslator<T> {
    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if primary_subtag(target_language) == self.source_language {
            return Ok(text.to_string());
        }
        if let Some(phrase) = self.lookup(text, target_language) {
            debug!(language = target_language, "phrasebook hit");
            return Ok(phrase.to_string());
        }
        self.fallback.translate(text, target_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::CannedTranslator;

    fn translator() -> PhrasebookTranslator<CannedTranslator> {
        PhrasebookTranslator::new(CannedTranslator)
    }

    #[test]
    fn exact_phrase_is_translated_case_insensitively() {
        let t = translator();
        assert_eq!(t.translate("  I have a Fever ", "es").unwrap(), "Tengo fiebre");
        assert_eq!(t.translate("where is the pharmacy", "de-DE").unwrap(), "Wo ist die Apotheke?");
        assert_eq!(t.translate("i need help", "fr").unwrap(), "J'ai besoin d'aide");
    }

    #[test]
    fn same_language_returns_input() {
        assert_eq!(translator().translate("I have a fever", "en-US").unwrap(), "I have a fever");
    }

    #[test]
    fn unmatched_text_uses_fallback() {
        let t = translator();
        assert_eq!(t.translate("my knee hurts", "es").unwrap(), "Texto traducido al español");
        assert_eq!(t.translate("i have a fever", "ja").unwrap(), "i have a fever");
    }

    #[test]
    fn every_phrase_has_three_targets() {
        let t = translator();
        for key in PHRASE_KEYS {
            for target in ["es", "fr", "de"] {
                assert!(t.lookup(key, target).is_some(), "{key} → {target}");
            }
        }
    }
}
