//! Built-in medical term catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A medical condition with its per-language translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTerm {
    /// Canonical lowercase English token.
    pub term: String,
    pub category: String,
    /// Language code (`"es"`, `"zh"`, ...) → translated term.
    pub translations: BTreeMap<String, String>,
    /// Human-readable description, rendered as the span's `title`.
    pub description: String,
}

impl MedicalTerm {
    pub fn new(
        term: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        translations: &[(&str, &str)],
    ) -> Self {
        Self {
            term: term.into(),
            category: category.into(),
            translations: translations
                .iter()
                .map(|(lang, text)| ((*lang).to_string(), (*text).to_string()))
                .collect(),
            description: description.into(),
        }
    }

    /// Translation for `language`, falling back to the English term.
    pub fn translation_or_term(&self, language: &str) -> &str {
        self.translations
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.term)
    }
}

/// The ten built-in terms, in annotation order.
pub fn default_catalog() -> Vec<MedicalTerm> {
    vec![
        MedicalTerm::new(
            "hypertension",
            "cardiovascular",
            "High blood pressure condition",
            &[
                ("es", "hipertensión"),
                ("fr", "hypertension"),
                ("de", "Hypertonie"),
                ("zh", "高血压"),
                ("ar", "ارتفاع ضغط الدم"),
                ("ja", "高血圧"),
                ("pt", "hipertensão"),
                ("ru", "гипертония"),
                ("hi", "उच्च रक्तचाप"),
                ("it", "ipertensione"),
                ("ko", "고혈압"),
            ],
        ),
        MedicalTerm::new(
            "diabetes",
            "endocrine",
            "Metabolic disorder affecting blood sugar levels",
            &[
                ("es", "diabetes"),
                ("fr", "diabète"),
                ("de", "Diabetes"),
                ("zh", "糖尿病"),
                ("ar", "مرض السكري"),
                ("ja", "糖尿病"),
                ("pt", "diabetes"),
                ("ru", "диабет"),
                ("hi", "मधुमेह"),
                ("it", "diabete"),
                ("ko", "당뇨병"),
            ],
        ),
        MedicalTerm::new(
            "pneumonia",
            "respiratory",
            "Infection causing inflammation of the lungs",
            &[
                ("es", "neumonía"),
                ("fr", "pneumonie"),
                ("de", "Lungenentzündung"),
                ("zh", "肺炎"),
                ("ar", "الالتهاب الرئوي"),
                ("ja", "肺炎"),
                ("pt", "pneumonia"),
                ("ru", "пневмония"),
                ("hi", "निमोनिया"),
                ("it", "polmonite"),
                ("ko", "폐렴"),
            ],
        ),
        MedicalTerm::new(
            "arthritis",
            "musculoskeletal",
            "Inflammation of joints causing pain and stiffness",
            &[
                ("es", "artritis"),
                ("fr", "arthrite"),
                ("de", "Arthritis"),
                ("zh", "关节炎"),
                ("ar", "التهاب المفاصل"),
                ("ja", "関節炎"),
                ("pt", "artrite"),
                ("ru", "артрит"),
                ("hi", "गठिया"),
                ("it", "artrite"),
                ("ko", "관절염"),
            ],
        ),
        MedicalTerm::new(
            "gastritis",
            "digestive",
            "Inflammation of the stomach lining",
            &[
                ("es", "gastritis"),
                ("fr", "gastrite"),
                ("de", "Magenschleimhautentzündung"),
                ("zh", "胃炎"),
                ("ar", "التهاب المعدة"),
                ("ja", "胃炎"),
                ("pt", "gastrite"),
                ("ru", "гастрит"),
                ("hi", "गैस्ट्राइटिस"),
                ("it", "gastrite"),
                ("ko", "위염"),
            ],
        ),
        MedicalTerm::new(
            "bronchitis",
            "respiratory",
            "Inflammation of the bronchial tubes",
            &[
                ("es", "bronquitis"),
                ("fr", "bronchite"),
                ("de", "Bronchitis"),
                ("zh", "支气管炎"),
                ("ar", "التهاب الشعب الهوائية"),
                ("ja", "気管支炎"),
                ("pt", "bronquite"),
                ("ru", "бронхит"),
                ("hi", "ब्रोंकाइटिस"),
                ("it", "bronchite"),
                ("ko", "기관지염"),
            ],
        ),
        MedicalTerm::new(
            "migraine",
            "neurological",
            "Severe recurring headache with additional symptoms",
            &[
                ("es", "migraña"),
                ("fr", "migraine"),
                ("de", "Migräne"),
                ("zh", "偏头痛"),
                ("ar", "الصداع النصفي"),
                ("ja", "片頭痛"),
                ("pt", "enxaqueca"),
                ("ru", "мигрень"),
                ("hi", "माइग्रेन"),
                ("it", "emicrania"),
                ("ko", "편두통"),
            ],
        ),
        MedicalTerm::new(
            "anemia",
            "hematological",
            "Condition with insufficient healthy red blood cells",
            &[
                ("es", "anemia"),
                ("fr", "anémie"),
                ("de", "Anämie"),
                ("zh", "贫血"),
                ("ar", "فقر الدم"),
                ("ja", "貧血"),
                ("pt", "anemia"),
                ("ru", "анемия"),
                ("hi", "एनीमिया"),
                ("it", "anemia"),
                ("ko", "빈혈"),
            ],
        ),
        MedicalTerm::new(
            "hypothyroidism",
            "endocrine",
            "Underactive thyroid gland condition",
            &[
                ("es", "hipotiroidismo"),
                ("fr", "hypothyroïdie"),
                ("de", "Hypothyreose"),
                ("zh", "甲状腺功能减退"),
                ("ar", "قصور الغدة الدرقية"),
                ("ja", "甲状腺機能低下症"),
                ("pt", "hipotireoidismo"),
                ("ru", "гипотиреоз"),
                ("hi", "हाइपोथायरायडिज्म"),
                ("it", "ipotiroidismo"),
                ("ko", "갑상선 기능 저하증"),
            ],
        ),
        MedicalTerm::new(
            "osteoporosis",
            "musculoskeletal",
            "Condition where bones become weak and brittle",
            &[
                ("es", "osteoporosis"),
                ("fr", "ostéoporose"),
                ("de", "Osteoporose"),
                ("zh", "骨质疏松"),
                ("ar", "هشاشة العظام"),
                ("ja", "骨粗しょう症"),
                ("pt", "osteoporose"),
                ("ru", "остеопороз"),
                ("hi", "ऑस्टियोपोरोसिस"),
                ("it", "osteoporosi"),
                ("ko", "골다공증"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_ten_lowercase_unique_terms() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 10);
        for term in &catalog {
            assert_eq!(term.term, term.term.to_lowercase());
            assert_eq!(term.translations.len(), 11, "{} translations", term.term);
        }
        let mut names: Vec<_> = catalog.iter().map(|t| t.term.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn translation_falls_back_to_english_term() {
        let catalog = default_catalog();
        let migraine = &catalog[6];
        assert_eq!(migraine.translation_or_term("pt"), "enxaqueca");
        assert_eq!(migraine.translation_or_term("sv"), "migraine");
    }

    #[test]
    fn term_serializes_with_camel_case_fields() {
        let term = MedicalTerm::new("anemia", "hematological", "Low red cells", &[("es", "anemia")]);
        let json = serde_json::to_value(&term).expect("serialize term");
        assert_eq!(json["term"], "anemia");
        assert_eq!(json["translations"]["es"], "anemia");
        assert_eq!(json["description"], "Low red cells");
    }
}
