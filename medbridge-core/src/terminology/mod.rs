//! Medical terminology annotation.
//!
//! Each catalog term is compiled once into a case-insensitive whole-word
//! pattern. `annotate` walks the catalog in order and swaps every occurrence of
//! a matching term for a marked-up span:
//!
//! ```text
//! "Patient has hypertension"  --(es)-->
//! "Patient has <span class="medical-term" title="High blood pressure condition">hipertensión</span>"
//! ```
//!
//! Terms are matched independently. If two terms overlap the result depends
//! on catalog order; nothing guards against it.

pub mod catalog;

pub use catalog::{default_catalog, MedicalTerm};

use std::collections::BTreeSet;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::error::Result;

/// CSS class carried by every annotation span.
pub const TERM_SPAN_CLASS: &str = "medical-term";

struct CompiledTerm {
    term: MedicalTerm,
    pattern: Regex,
}

/// Read-only term catalog with text annotation.
pub struct TerminologyAnnotator {
    terms: Vec<CompiledTerm>,
}

impl TerminologyAnnotator {
    /// Annotator over the built-in ten-term catalog.
    pub fn new() -> Result<Self> {
        Self::with_terms(default_catalog())
    }

    /// Annotator over a caller-supplied catalog. Blank terms are dropped.
    ///
    /// # Errors
    /// `MedBridgeError::Pattern` if a term cannot be compiled into a pattern.
    pub fn with_terms(terms: Vec<MedicalTerm>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(terms.len());
        for term in terms {
            if term.term.trim().is_empty() {
                warn!(category = term.category.as_str(), "skipping blank catalog term");
                continue;
            }
            let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&term.term)))
                .case_insensitive(true)
                .build()?;
            compiled.push(CompiledTerm { term, pattern });
        }
        debug!(terms = compiled.len(), "terminology catalog compiled");
        Ok(Self { terms: compiled })
    }

    /// Replace every catalog term found in `text` with an annotation span
    /// carrying the `target_language` translation (or the English term when
    /// that language is missing) and the term description.
    pub fn annotate(&self, text: &str, target_language: &str) -> String {
        let mut annotated = text.to_string();
        let mut hits = 0usize;

        for compiled in &self.terms {
            // Presence is decided on the caller's text, substitution on the
            // progressively annotated one.
            if !compiled.pattern.is_match(text) {
                continue;
            }
            let span = render_span(&compiled.term, target_language);
            annotated = compiled
                .pattern
                .replace_all(&annotated, NoExpand(&span))
                .into_owned();
            hits += 1;
        }

        debug!(language = target_language, terms_matched = hits, "text annotated");
        annotated
    }

    /// All terms in `category`, in catalog order.
    pub fn terms_by_category(&self, category: &str) -> Vec<&MedicalTerm> {
        self.terms()
            .filter(|term| term.category == category)
            .collect()
    }

    /// Distinct categories present in the catalog, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.terms()
            .map(|term| term.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn terms(&self) -> impl Iterator<Item = &MedicalTerm> {
        self.terms.iter().map(|compiled| &compiled.term)
    }

    /// Case-insensitive lookup by English term.
    pub fn lookup(&self, term: &str) -> Option<&MedicalTerm> {
        let needle = term.trim();
        self.terms().find(|t| t.term.eq_ignore_ascii_case(needle))
    }

    /// Translation of a single term, falling back to the English term.
    /// `None` when the term is not in the catalog.
    pub fn translate_term(&self, term: &str, language: &str) -> Option<&str> {
        self.lookup(term).map(|t| t.translation_or_term(language))
    }
}

fn render_span(term: &MedicalTerm, language: &str) -> String {
    format!(
        r#"<span class="{TERM_SPAN_CLASS}" title="{}">{}</span>"#,
        escape_html(&term.description),
        escape_html(term.translation_or_term(language)),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
