//! `ScriptedRecognizer`: replays queued outcomes, one per utterance.
//!
//! Lets the capture loop be driven deterministically without a network
//! service. Once the script runs out every call returns `UnknownValue`.

use std::collections::VecDeque;

use tracing::debug;

use super::SpeechRecognizer;
use crate::buffering::chunk::AudioChunk;
use crate::error::{MedBridgeError, Result};

#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    outcomes: VecDeque<Result<String>>,
    calls: usize,
}

impl ScriptedRecognizer {
    pub fn new(outcomes: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            calls: 0,
        }
    }

    /// One successful transcript per utterance, in order.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(t.into())))
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn recognize(&mut self, chunk: &AudioChunk, language: &str) -> Result<String> {
        self.calls += 1;
        debug!(
            samples = chunk.samples.len(),
            language,
            remaining = self.outcomes.len(),
            "scripted recognize"
        );
        self.outcomes
            .pop_front()
            .unwrap_or(Err(MedBridgeError::UnknownValue))
    }
}
