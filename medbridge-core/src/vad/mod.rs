//! Voice activity detection used to endpoint utterances.
//!
//! `EnergyVad` is the only detector today. The trait keeps the segmenter
//! independent of it so a neural detector can replace it later.

pub mod energy;

pub use energy::EnergyVad;

use crate::buffering::chunk::AudioChunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadDecision {
    Speech,
    /// Below threshold and outside the pause allowance.
    Silence,
}

impl VadDecision {
    pub fn is_speech(self) -> bool {
        self == VadDecision::Speech
    }
}

pub trait VoiceActivityDetector: Send + 'static {
    /// Classify one frame. The frame must already be at the rate the
    /// detector was tuned for.
    fn classify(&mut self, chunk: &AudioChunk) -> VadDecision;

    /// Forget pause state between utterances.
    fn reset(&mut self);
}
