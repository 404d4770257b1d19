//! Utterance endpointing over a stream of fixed-rate frames.
//!
//! ```text
//! frames ─► VAD ─► Waiting ──speech──► InPhrase ──silence──► phrase emitted
//!                                        │
//!                                        └──max_phrase_samples──► phrase emitted
//! ```
//!
//! Bursts shorter than `min_phrase_samples` are discarded as noise. A short
//! pre-roll of quiet audio is kept so the first syllable is not clipped.

use tracing::debug;

use crate::buffering::chunk::AudioChunk;
use crate::config::SpeechConfig;
use crate::vad::{EnergyVad, VadDecision, VoiceActivityDetector};

/// Quiet audio kept ahead of speech onset (ms).
const PRE_ROLL_MS: usize = 300;

pub struct UtteranceSegmenter {
    vad: Box<dyn VoiceActivityDetector>,
    sample_rate: u32,
    min_phrase_samples: usize,
    max_phrase_samples: usize,
    pre_roll_samples: usize,
    pre_roll: Vec<f32>,
    phrase: Vec<f32>,
    in_phrase: bool,
}

impl UtteranceSegmenter {
    pub fn new(config: &SpeechConfig) -> Self {
        Self::with_vad(
            Box::new(EnergyVad::new(config.energy_threshold, config.pause_frames)),
            config,
        )
    }

    pub fn with_vad(vad: Box<dyn VoiceActivityDetector>, config: &SpeechConfig) -> Self {
        let sample_rate = config.target_sample_rate;
        Self {
            vad,
            sample_rate,
            min_phrase_samples: config.min_phrase_samples,
            max_phrase_samples: config.max_phrase_samples.max(1),
            pre_roll_samples: sample_rate as usize * PRE_ROLL_MS / 1000,
            pre_roll: Vec::new(),
            phrase: Vec::new(),
            in_phrase: false,
        }
    }

    /// `true` once speech onset has been seen for the current phrase.
    pub fn in_phrase(&self) -> bool {
        self.in_phrase
    }

    /// Feed one frame at the configured rate. Returns a finished phrase, if any.
    pub fn push(&mut self, frame: AudioChunk) -> Option<AudioChunk> {
        let decision = self.vad.classify(&frame);

        if !self.in_phrase {
            if decision == VadDecision::Silence {
                self.pre_roll.extend_from_slice(&frame.samples);
                let excess = self.pre_roll.len().saturating_sub(self.pre_roll_samples);
                self.pre_roll.drain(..excess);
                return None;
            }
            self.in_phrase = true;
            self.phrase.clear();
            self.phrase.append(&mut self.pre_roll);
        }

        self.phrase.extend_from_slice(&frame.samples);

        if self.phrase.len() >= self.max_phrase_samples {
            debug!(samples = self.phrase.len(), "phrase length limit reached");
            return self.finish();
        }
        if decision == VadDecision::Silence {
            return self.finish();
        }
        None
    }

    /// Close any open phrase (end of input). Short phrases are dropped.
    pub fn flush(&mut self) -> Option<AudioChunk> {
        if self.in_phrase {
            self.finish()
        } else {
            None
        }
    }

    fn finish(&mut self) -> Option<AudioChunk> {
        self.in_phrase = false;
        self.vad.reset();
        let samples = std::mem::take(&mut self.phrase);
        if samples.len() < self.min_phrase_samples {
            debug!(samples = samples.len(), "discarding burst shorter than a phrase");
            return None;
        }
        Some(AudioChunk::new(samples, self.sample_rate))
    }
}
