//! RMS threshold detector with a pause allowance.
//!
//! A frame at or above `threshold` is speech and refills the pause allowance.
//! Quiet frames keep reporting speech until the allowance is spent, so short
//! gaps between words do not split a phrase.

use super::{VadDecision, VoiceActivityDetector};
use crate::buffering::chunk::AudioChunk;

#[derive(Debug, Clone)]
pub struct EnergyVad {
    threshold: f32,
    pause_frames: u32,
    pause_remaining: u32,
}

impl EnergyVad {
    /// `threshold` is an RMS level (0.01 suits a quiet room); `pause_frames`
    /// is how many quiet frames a phrase may contain.
    pub fn new(threshold: f32, pause_frames: u32) -> Self {
        Self {
            threshold,
            pause_frames,
            pause_remaining: 0,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(0.01, 40)
    }
}

impl VoiceActivityDetector for EnergyVad {
    fn classify(&mut self, chunk: &AudioChunk) -> VadDecision {
        if chunk.rms() >= self.threshold {
            self.pause_remaining = self.pause_frames;
            VadDecision::Speech
        } else if self.pause_remaining > 0 {
            self.pause_remaining -= 1;
            VadDecision::Speech
        } else {
            VadDecision::Silence
        }
    }

    fn reset(&mut self) {
        self.pause_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(amplitude: f32) -> AudioChunk {
        AudioChunk::new(vec![amplitude; 320], 16_000)
    }

    #[test]
    fn threshold_separates_speech_from_silence() {
        let mut vad = EnergyVad::new(0.02, 0);
        assert_eq!(vad.classify(&frame(0.0)), VadDecision::Silence);
        assert_eq!(vad.classify(&frame(0.5)), VadDecision::Speech);
        assert_eq!(vad.classify(&frame(0.01)), VadDecision::Silence);
    }

    #[test]
    fn pause_allowance_bridges_short_gaps() {
        let mut vad = EnergyVad::new(0.02, 2);
        assert!(vad.classify(&frame(0.3)).is_speech());
        assert!(vad.classify(&frame(0.0)).is_speech());
        assert!(vad.classify(&frame(0.0)).is_speech());
        assert!(!vad.classify(&frame(0.0)).is_speech());
    }

    #[test]
    fn reset_drops_pending_allowance() {
        let mut vad = EnergyVad::new(0.02, 5);
        vad.classify(&frame(0.3));
        vad.reset();
        assert_eq!(vad.classify(&frame(0.0)), VadDecision::Silence);
    }

    #[test]
    fn empty_frame_is_silence() {
        let mut vad = EnergyVad::default();
        assert_eq!(vad.classify(&AudioChunk::new(vec![], 16_000)), VadDecision::Silence);
    }
}
