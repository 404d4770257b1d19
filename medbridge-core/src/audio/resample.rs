//! Fixed-ratio sample-rate conversion (rubato `FastFixedIn`).
//!
//! Devices and WAV files arrive at their native rate; the recognizer is fed
//! `SpeechConfig::target_sample_rate`. When the rates already match no rubato
//! session is created and samples pass straight through.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::{debug, error};

use crate::error::{MedBridgeError, Result};

pub struct RateConverter {
    /// `None` in passthrough mode.
    resampler: Option<FastFixedIn<f32>>,
    /// Input waiting for a full `chunk_size` block.
    pending: Vec<f32>,
    chunk_size: usize,
    output_buf: Vec<Vec<f32>>,
}

impl RateConverter {
    /// # Errors
    /// `MedBridgeError::AudioDevice` if rubato rejects the ratio.
    pub fn new(source_rate: u32, target_rate: u32, chunk_size: usize) -> Result<Self> {
        if source_rate == target_rate {
            return Ok(Self {
                resampler: None,
                pending: Vec::new(),
                chunk_size,
                output_buf: Vec::new(),
            });
        }
        if source_rate == 0 || target_rate == 0 {
            return Err(MedBridgeError::AudioDevice(format!(
                "invalid sample rates {source_rate} → {target_rate}"
            )));
        }

        let resampler = FastFixedIn::<f32>::new(
            target_rate as f64 / source_rate as f64,
            1.0,
            PolynomialDegree::Cubic,
            chunk_size,
            1,
        )
        .map_err(|e| MedBridgeError::AudioDevice(format!("resampler init: {e}")))?;

        let output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
        debug!(source_rate, target_rate, chunk_size, "resampler created");

        Ok(Self {
            resampler: Some(resampler),
            pending: Vec::new(),
            chunk_size,
            output_buf,
        })
    }

    /// Convert `samples`, returning whatever full blocks are ready.
    /// A trailing partial block is kept for the next call.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        if self.resampler.is_none() {
            return samples.to_vec();
        }
        self.pending.extend_from_slice(samples);
        self.drain_full_blocks()
    }

    /// Zero-pad and convert whatever is pending. Call once at end of input.
    pub fn flush(&mut self) -> Vec<f32> {
        if self.resampler.is_none() || self.pending.is_empty() {
            return Vec::new();
        }
        let remainder = self.pending.len() % self.chunk_size;
        if remainder != 0 {
            self.pending
                .resize(self.pending.len() + self.chunk_size - remainder, 0.0);
        }
        self.drain_full_blocks()
    }

    pub fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }

    fn drain_full_blocks(&mut self) -> Vec<f32> {
        let Some(ref mut resampler) = self.resampler else {
            return Vec::new();
        };
        let mut out = Vec::new();
        while self.pending.len() >= self.chunk_size {
            let block = &self.pending[..self.chunk_size];
            match resampler.process_into_buffer(&[block], &mut self.output_buf, None) {
                Ok((_consumed, produced)) => out.extend_from_slice(&self.output_buf[0][..produced]),
                Err(e) => error!("resampler process error: {e}"),
            }
            self.pending.drain(..self.chunk_size);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_rates_pass_through() {
        let mut rc = RateConverter::new(16_000, 16_000, 960).unwrap();
        assert!(rc.is_passthrough());
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        assert_eq!(rc.process(&samples), samples);
        assert!(rc.flush().is_empty());
    }

    #[test]
    fn downsampling_48k_yields_about_a_third() {
        let mut rc = RateConverter::new(48_000, 16_000, 960).unwrap();
        let out = rc.process(&vec![0.0f32; 960]);
        assert!(
            (out.len() as isize - 320).unsigned_abs() <= 10,
            "output len={}",
            out.len()
        );
    }

    #[test]
    fn partial_block_waits_for_more_input() {
        let mut rc = RateConverter::new(48_000, 16_000, 960).unwrap();
        assert!(rc.process(&vec![0.0f32; 500]).is_empty());
        assert!(!rc.process(&vec![0.0f32; 500]).is_empty());
    }

    #[test]
    fn flush_emits_pending_tail() {
        let mut rc = RateConverter::new(48_000, 16_000, 960).unwrap();
        assert!(rc.process(&vec![0.0f32; 400]).is_empty());
        assert!(!rc.flush().is_empty());
        assert!(rc.flush().is_empty());
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(RateConverter::new(0, 16_000, 960).is_err());
    }
}
