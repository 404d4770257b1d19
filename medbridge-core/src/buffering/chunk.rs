//! Mono PCM block handed from audio sources to recognizers.

/// Contiguous mono samples in [-1.0, 1.0] at a known rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Hz (e.g. 16000, 44100, 48000).
    pub sample_rate: u32,
}

impl AudioChunk {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Root-mean-square level of the block.
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    /// Signed 16-bit big-endian PCM (`audio/l16`).
    pub fn to_l16_be_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            out.extend_from_slice(&scaled.to_be_bytes());
        }
        out
    }
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_and_rms() {
        let chunk = AudioChunk::new(vec![0.5, -0.5, 0.5, -0.5], 4);
        assert!((chunk.duration_secs() - 1.0).abs() < 1e-9);
        assert!((chunk.rms() - 0.5).abs() < 1e-6);
        assert_eq!(AudioChunk::new(vec![], 16_000).rms(), 0.0);
    }

    #[test]
    fn l16_encoding_is_big_endian_and_clamped() {
        let chunk = AudioChunk::new(vec![0.0, 1.0, -2.0], 16_000);
        let bytes = chunk.to_l16_be_bytes();
        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[0..2], &[0, 0]);
        assert_eq!(&bytes[2..4], &i16::MAX.to_be_bytes());
        assert_eq!(&bytes[4..6], &(-i16::MAX).to_be_bytes());
    }
}
