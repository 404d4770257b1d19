//! WAV file replay through the same resample → segment path as the microphone.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use tracing::{debug, info};

use super::{frame_len, resample::RateConverter, AudioInput, AudioSource, UtteranceSegmenter};
use crate::{
    buffering::chunk::AudioChunk,
    config::SpeechConfig,
    error::{MedBridgeError, Result},
};

#[derive(Debug, Clone)]
pub struct WavFileInput {
    path: PathBuf,
    config: SpeechConfig,
}

impl WavFileInput {
    pub fn new(path: impl Into<PathBuf>, config: SpeechConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioInput for WavFileInput {
    fn open(&self) -> Result<Box<dyn AudioSource>> {
        Ok(Box::new(WavFileSource::open(&self.path, &self.config)?))
    }

    fn describe(&self) -> String {
        format!("wav file {}", self.path.display())
    }
}

/// Decoded file contents, already at the target rate.
struct WavFileSource {
    samples: Vec<f32>,
    position: usize,
    frame_len: usize,
    sample_rate: u32,
    segmenter: UtteranceSegmenter,
}

impl WavFileSource {
    fn open(path: &Path, config: &SpeechConfig) -> Result<Self> {
        let (mono, source_rate) = read_mono(path)?;

        let mut converter = RateConverter::new(
            source_rate,
            config.target_sample_rate,
            frame_len(source_rate),
        )?;
        let mut samples = converter.process(&mono);
        samples.extend(converter.flush());

        info!(
            path = %path.display(),
            source_rate,
            secs = samples.len() as f32 / config.target_sample_rate as f32,
            "wav input open"
        );

        Ok(Self {
            samples,
            position: 0,
            frame_len: frame_len(config.target_sample_rate),
            sample_rate: config.target_sample_rate,
            segmenter: UtteranceSegmenter::new(config),
        })
    }
}

impl AudioSource for WavFileSource {
    fn listen(&mut self) -> Result<AudioChunk> {
        while self.position < self.samples.len() {
            let end = (self.position + self.frame_len).min(self.samples.len());
            let frame = AudioChunk::new(self.samples[self.position..end].to_vec(), self.sample_rate);
            self.position = end;
            if let Some(phrase) = self.segmenter.push(frame) {
                return Ok(phrase);
            }
        }
        match self.segmenter.flush() {
            Some(phrase) => Ok(phrase),
            None => {
                debug!("wav input exhausted");
                Err(MedBridgeError::AudioExhausted)
            }
        }
    }
}

/// Read a WAV file, normalise to `[-1, 1]` and average channels to mono.
fn read_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| wav_error(path, e))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| wav_error(path, e))?
        }
    };

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

fn wav_error(path: &Path, e: hound::Error) -> MedBridgeError {
    MedBridgeError::AudioStream(format!("{}: {e}", path.display()))
}
