//! Microphone capture via cpal.
//!
//! The cpal input callback runs on an OS audio thread at elevated priority.
//! It must not block or do I/O, and after its first call it does not allocate:
//! it downmixes into a reused buffer and pushes into the SPSC ring. All
//! resampling and endpointing happens in `listen`, on the caller's thread.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

#[cfg(feature = "audio-cpal")]
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, SampleRate, SizedSample, Stream, StreamConfig,
};
use parking_lot::Mutex;
use tracing::{debug, info};
#[cfg(feature = "audio-cpal")]
use tracing::{error, warn};

use super::{frame_len, resample::RateConverter, AudioInput, AudioSource, UtteranceSegmenter};
#[cfg(feature = "audio-cpal")]
use crate::buffering::{AudioProducer, Producer};
use crate::{
    buffering::{chunk::AudioChunk, create_audio_ring, AudioConsumer, Consumer},
    config::SpeechConfig,
    error::{MedBridgeError, Result},
};

/// Sleep while the ring is empty.
const EMPTY_RING_SLEEP: Duration = Duration::from_millis(5);

/// Opens `MicrophoneSource`s with a fixed configuration.
#[derive(Debug, Clone)]
pub struct MicrophoneInput {
    config: SpeechConfig,
}

impl MicrophoneInput {
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }
}

impl AudioInput for MicrophoneInput {
    fn open(&self) -> Result<Box<dyn AudioSource>> {
        Ok(Box::new(MicrophoneSource::open(&self.config)?))
    }

    fn describe(&self) -> String {
        match &self.config.preferred_input_device {
            Some(name) => format!("microphone '{name}'"),
            None => "default microphone".into(),
        }
    }
}

/// A live capture stream plus the state needed to cut it into utterances.
///
/// **Not `Send`.** Create and drop on the same thread.
pub struct MicrophoneSource {
    capture: AudioCapture,
    consumer: AudioConsumer,
    assembler: PhraseAssembler,
    raw: Vec<f32>,
    listen_timeout: Option<Duration>,
}

impl MicrophoneSource {
    pub fn open(config: &SpeechConfig) -> Result<Self> {
        let (producer, consumer) = create_audio_ring();
        let capture = AudioCapture::open(producer, config.preferred_input_device.as_deref())?;
        let assembler = PhraseAssembler::new(capture.sample_rate, config)?;
        info!(
            capture_rate = capture.sample_rate,
            target_rate = config.target_sample_rate,
            "microphone open"
        );
        Ok(Self {
            raw: vec![0f32; frame_len(capture.sample_rate)],
            capture,
            consumer,
            assembler,
            listen_timeout: config.listen_timeout(),
        })
    }
}

impl AudioSource for MicrophoneSource {
    fn listen(&mut self) -> Result<AudioChunk> {
        let deadline = ListenDeadline::new(self.listen_timeout);

        loop {
            self.capture.check_stream()?;

            let n = self.consumer.pop_slice(&mut self.raw);
            if n == 0 {
                if deadline.expired(self.assembler.in_phrase()) {
                    return Err(MedBridgeError::ListenTimeout);
                }
                std::thread::sleep(EMPTY_RING_SLEEP);
                continue;
            }

            if let Some(outcome) = self.assembler.feed(&self.raw[..n], &deadline) {
                return outcome;
            }
        }
    }
}

/// Onset deadline for one `listen` call.
struct ListenDeadline {
    started: Instant,
    timeout: Option<Duration>,
}

impl ListenDeadline {
    fn new(timeout: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    /// Only waiting for onset can time out; an open phrase always completes.
    fn expired(&self, in_phrase: bool) -> bool {
        match self.timeout {
            Some(timeout) => !in_phrase && self.started.elapsed() >= timeout,
            None => false,
        }
    }
}

/// Capture-rate samples in, endpointed target-rate phrases out.
struct PhraseAssembler {
    resampler: RateConverter,
    segmenter: UtteranceSegmenter,
    pending: Vec<f32>,
    target_rate: u32,
}

impl PhraseAssembler {
    fn new(capture_rate: u32, config: &SpeechConfig) -> Result<Self> {
        Ok(Self {
            resampler: RateConverter::new(
                capture_rate,
                config.target_sample_rate,
                frame_len(capture_rate),
            )?,
            segmenter: UtteranceSegmenter::new(config),
            pending: Vec::new(),
            target_rate: config.target_sample_rate,
        })
    }

    fn in_phrase(&self) -> bool {
        self.segmenter.in_phrase()
    }

    /// Push captured samples through the segmenter. Returns a phrase, or a
    /// timeout if the deadline passes while draining a silent backlog.
    /// Unconsumed frames stay queued for the next call.
    fn feed(&mut self, raw: &[f32], deadline: &ListenDeadline) -> Option<Result<AudioChunk>> {
        let resampled = self.resampler.process(raw);
        self.pending.extend_from_slice(&resampled);

        let target_frame = frame_len(self.target_rate);
        while self.pending.len() >= target_frame {
            if deadline.expired(self.segmenter.in_phrase()) {
                return Some(Err(MedBridgeError::ListenTimeout));
            }
            let frame: Vec<f32> = self.pending.drain(..target_frame).collect();
            if let Some(phrase) = self.segmenter.push(AudioChunk::new(frame, self.target_rate)) {
                debug!(secs = phrase.duration_secs(), "utterance captured");
                return Some(Ok(phrase));
            }
        }
        None
    }
}

/// Owns the cpal stream. Dropping it releases the device.
pub struct AudioCapture {
    #[cfg(feature = "audio-cpal")]
    _stream: Stream,
    running: Arc<AtomicBool>,
    stream_error: Arc<Mutex<Option<String>>>,
    pub sample_rate: u32,
}

impl AudioCapture {
    /// Open `preferred_device` if present, else the default input, else the
    /// first input the host lists.
    #[cfg(feature = "audio-cpal")]
    pub fn open(producer: AudioProducer, preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let preferred = preferred_device.and_then(|wanted| {
            let found = host
                .input_devices()
                .ok()?
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false));
            if found.is_none() {
                warn!(device = wanted, "preferred input device not found, falling back");
            }
            found
        });

        let device = match preferred.or_else(|| host.default_input_device()) {
            Some(device) => device,
            None => host
                .input_devices()
                .map_err(|e| MedBridgeError::AudioDevice(e.to_string()))?
                .next()
                .ok_or(MedBridgeError::NoDefaultInputDevice)?,
        };

        let supported = device
            .default_input_config()
            .map_err(|e| MedBridgeError::AudioDevice(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        info!(
            device = device.name().unwrap_or_default().as_str(),
            sample_rate, channels, "opening input device"
        );

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let running = Arc::new(AtomicBool::new(true));
        let stream_error = Arc::new(Mutex::new(None));
        let ctx = CallbackContext {
            producer,
            running: Arc::clone(&running),
            stream_error: Arc::clone(&stream_error),
        };

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, ctx, |s| s),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, ctx, |s| s as f32 / 32_768.0),
            SampleFormat::I32 => {
                build_stream::<i32>(&device, &config, ctx, |s| s as f32 / 2_147_483_648.0)
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, ctx, |s| (s as f32 - 32_768.0) / 32_768.0)
            }
            SampleFormat::U8 => build_stream::<u8>(&device, &config, ctx, |s| (s as f32 - 128.0) / 128.0),
            other => {
                return Err(MedBridgeError::AudioStream(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| MedBridgeError::AudioStream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            running,
            stream_error,
            sample_rate,
        })
    }

    #[cfg(not(feature = "audio-cpal"))]
    pub fn open(
        _producer: crate::buffering::AudioProducer,
        _preferred_device: Option<&str>,
    ) -> Result<Self> {
        Err(MedBridgeError::AudioStream(
            "compiled without audio-cpal feature".into(),
        ))
    }

    /// Surface an error reported by the stream's error callback.
    pub fn check_stream(&self) -> Result<()> {
        match self.stream_error.lock().take() {
            Some(message) => Err(MedBridgeError::AudioStream(message)),
            None => Ok(()),
        }
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(feature = "audio-cpal")]
struct CallbackContext {
    producer: AudioProducer,
    running: Arc<AtomicBool>,
    stream_error: Arc<Mutex<Option<String>>>,
}

#[cfg(feature = "audio-cpal")]
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    ctx: CallbackContext,
    to_f32: fn(T) -> f32,
) -> Result<Stream>
where
    T: SizedSample + Copy + Send + 'static,
{
    let channels = (config.channels as usize).max(1);
    let CallbackContext {
        mut producer,
        running,
        stream_error,
    } = ctx;
    let mut mixed: Vec<f32> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _info: &cpal::InputCallbackInfo| {
                if !running.load(Ordering::Relaxed) {
                    return;
                }
                mixed.resize(data.len() / channels, 0.0);
                for (out, frame) in mixed.iter_mut().zip(data.chunks_exact(channels)) {
                    *out = frame.iter().map(|s| to_f32(*s)).sum::<f32>() / channels as f32;
                }
                let written = producer.push_slice(&mixed);
                if written < mixed.len() {
                    warn!(dropped = mixed.len() - written, "ring buffer full, dropping frames");
                }
            },
            move |err| {
                error!("audio stream error: {err}");
                *stream_error.lock() = Some(err.to_string());
            },
            None,
        )
        .map_err(|e| MedBridgeError::AudioStream(e.to_string()))
}

/// Names of every input device the default host reports.
#[cfg(feature = "audio-cpal")]
pub fn input_device_names() -> Vec<String> {
    let host = cpal::default_host();
    match host.input_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            warn!("failed to enumerate input devices: {e}");
            Vec::new()
        }
    }
}

#[cfg(not(feature = "audio-cpal"))]
pub fn input_device_names() -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpeechConfig {
        SpeechConfig {
            energy_threshold: 0.05,
            pause_frames: 2,
            min_phrase_samples: 960,
            ..SpeechConfig::default()
        }
    }

    #[test]
    fn describe_names_preferred_device() {
        let input = MicrophoneInput::new(SpeechConfig {
            preferred_input_device: Some("USB Mic".into()),
            ..SpeechConfig::default()
        });
        assert_eq!(input.describe(), "microphone 'USB Mic'");
        assert_eq!(
            MicrophoneInput::new(SpeechConfig::default()).describe(),
            "default microphone"
        );
    }

    #[test]
    fn deadline_ignores_open_phrase() {
        let deadline = ListenDeadline::new(Some(Duration::ZERO));
        assert!(deadline.expired(false));
        assert!(!deadline.expired(true));
        assert!(!ListenDeadline::new(None).expired(false));
    }

    #[test]
    fn silent_backlog_times_out_without_draining() {
        let mut assembler = PhraseAssembler::new(16_000, &config()).unwrap();
        let expired = ListenDeadline::new(Some(Duration::ZERO));

        // Ten seconds of queued silence.
        let outcome = assembler.feed(&vec![0.0; 160_000], &expired);
        assert!(matches!(outcome, Some(Err(MedBridgeError::ListenTimeout))));
        assert_eq!(assembler.pending.len(), 160_000, "backlog kept for the next listen");
    }

    #[test]
    fn speech_in_backlog_is_assembled_into_a_phrase() {
        let mut assembler = PhraseAssembler::new(16_000, &config()).unwrap();
        let open = ListenDeadline::new(None);

        let mut samples = vec![0.3; 320 * 6];
        samples.extend(vec![0.0; 320 * 10]);
        let phrase = assembler
            .feed(&samples, &open)
            .expect("phrase")
            .expect("no error");
        assert_eq!(phrase.sample_rate, 16_000);
        assert_eq!(phrase.samples.len(), 320 * 9);
        assert!(!assembler.pending.is_empty());
    }
}
