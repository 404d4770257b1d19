//! Audio sources for the speech façade.
//!
//! ```text
//! AudioInput::open()  (on the listening thread)
//!     └─► AudioSource::listen()   blocks → one utterance as AudioChunk
//! ```
//!
//! `MicrophoneInput` captures from a cpal device; `WavFileInput` replays a
//! file. Both resample to the target rate and endpoint phrases with the same
//! `UtteranceSegmenter`, so recognizers see identical chunks either way.
//!
//! Sources are deliberately not `Send`: `cpal::Stream` is bound to the thread
//! that created it on Windows and macOS.

pub mod microphone;
pub mod resample;
pub mod segmenter;
pub mod wav;

pub use microphone::{input_device_names, MicrophoneInput, MicrophoneSource};
pub use segmenter::UtteranceSegmenter;
pub use wav::WavFileInput;

use crate::buffering::chunk::AudioChunk;
use crate::error::Result;

/// An open capture context.
pub trait AudioSource {
    /// Block until one utterance has been captured.
    ///
    /// # Errors
    /// - `MedBridgeError::ListenTimeout` if no speech began within the wait.
    /// - `MedBridgeError::AudioExhausted` when a finite source has ended.
    /// - `MedBridgeError::AudioStream` if the underlying stream failed.
    fn listen(&mut self) -> Result<AudioChunk>;
}

/// Factory for capture contexts. Called on the thread that will listen.
pub trait AudioInput: Send + Sync {
    fn open(&self) -> Result<Box<dyn AudioSource>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Samples per 20 ms VAD frame at `sample_rate`.
pub(crate) fn frame_len(sample_rate: u32) -> usize {
    (sample_rate as usize / 50).max(1)
}
