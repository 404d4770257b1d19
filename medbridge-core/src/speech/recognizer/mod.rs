//! Speech recognizer abstraction.
//!
//! `&mut self` on `recognize` lets backends keep per-session state (HTTP
//! clients, scripted queues). Calls are serialised through
//! `RecognizerHandle`'s `parking_lot::Mutex`.

pub mod scripted;

#[cfg(feature = "web-recognizer")]
pub mod web;

pub use scripted::ScriptedRecognizer;
#[cfg(feature = "web-recognizer")]
pub use web::WebSpeechRecognizer;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffering::chunk::AudioChunk;
use crate::error::Result;

/// Contract for speech recognition backends.
pub trait SpeechRecognizer: Send + 'static {
    /// Recognize one utterance.
    ///
    /// # Errors
    /// - `MedBridgeError::UnknownValue` if the audio was unintelligible.
    /// - `MedBridgeError::RecognitionRequest` if the backend could not be reached.
    fn recognize(&mut self, chunk: &AudioChunk, language: &str) -> Result<String>;
}

/// Shared handle to any `SpeechRecognizer` implementor.
#[derive(Clone)]
pub struct RecognizerHandle(pub Arc<Mutex<dyn SpeechRecognizer>>);

impl RecognizerHandle {
    pub fn new<R: SpeechRecognizer>(recognizer: R) -> Self {
        Self(Arc::new(Mutex::new(recognizer)))
    }

    pub fn recognize(&self, chunk: &AudioChunk, language: &str) -> Result<String> {
        self.0.lock().recognize(chunk, language)
    }
}

impl std::fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerHandle").finish_non_exhaustive()
    }
}
