//! # medbridge
//!
//! Backend services for a multilingual medical communication tool.
//!
//! - `terminology`: marks known medical terms in free text and renders the
//!   translation for a target language as inline HTML.
//! - `security`: session timers, AES-256-GCM payload encryption, input
//!   validation and the HTTP security header set.
//! - `speech`: continuous speech recognition over a pluggable audio source
//!   and recognizer, plus text translation.
//!
//! ## Speech path
//!
//! ```text
//! Microphone → cpal callback → SPSC RingBuffer → listen() on caller thread
//!                                                    │
//!                                      resample → energy VAD → phrase
//!                                                    │
//!                                       SpeechRecognizer::recognize
//!                                                    │
//!                                               on_result(text)
//! ```
//!
//! The audio callback does not allocate after its first call. All heap work
//! happens on the thread running `start_recognition`.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod config;
pub mod error;
pub mod languages;
pub mod patient;
pub mod security;
pub mod speech;
pub mod terminology;
pub mod translation;
pub mod vad;

// Convenience re-exports for downstream crates
pub use audio::{AudioInput, AudioSource, MicrophoneInput, WavFileInput};
pub use config::{load_config, MedBridgeConfig};
pub use error::{MedBridgeError, Result};
pub use patient::PatientDataStore;
pub use security::SecurityHelper;
pub use speech::events::{RecognitionState, RecognitionStatusEvent};
pub use speech::{RecognizerHandle, ScriptedRecognizer, SpeechFacade, SpeechRecognizer};
pub use terminology::{catalog::MedicalTerm, TerminologyAnnotator};
pub use translation::{CannedTranslator, PhrasebookTranslator, Translator};

#[cfg(feature = "web-recognizer")]
pub use speech::WebSpeechRecognizer;
