use thiserror::Error;

/// All errors produced by medbridge-core.
#[derive(Debug, Error)]
pub enum MedBridgeError {
    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("no default input device found")]
    NoDefaultInputDevice,

    #[error("no speech detected before the listen timeout")]
    ListenTimeout,

    #[error("audio source exhausted")]
    AudioExhausted,

    #[error("speech was unintelligible")]
    UnknownValue,

    #[error("recognition request failed: {0}")]
    RecognitionRequest(String),

    #[error("recognition is already listening")]
    AlreadyListening,

    #[error("translation error: {0}")]
    Translation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid term pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MedBridgeError {
    /// Errors the capture loop skips without notifying the caller.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::UnknownValue | Self::ListenTimeout)
    }
}

pub type Result<T> = std::result::Result<T, MedBridgeError>;
