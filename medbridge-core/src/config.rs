//! Service configuration (JSON file in the app data directory).
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides the
//! fields it names. `normalize` clamps values into usable ranges and is applied
//! on every load.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MedBridgeError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct MedBridgeConfig {
    pub security: SecurityConfig,
    pub patient: PatientConfig,
    pub speech: SpeechConfig,
    pub recognizer: RecognizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SecurityConfig {
    /// Session lifetime from `start_session_timeout`. Default: 900 (15 min).
    pub session_timeout_secs: u64,
    /// Upper bound on tracked session timers.
    pub max_tracked_sessions: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 15 * 60,
            max_tracked_sessions: 10_000,
        }
    }
}

/// Longest session lifetime honoured (24 h).
pub const MAX_SESSION_TIMEOUT_SECS: u64 = 86_400;

impl SecurityConfig {
    /// Saturates at `MAX_SESSION_TIMEOUT_SECS`, so un-normalized values are safe.
    pub fn session_timeout(&self) -> chrono::Duration {
        let secs = self.session_timeout_secs.min(MAX_SESSION_TIMEOUT_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::zero())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PatientConfig {
    pub max_records: usize,
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
        }
    }
}

/// Capture and endpointing parameters for the speech façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP-47 recognition language. Default: `en-US`.
    pub language: String,
    /// Input device name; `None` uses the system default.
    pub preferred_input_device: Option<String>,
    /// Rate audio is resampled to before recognition (Hz). Default: 16000.
    pub target_sample_rate: u32,
    /// RMS level above which a frame counts as speech. Default: 0.01.
    pub energy_threshold: f32,
    /// Silent frames tolerated inside a phrase before it is closed.
    /// Default: 40 (0.8 s of 20 ms frames).
    pub pause_frames: u32,
    /// Shorter speech bursts are discarded as noise. Default: 4000 (0.25 s).
    pub min_phrase_samples: usize,
    /// Phrases are cut at this length. Default: 480000 (30 s at 16 kHz).
    pub max_phrase_samples: usize,
    /// How long `listen` waits for speech onset; `None` waits forever.
    pub listen_timeout_ms: Option<u64>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            preferred_input_device: None,
            target_sample_rate: 16_000,
            energy_threshold: 0.01,
            pause_frames: 40,
            min_phrase_samples: 4_000,
            max_phrase_samples: 480_000,
            listen_timeout_ms: Some(5_000),
        }
    }
}

impl SpeechConfig {
    pub fn listen_timeout(&self) -> Option<Duration> {
        self.listen_timeout_ms.map(Duration::from_millis)
    }
}

/// Web speech endpoint used by `WebSpeechRecognizer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RecognizerConfig {
    pub endpoint: String,
    pub client: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://www.google.com/speech-api/v2/recognize".into(),
            client: "chromium".into(),
            api_key: None,
            request_timeout_secs: 15,
        }
    }
}

impl MedBridgeConfig {
    pub fn normalize(&mut self) {
        self.security.session_timeout_secs = self
            .security
            .session_timeout_secs
            .clamp(1, MAX_SESSION_TIMEOUT_SECS);
        self.security.max_tracked_sessions = self.security.max_tracked_sessions.max(1);
        self.patient.max_records = self.patient.max_records.max(1);

        let speech = &mut self.speech;
        speech.language = normalize_language_tag(&speech.language);
        speech.preferred_input_device = speech
            .preferred_input_device
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        speech.target_sample_rate = speech.target_sample_rate.clamp(8_000, 48_000);
        speech.energy_threshold = speech.energy_threshold.clamp(0.0005, 0.5);
        speech.pause_frames = speech.pause_frames.clamp(1, 500);
        speech.max_phrase_samples = speech.max_phrase_samples.max(1);
        speech.min_phrase_samples = speech.min_phrase_samples.min(speech.max_phrase_samples);

        let recognizer = &mut self.recognizer;
        recognizer.endpoint = recognizer.endpoint.trim().to_string();
        if recognizer.endpoint.is_empty() {
            recognizer.endpoint = RecognizerConfig::default().endpoint;
        }
        recognizer.api_key = recognizer
            .api_key
            .as_ref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        recognizer.request_timeout_secs = recognizer.request_timeout_secs.clamp(1, 120);
    }

    /// Fill fields from `MEDBRIDGE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("MEDBRIDGE_SPEECH_API_KEY") {
            self.recognizer.api_key = Some(key);
        }
        if let Ok(language) = std::env::var("MEDBRIDGE_SPEECH_LANGUAGE") {
            self.speech.language = language;
        }
        if let Ok(device) = std::env::var("MEDBRIDGE_INPUT_DEVICE") {
            self.speech.preferred_input_device = Some(device);
        }
        if let Some(secs) = std::env::var("MEDBRIDGE_SESSION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.security.session_timeout_secs = secs;
        }
        self.normalize();
    }
}

/// `en_us`, ` EN-us ` → `en-US`. Empty input falls back to `en-US`.
pub fn normalize_language_tag(raw: &str) -> String {
    let cleaned = raw.trim().replace('_', "-");
    let mut parts = cleaned.split('-').filter(|p| !p.is_empty());
    let Some(primary) = parts.next() else {
        return "en-US".into();
    };
    let mut tag = primary.to_ascii_lowercase();
    for part in parts {
        tag.push('-');
        if part.len() == 2 {
            tag.push_str(&part.to_ascii_uppercase());
        } else {
            tag.push_str(part);
        }
    }
    tag
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Lattice Labs")
            .join("MedBridge")
            .join("config.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("medbridge")
            .join("config.json")
    }
}

/// Load and normalize the config at `path`. A missing file yields defaults.
///
/// # Errors
/// `MedBridgeError::Config` if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<MedBridgeConfig> {
    let mut config = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str::<MedBridgeConfig>(&raw)
            .map_err(|e| MedBridgeError::Config(format!("{}: {e}", path.display())))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file, using defaults");
            MedBridgeConfig::default()
        }
        Err(e) => return Err(MedBridgeError::Config(format!("{}: {e}", path.display()))),
    };
    config.normalize();
    Ok(config)
}

pub fn save_config(path: &Path, config: &MedBridgeConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
