//! `WebSpeechRecognizer`: posts each utterance to a web speech endpoint.
//!
//! The request body is 16-bit big-endian linear PCM (`audio/l16; rate=N`).
//! The service answers with newline-delimited JSON objects; the first one with
//! a non-empty `result` array carries the hypotheses.
//!
//! Uses `reqwest::blocking`, so construct, call and drop it off the async
//! runtime (the capture loop already runs on a blocking thread).

use std::time::Duration;

use reqwest::{blocking::Client, header::CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, warn};

use super::SpeechRecognizer;
use crate::{
    buffering::chunk::AudioChunk,
    config::RecognizerConfig,
    error::{MedBridgeError, Result},
};

pub struct WebSpeechRecognizer {
    http: Client,
    endpoint: String,
    client: String,
    api_key: Option<String>,
}

impl WebSpeechRecognizer {
    /// # Errors
    /// `MedBridgeError::RecognitionRequest` if the HTTP client cannot be built.
    pub fn new(config: &RecognizerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| MedBridgeError::RecognitionRequest(e.to_string()))?;
        if config.api_key.is_none() {
            warn!("no speech API key configured; the endpoint may reject requests");
        }
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            client: config.client.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl SpeechRecognizer for WebSpeechRecognizer {
    fn recognize(&mut self, chunk: &AudioChunk, language: &str) -> Result<String> {
        let mut query = vec![
            ("client", self.client.as_str()),
            ("lang", language),
            ("pFilter", "0"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .query(&query)
            .header(CONTENT_TYPE, format!("audio/l16; rate={}", chunk.sample_rate))
            .body(chunk.to_l16_be_bytes())
            .send()
            .map_err(|e| MedBridgeError::RecognitionRequest(format!("recognition connection failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MedBridgeError::RecognitionRequest(format!(
                "recognition request failed: {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| MedBridgeError::RecognitionRequest(e.to_string()))?;
        debug!(bytes = body.len(), "recognition response received");
        parse_recognition_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResponseLine {
    #[serde(default)]
    result: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

/// Extract the first alternative's transcript from a newline-delimited
/// response body.
///
/// # Errors
/// - `MedBridgeError::UnknownValue` if no line carries a transcript.
/// - `MedBridgeError::RecognitionRequest` if a line is not valid JSON.
pub fn parse_recognition_response(body: &str) -> Result<String> {
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed: ResponseLine = serde_json::from_str(line).map_err(|e| {
            MedBridgeError::RecognitionRequest(format!("malformed recognition response: {e}"))
        })?;
        let Some(first) = parsed.result.into_iter().next() else {
            continue;
        };
        return first
            .alternative
            .into_iter()
            .next()
            .and_then(|alt| alt.transcript)
            .ok_or(MedBridgeError::UnknownValue);
    }
    Err(MedBridgeError::UnknownValue)
}
