//! Status events broadcast by `SpeechFacade`.

use serde::{Deserialize, Serialize};

/// Where the capture loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionState {
    /// No loop running. `start_recognition` may be called.
    Idle,
    /// Loop is listening and recognizing.
    Listening,
    /// Stop requested; the loop exits once the in-flight call returns.
    Stopping,
}

/// Emitted on every state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionStatusEvent {
    pub state: RecognitionState,
    /// Optional human-readable detail (input name, error message).
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_event_serializes_with_lowercase_state() {
        let event = RecognitionStatusEvent {
            state: RecognitionState::Listening,
            detail: Some("default microphone".into()),
        };

        let json = serde_json::to_value(&event).expect("serialize status event");
        assert_eq!(json["state"], "listening");
        assert_eq!(json["detail"], "default microphone");

        let round_trip: RecognitionStatusEvent =
            serde_json::from_value(json).expect("deserialize status event");
        assert_eq!(round_trip.state, RecognitionState::Listening);
    }

    #[test]
    fn state_rejects_non_lowercase_values() {
        assert!(serde_json::from_str::<RecognitionState>(r#""Stopping""#).is_err());
        assert_eq!(
            serde_json::from_str::<RecognitionState>(r#""stopping""#).unwrap(),
            RecognitionState::Stopping
        );
    }
}
