//! `SpeechFacade`: continuous recognition plus text translation.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──start_recognition()──► Listening ──stop_recognition()──► Stopping
//!  ▲                                │                                 │
//!  └────── source exhausted / fatal error / in-flight call returns ◄──┘
//! ```
//!
//! `start_recognition` blocks the calling thread for the whole session and
//! opens the audio source on that thread (`cpal::Stream` is `!Send`). Stop is
//! cooperative: the flag is only checked between blocking calls, so the loop
//! exits after the in-flight `listen`/`recognize` returns.
//!
//! Callbacks run on the listening thread and may call back into the façade,
//! including `stop_recognition`.

pub mod events;
pub mod recognizer;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    audio::AudioInput,
    config::{normalize_language_tag, SpeechConfig},
    error::{MedBridgeError, Result},
    translation::{CannedTranslator, Translator},
};
use events::{RecognitionState, RecognitionStatusEvent};
pub use recognizer::{RecognizerHandle, ScriptedRecognizer, SpeechRecognizer};
#[cfg(feature = "web-recognizer")]
pub use recognizer::WebSpeechRecognizer;

/// Status events buffered for slow subscribers.
const STATUS_CHANNEL_CAP: usize = 64;

pub struct SpeechFacade {
    language: RwLock<String>,
    input: Box<dyn AudioInput>,
    recognizer: RecognizerHandle,
    translator: Box<dyn Translator>,
    state: Mutex<RecognitionState>,
    status_tx: broadcast::Sender<RecognitionStatusEvent>,
}

impl SpeechFacade {
    /// Recognition language starts at `config.language`; translation uses
    /// `CannedTranslator` until `with_translator` replaces it.
    pub fn new(config: &SpeechConfig, input: Box<dyn AudioInput>, recognizer: RecognizerHandle) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAP);
        Self {
            language: RwLock::new(normalize_language_tag(&config.language)),
            input,
            recognizer,
            translator: Box::new(CannedTranslator),
            state: Mutex::new(RecognitionState::Idle),
            status_tx,
        }
    }

    pub fn with_translator(mut self, translator: impl Translator) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Takes effect from the next utterance.
    pub fn set_language(&self, code: &str) {
        let code = normalize_language_tag(code);
        info!(language = code.as_str(), "recognition language set");
        *self.language.write() = code;
    }

    pub fn language(&self) -> String {
        self.language.read().clone()
    }

    pub fn state(&self) -> RecognitionState {
        *self.state.lock()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == RecognitionState::Listening
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<RecognitionStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Run the capture loop until stopped, the source is exhausted, or a fatal
    /// error occurs. Blocks the calling thread.
    ///
    /// Unintelligible audio and listen timeouts are skipped. Recognition
    /// request failures go to `on_error` and the loop continues. Any other
    /// failure (including `AlreadyListening` and a source that cannot be
    /// opened) goes to `on_error` and ends the call.
    pub fn start_recognition<R, E>(&self, mut on_result: R, mut on_error: E)
    where
        R: FnMut(String),
        E: FnMut(MedBridgeError),
    {
        {
            let mut state = self.state.lock();
            if *state != RecognitionState::Idle {
                drop(state);
                warn!("start_recognition called while a session is active");
                on_error(MedBridgeError::AlreadyListening);
                return;
            }
            *state = RecognitionState::Listening;
        }
        self.emit(RecognitionState::Listening, Some(self.input.describe()));

        let mut source = match self.input.open() {
            Ok(source) => source,
            Err(e) => {
                error!("failed to open audio source: {e}");
                self.finish(Some(e.to_string()));
                on_error(e);
                return;
            }
        };
        info!(input = self.input.describe().as_str(), "recognition started");

        let mut fatal = None;
        while self.is_listening() {
            let outcome = source.listen().and_then(|chunk| {
                let language = self.language();
                debug!(
                    secs = chunk.duration_secs(),
                    language = language.as_str(),
                    "recognizing utterance"
                );
                self.recognizer.recognize(&chunk, &language)
            });

            match outcome {
                Ok(text) => on_result(text),
                Err(e) if e.is_skippable() => debug!("skipped: {e}"),
                Err(MedBridgeError::AudioExhausted) => {
                    info!("audio source exhausted");
                    break;
                }
                Err(e @ MedBridgeError::RecognitionRequest(_)) => {
                    warn!("{e}");
                    on_error(e);
                }
                Err(e) => {
                    error!("recognition stopped: {e}");
                    fatal = Some(e);
                    break;
                }
            }
        }

        // Release the device on this thread before reporting Idle.
        drop(source);
        self.finish(fatal.as_ref().map(ToString::to_string));
        if let Some(e) = fatal {
            on_error(e);
        }
        info!("recognition ended");
    }

    /// Ask the loop to exit. No-op unless currently listening.
    pub fn stop_recognition(&self) {
        {
            let mut state = self.state.lock();
            if *state != RecognitionState::Listening {
                debug!(state = ?*state, "stop_recognition ignored");
                return;
            }
            *state = RecognitionState::Stopping;
        }
        info!("recognition stop requested");
        self.emit(RecognitionState::Stopping, None);
    }

    /// Translate `text` into `target_language`. Failures are logged and
    /// returned unchanged.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.translator
            .translate(text, target_language)
            .inspect_err(|e| error!(target_language, "translation failed: {e}"))
    }

    fn finish(&self, detail: Option<String>) {
        *self.state.lock() = RecognitionState::Idle;
        self.emit(RecognitionState::Idle, detail);
    }

    fn emit(&self, state: RecognitionState, detail: Option<String>) {
        // No subscribers is fine.
        let _ = self.status_tx.send(RecognitionStatusEvent { state, detail });
    }
}

impl std::fmt::Debug for SpeechFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechFacade")
            .field("language", &*self.language.read())
            .field("input", &self.input.describe())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSource;
    use crate::translation::PhrasebookTranslator;

    struct NoInput;

    impl AudioInput for NoInput {
        fn open(&self) -> Result<Box<dyn AudioSource>> {
            Err(MedBridgeError::NoDefaultInputDevice)
        }

        fn describe(&self) -> String {
            "nothing".into()
        }
    }

    fn facade() -> SpeechFacade {
        SpeechFacade::new(
            &SpeechConfig::default(),
            Box::new(NoInput),
            RecognizerHandle::new(ScriptedRecognizer::default()),
        )
    }

    #[test]
    fn language_defaults_and_normalizes() {
        let f = facade();
        assert_eq!(f.language(), "en-US");
        f.set_language("es_mx");
        assert_eq!(f.language(), "es-MX");
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let f = facade();
        let mut rx = f.subscribe_status();
        f.stop_recognition();
        assert_eq!(f.state(), RecognitionState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn open_failure_reports_error_and_returns_to_idle() {
        let f = facade();
        let mut rx = f.subscribe_status();
        let mut errors = Vec::new();
        f.start_recognition(|_| panic!("no results expected"), |e| errors.push(e));

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], MedBridgeError::NoDefaultInputDevice));
        assert_eq!(f.state(), RecognitionState::Idle);
        assert_eq!(rx.try_recv().unwrap().state, RecognitionState::Listening);
        let idle = rx.try_recv().unwrap();
        assert_eq!(idle.state, RecognitionState::Idle);
        assert!(idle.detail.is_some());
    }

    #[tokio::test]
    async fn translate_uses_canned_table_by_default() {
        let f = facade();
        assert_eq!(
            f.translate("Hello", "es").await.unwrap(),
            "Texto traducido al español"
        );
        assert_eq!(f.translate("Hello", "it").await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn translate_with_phrasebook() {
        let f = facade().with_translator(PhrasebookTranslator::new(CannedTranslator));
        assert_eq!(f.translate("I need help", "fr").await.unwrap(), "J'ai besoin d'aide");
        assert_eq!(f.translate("I need help", "en").await.unwrap(), "I need help");
    }

    struct OfflineTranslator;

    impl Translator for OfflineTranslator {
        fn translate(&self, _text: &str, target_language: &str) -> Result<String> {
            Err(MedBridgeError::Translation(format!(
                "no backend for {target_language}"
            )))
        }
    }

    #[tokio::test]
    async fn translate_returns_backend_error_unchanged() {
        let f = facade().with_translator(OfflineTranslator);
        match f.translate("I feel dizzy", "de").await {
            Err(MedBridgeError::Translation(message)) => assert_eq!(message, "no backend for de"),
            other => panic!("expected translation error, got {other:?}"),
        }
    }
}
