//! Recognition session — a two-state toggle over continuous speech
//! capture, plus transcript assembly from partial-hypothesis events.
//!
//! The host delivers a sequence of partial-result events while listening;
//! each event carries *all* currently-hypothesized segments, so assembly
//! is a full replace — later events supersede earlier ones, they are
//! never accumulated.

use serde::{Deserialize, Serialize};

use crate::backend::RecognizerBackend;

/// Current state of the recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognitionState {
    /// Microphone idle.
    Idle,

    /// Continuous capture active, interim results flowing.
    Listening,
}

/// Wraps the host's continuous speech-recognition capability.
pub struct RecognitionSession {
    state: RecognitionState,
    backend: Box<dyn RecognizerBackend>,
}

impl RecognitionSession {
    /// Create a session over the given backend.
    #[must_use]
    pub fn new(backend: Box<dyn RecognizerBackend>) -> Self {
        Self {
            state: RecognitionState::Idle,
            backend,
        }
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> RecognitionState {
        self.state
    }

    /// Whether capture is active.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == RecognitionState::Listening
    }

    /// Whether the host offers recognition at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    /// Toggle capture: start when idle, stop when listening.
    ///
    /// This is the only externally exposed control. On a host without the
    /// capability the toggle is inert. A backend start failure leaves the
    /// session idle; the user must toggle again to retry.
    pub fn toggle(&mut self) -> RecognitionState {
        if !self.backend.is_supported() {
            tracing::debug!("speech recognition unsupported, listening toggle is inert");
            return self.state;
        }

        match self.state {
            RecognitionState::Idle => match self.backend.start() {
                Ok(()) => {
                    tracing::info!("speech recognition started");
                    self.state = RecognitionState::Listening;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to start speech recognition");
                }
            },
            RecognitionState::Listening => {
                self.backend.stop();
                tracing::info!("speech recognition stopped");
                self.state = RecognitionState::Idle;
            }
        }

        self.state
    }

    /// Assemble one partial-result event into the current transcript.
    ///
    /// All hypothesized segments are concatenated in order into one
    /// string. The result *replaces* the previous transcript — each event
    /// is a refined hypothesis of the whole utterance so far.
    #[must_use]
    pub fn assemble_transcript(segments: &[String]) -> String {
        segments.concat()
    }

    /// The host reported a capability error: force-transition to idle.
    ///
    /// No automatic retry is attempted; the error is logged, not fatal.
    pub fn fail(&mut self, reason: &str) {
        tracing::warn!(reason, "speech recognition error, returning to idle");
        self.state = RecognitionState::Idle;
    }

    /// The host ended capture on its own.
    pub fn ended(&mut self) {
        if self.state == RecognitionState::Listening {
            tracing::debug!("speech recognition ended by host");
        }
        self.state = RecognitionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoiceError;

    /// Records start/stop calls; optionally fails to start.
    struct ProbeRecognizer {
        supported: bool,
        fail_start: bool,
        starts: usize,
        stops: usize,
    }

    impl ProbeRecognizer {
        fn new() -> Self {
            Self { supported: true, fail_start: false, starts: 0, stops: 0 }
        }
    }

    impl RecognizerBackend for ProbeRecognizer {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn start(&mut self) -> Result<(), VoiceError> {
            self.starts += 1;
            if self.fail_start {
                Err(VoiceError::Recognition("mic busy".into()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn toggle_cycles_idle_listening_idle() {
        let mut session = RecognitionSession::new(Box::new(ProbeRecognizer::new()));
        assert_eq!(session.state(), RecognitionState::Idle);

        assert_eq!(session.toggle(), RecognitionState::Listening);
        assert!(session.is_listening());

        assert_eq!(session.toggle(), RecognitionState::Idle);
        assert!(!session.is_listening());
    }

    #[test]
    fn toggle_is_inert_without_capability() {
        let backend = ProbeRecognizer { supported: false, ..ProbeRecognizer::new() };
        let mut session = RecognitionSession::new(Box::new(backend));

        assert_eq!(session.toggle(), RecognitionState::Idle);
        assert!(!session.is_supported());
    }

    #[test]
    fn start_failure_stays_idle() {
        let backend = ProbeRecognizer { fail_start: true, ..ProbeRecognizer::new() };
        let mut session = RecognitionSession::new(Box::new(backend));

        assert_eq!(session.toggle(), RecognitionState::Idle);
    }

    #[test]
    fn error_event_forces_idle() {
        let mut session = RecognitionSession::new(Box::new(ProbeRecognizer::new()));
        session.toggle();
        assert!(session.is_listening());

        session.fail("no-speech");
        assert_eq!(session.state(), RecognitionState::Idle);
    }

    #[test]
    fn transcript_concatenates_segments_in_order() {
        let segments = vec!["hello ".to_string(), "there ".to_string(), "world".to_string()];
        assert_eq!(RecognitionSession::assemble_transcript(&segments), "hello there world");
    }

    #[test]
    fn later_event_supersedes_earlier_one() {
        let first = RecognitionSession::assemble_transcript(&["hel".to_string()]);
        let second = RecognitionSession::assemble_transcript(&["hello world".to_string()]);
        assert_eq!(first, "hel");
        // The second event replaces the first wholesale, nothing accumulates.
        assert_eq!(second, "hello world");
    }
}
