//! Host capability backend traits — engine-agnostic interfaces for
//! speech recognition and speech synthesis.
//!
//! The sessions in [`recognition`](crate::recognition) and
//! [`synthesis`](crate::synthesis) operate on trait objects
//! (`Box<dyn RecognizerBackend>`, `Box<dyn SynthesizerBackend>`) so that
//! host integrations can be swapped without touching the session logic.
//! A backend wrapping a real host capability delivers its asynchronous
//! callbacks by sending [`SessionCommand`](crate::session::SessionCommand)
//! values through a [`SessionHandle`](crate::session::SessionHandle);
//! the session manager consumes them strictly in arrival order.
//!
//! When the host lacks a capability, the [`NullRecognizer`] and
//! [`NullSynthesizer`] stand in: the listening control becomes inert and
//! replies are shown without being spoken.

use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

// ── Shared types ───────────────────────────────────────────────────

/// A voice offered by the synthesis capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice identifier, passed back in [`SpeechRequest::voice`].
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// BCP 47 language tag, e.g. `"en-US"`.
    pub language: String,
}

/// One utterance request handed to the synthesis backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Text to vocalize.
    pub text: String,

    /// Selected voice id; `None` defers to the host default (the voice
    /// list may be empty right after startup).
    pub voice: Option<String>,

    /// Rate multiplier (1.0 = neutral).
    pub rate: f32,

    /// Pitch (1.0 = neutral).
    pub pitch: f32,

    /// Volume (1.0 = full).
    pub volume: f32,
}

impl SpeechRequest {
    /// Build a request for `text` with neutral rate/pitch/volume and no
    /// explicit voice.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ── Recognizer backend trait ───────────────────────────────────────

/// Continuous speech-recognition capability.
///
/// While capturing, the backend delivers partial-hypothesis callbacks as
/// `SessionCommand::TranscriptUpdated` (full cumulative segments each
/// time, not deltas), and `RecognitionFailed` / `RecognitionEnded` when
/// the host errors or stops on its own.
pub trait RecognizerBackend: Send {
    /// Whether the host actually offers this capability.
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin continuous capture with interim results enabled.
    fn start(&mut self) -> Result<(), VoiceError>;

    /// Stop capture. Safe to call when not capturing.
    fn stop(&mut self);
}

// ── Synthesizer backend trait ──────────────────────────────────────

/// Speech-synthesis capability.
///
/// At most one utterance is in flight: the synthesis session cancels any
/// prior utterance before issuing a new one. Playback lifecycle arrives
/// as `SessionCommand::PlaybackStarted` / `PlaybackFinished` /
/// `PlaybackFailed`, each tagged with the utterance id passed to
/// [`speak`](Self::speak). [`cancel`](Self::cancel) must not emit
/// lifecycle callbacks for the cancelled utterance.
pub trait SynthesizerBackend: Send {
    /// Whether the host actually offers this capability.
    fn is_supported(&self) -> bool {
        true
    }

    /// The host's current voice list. May be empty shortly after startup,
    /// before the host has populated it.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Begin playback of one utterance.
    fn speak(&mut self, request: &SpeechRequest, utterance: usize) -> Result<(), VoiceError>;

    /// Suspend playback without clearing the active utterance.
    fn pause(&mut self);

    /// Continue a paused utterance.
    fn resume(&mut self);

    /// Cancel playback entirely and clear the active utterance.
    fn cancel(&mut self);
}

// ── Null backends ──────────────────────────────────────────────────

/// Recognizer stand-in for hosts without speech recognition.
///
/// Reports itself unsupported; the session leaves the listening control
/// inert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecognizer;

impl RecognizerBackend for NullRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), VoiceError> {
        Err(VoiceError::RecognitionUnavailable)
    }

    fn stop(&mut self) {}
}

/// Synthesizer stand-in for hosts without speech synthesis.
///
/// Reports itself unsupported; replies are shown but never spoken, and no
/// lifecycle callbacks ever fire.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSynthesizer;

impl SynthesizerBackend for NullSynthesizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn speak(&mut self, _request: &SpeechRequest, _utterance: usize) -> Result<(), VoiceError> {
        Err(VoiceError::SynthesisUnavailable)
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {}
}
