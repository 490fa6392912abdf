//! Synthesis session — one utterance at a time over the host's
//! speech-synthesis capability.
//!
//! There is no persistent utterance object: each spoken reply is a fresh
//! [`SpeechRequest`], and issuing a new one cancels whatever was in
//! flight. The host's audio output is a single exclusive resource; this
//! session is its sole owner and never allows two overlapping utterances.

use serde::{Deserialize, Serialize};

use crate::backend::{SpeechRequest, SynthesizerBackend, VoiceInfo};
use crate::error::VoiceError;

/// Current state of the synthesis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SynthesisState {
    /// Nothing playing.
    Idle,

    /// An utterance is being played back.
    Speaking,

    /// Playback suspended, the active utterance retained.
    Paused,
}

/// Rate/pitch/volume applied to every utterance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSettings {
    /// Rate multiplier (1.0 = neutral).
    pub rate: f32,

    /// Pitch (1.0 = neutral).
    pub pitch: f32,

    /// Volume (1.0 = full).
    pub volume: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self { rate: 1.0, pitch: 1.0, volume: 1.0 }
    }
}

/// Pick a voice from the host's list.
///
/// Preferred: the first English voice whose display name signals a female
/// voice. Fallback: the first voice in the list. An empty list (common
/// right after startup, before the host has populated it) yields `None`
/// and synthesis proceeds with the host default — degraded, not an error.
#[must_use]
pub fn select_voice(voices: &[VoiceInfo]) -> Option<&VoiceInfo> {
    voices
        .iter()
        .find(|v| v.language.starts_with("en") && v.name.contains("Female"))
        .or_else(|| voices.first())
}

/// Wraps the host's speech-synthesis capability, tracking the single
/// active utterance.
pub struct SynthesisSession {
    state: SynthesisState,
    backend: Box<dyn SynthesizerBackend>,
    settings: SpeechSettings,
    /// Id of the utterance currently owned by the backend, if any.
    active: Option<usize>,
}

impl SynthesisSession {
    /// Create a session over the given backend.
    #[must_use]
    pub fn new(backend: Box<dyn SynthesizerBackend>, settings: SpeechSettings) -> Self {
        Self {
            state: SynthesisState::Idle,
            backend,
            settings,
            active: None,
        }
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> SynthesisState {
        self.state
    }

    /// Id of the active utterance, if any.
    #[must_use]
    pub const fn active(&self) -> Option<usize> {
        self.active
    }

    /// Whether the host offers synthesis at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    /// Begin speaking `text` as utterance `utterance`.
    ///
    /// Any in-flight utterance is cancelled unconditionally first. The
    /// voice list is re-queried on every call, tolerating a list that was
    /// empty at startup. Playback state transitions to `Speaking` only
    /// when the backend reports the utterance started.
    pub fn speak(&mut self, text: &str, utterance: usize) -> Result<(), VoiceError> {
        if !self.backend.is_supported() {
            tracing::debug!("speech synthesis unsupported, reply will not be spoken");
            return Ok(());
        }

        self.backend.cancel();
        self.state = SynthesisState::Idle;
        self.active = None;

        let voices = self.backend.voices();
        let voice = select_voice(&voices).map(|v| v.id.clone());
        if voice.is_none() && voices.is_empty() {
            tracing::debug!("voice list empty, deferring to host default voice");
        }

        let request = SpeechRequest {
            text: text.to_string(),
            voice,
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            volume: self.settings.volume,
        };

        self.backend.speak(&request, utterance)?;
        self.active = Some(utterance);
        Ok(())
    }

    /// Suspend playback. Meaningful only while speaking.
    pub fn pause(&mut self) {
        if self.state == SynthesisState::Speaking {
            self.backend.pause();
            self.state = SynthesisState::Paused;
        }
    }

    /// Continue a paused utterance. Meaningful only while paused.
    pub fn resume(&mut self) {
        if self.state == SynthesisState::Paused {
            self.backend.resume();
            self.state = SynthesisState::Speaking;
        }
    }

    /// Cancel playback entirely and clear state. Idempotent.
    pub fn stop(&mut self) {
        self.backend.cancel();
        self.state = SynthesisState::Idle;
        self.active = None;
    }

    /// The backend reported utterance `utterance` started playing.
    ///
    /// Returns false for a stale id (an utterance already superseded by a
    /// newer `speak`), which callers must ignore.
    pub fn on_started(&mut self, utterance: usize) -> bool {
        if self.active == Some(utterance) {
            self.state = SynthesisState::Speaking;
            true
        } else {
            tracing::debug!(utterance, "ignoring start event for stale utterance");
            false
        }
    }

    /// The backend reported utterance `utterance` finished or failed.
    ///
    /// Returns false for a stale id.
    pub fn on_ended(&mut self, utterance: usize) -> bool {
        if self.active == Some(utterance) {
            self.state = SynthesisState::Idle;
            self.active = None;
            true
        } else {
            tracing::debug!(utterance, "ignoring end event for stale utterance");
            false
        }
    }
}
