//! Chat session manager — the state machine coordinating recognition,
//! synthesis, and the message log.
//!
//! ```text
//!   speech ─▶ Recognition ─▶ Transcript ─▶ (send) ─▶ MessageLog (user)
//!                                                      │
//!                                               ChatGateway
//!                                                      │
//!             flag updates ◀─ Synthesis ◀─ MessageLog (assistant)
//! ```
//!
//! All mutation flows through [`SessionCommand`] values consumed strictly
//! in arrival order by one logical task: UI controls and host capability
//! callbacks alike enqueue commands, so asynchronous browser-style event
//! delivery never races session state. The session emits
//! [`SessionEvent`]s on an unbounded channel for a UI layer to consume.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use voxchat_core::{ChatGateway, GatewayError, Message, MessageLog, Settings};

use crate::backend::{RecognizerBackend, SynthesizerBackend};
use crate::recognition::{RecognitionSession, RecognitionState};
use crate::synthesis::{SpeechSettings, SynthesisSession, SynthesisState};

// ── Commands ───────────────────────────────────────────────────────

/// One state transition request, from the UI or from a host capability
/// callback.
#[derive(Debug)]
pub enum SessionCommand {
    /// Flip the listening toggle: start capture when idle, stop when
    /// listening.
    ToggleListening,

    /// Submit the current transcript as a user turn.
    Send,

    /// Cancel playback entirely and clear every playing flag.
    StopSpeaking,

    /// Suspend playback of the active utterance.
    PauseSpeaking,

    /// Continue a paused utterance.
    ResumeSpeaking,

    /// Re-speak a past assistant turn (cancel-and-restart).
    Replay {
        /// Index of the turn to speak.
        index: usize,
    },

    /// Clear the visible send-failure state.
    DismissError,

    /// End the session run loop.
    Shutdown,

    /// Recognition callback: a refined hypothesis of the utterance so
    /// far. Segments replace the transcript wholesale.
    TranscriptUpdated {
        /// All currently-hypothesized segments, in order.
        segments: Vec<String>,
    },

    /// Recognition callback: the capability errored.
    RecognitionFailed {
        /// Host-reported reason.
        reason: String,
    },

    /// Recognition callback: the host ended capture on its own.
    RecognitionEnded,

    /// Synthesis callback: utterance for this turn started playing.
    PlaybackStarted {
        /// Turn index the utterance belongs to.
        index: usize,
    },

    /// Synthesis callback: utterance for this turn finished playing.
    PlaybackFinished {
        /// Turn index the utterance belongs to.
        index: usize,
    },

    /// Synthesis callback: utterance for this turn aborted with an error.
    PlaybackFailed {
        /// Turn index the utterance belongs to.
        index: usize,
    },

    /// Gateway completion for a dispatched send. Enqueued internally by
    /// the session itself, never by callers.
    ReplyArrived {
        /// The gateway outcome.
        result: Result<String, GatewayError>,
    },
}

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the session for the UI layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The listening toggle changed.
    ListeningChanged(RecognitionState),

    /// The in-progress transcript changed.
    TranscriptChanged(String),

    /// A turn was appended to the log.
    MessageAppended {
        /// Assigned index of the new turn.
        index: usize,
        /// The appended turn.
        message: Message,
    },

    /// A turn's playing flag changed.
    PlayingChanged {
        /// Turn index.
        index: usize,
        /// New flag value.
        playing: bool,
    },

    /// The synthesis state changed.
    SpeakingChanged(SynthesisState),

    /// A send failed; the reason is retained until dismissed.
    SendFailed {
        /// Human-readable failure description.
        reason: String,
    },

    /// The retained send failure was dismissed.
    ErrorDismissed,
}

// ── Configuration ──────────────────────────────────────────────────

/// Session behavior knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether assistant replies are spoken as soon as they arrive.
    pub auto_speak: bool,

    /// Rate/pitch/volume applied to every utterance.
    pub speech: SpeechSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_speak: true,
            speech: SpeechSettings::default(),
        }
    }
}

impl SessionConfig {
    /// Derive a session config from application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = SpeechSettings::default();
        Self {
            auto_speak: settings.effective_auto_speak(),
            speech: SpeechSettings {
                rate: settings.speech_rate.unwrap_or(defaults.rate),
                pitch: settings.speech_pitch.unwrap_or(defaults.pitch),
                volume: settings.speech_volume.unwrap_or(defaults.volume),
            },
        }
    }
}

// ── Status DTO ─────────────────────────────────────────────────────

/// Snapshot of the session state for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Whether capture is active.
    pub listening: bool,

    /// Synthesis state machine label.
    pub speaking: SynthesisState,

    /// Whether a gateway call is outstanding.
    pub send_in_flight: bool,

    /// The in-progress transcript.
    pub transcript: String,

    /// Number of turns in the log.
    pub turns: usize,

    /// Retained send failure, if any.
    pub last_error: Option<String>,
}

// ── Handle ─────────────────────────────────────────────────────────

/// Cloneable command entry point, handed to UI layers and host capability
/// adapters.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Enqueue a command. Silently drops the command once the session has
    /// shut down.
    pub fn send(&self, command: SessionCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("session closed, dropping command");
        }
    }
}

// ── Session ────────────────────────────────────────────────────────

/// The session manager.
///
/// Owns the transcript buffer, the message log, and both speech sessions.
/// Drive it either by awaiting [`run`](Self::run) and feeding commands
/// through a [`SessionHandle`], or synchronously with
/// [`handle`](Self::handle) — both consume commands in order.
pub struct ChatSession {
    recognition: RecognitionSession,
    synthesis: SynthesisSession,
    log: MessageLog,
    transcript: String,
    send_in_flight: bool,
    last_error: Option<String>,
    auto_speak: bool,
    gateway: Arc<dyn ChatGateway>,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<SessionCommand>>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChatSession {
    /// Create a session over the given backends and gateway.
    ///
    /// Returns the session and the receiver for its [`SessionEvent`]s.
    #[must_use]
    pub fn new(
        recognizer: Box<dyn RecognizerBackend>,
        synthesizer: Box<dyn SynthesizerBackend>,
        gateway: Arc<dyn ChatGateway>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Self {
            recognition: RecognitionSession::new(recognizer),
            synthesis: SynthesisSession::new(synthesizer, config.speech),
            log: MessageLog::new(),
            transcript: String::new(),
            send_in_flight: false,
            last_error: None,
            auto_speak: config.auto_speak,
            gateway,
            command_tx,
            command_rx: Some(command_rx),
            event_tx,
        };

        (session, event_rx)
    }

    /// Get a command entry point for UI layers and capability adapters.
    #[must_use]
    pub fn commands(&self) -> SessionHandle {
        SessionHandle {
            tx: self.command_tx.clone(),
        }
    }

    // ── Read access ────────────────────────────────────────────────

    /// The in-progress transcript.
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// The message log.
    #[must_use]
    pub const fn messages(&self) -> &MessageLog {
        &self.log
    }

    /// Whether capture is active.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.recognition.is_listening()
    }

    /// Whether an utterance is playing or paused.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.synthesis.state() != SynthesisState::Idle
    }

    /// Whether a gateway call is outstanding.
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        self.send_in_flight
    }

    /// Retained send failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Snapshot the session state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            listening: self.recognition.is_listening(),
            speaking: self.synthesis.state(),
            send_in_flight: self.send_in_flight,
            transcript: self.transcript.clone(),
            turns: self.log.len(),
            last_error: self.last_error.clone(),
        }
    }

    // ── Run loop ───────────────────────────────────────────────────

    /// Consume commands until [`SessionCommand::Shutdown`] arrives.
    pub async fn run(mut self) {
        let Some(mut rx) = self.command_rx.take() else {
            tracing::warn!("session run loop already taken");
            return;
        };

        while let Some(command) = rx.recv().await {
            if matches!(command, SessionCommand::Shutdown) {
                tracing::info!("session shutting down");
                break;
            }
            self.handle(command);
        }

        // Teardown: stop capture and cancel any playback.
        if self.recognition.is_listening() {
            self.recognition.toggle();
        }
        self.synthesis.stop();
    }

    // ── Command dispatch ───────────────────────────────────────────

    /// Apply one command. Must be called inside a tokio runtime —
    /// [`SessionCommand::Send`] dispatches the gateway call as a task.
    pub fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ToggleListening => {
                let state = self.recognition.toggle();
                self.emit(SessionEvent::ListeningChanged(state));
            }

            SessionCommand::Send => self.handle_send(),

            SessionCommand::StopSpeaking => self.handle_stop_speaking(),
            SessionCommand::PauseSpeaking => self.handle_pause_speaking(),
            SessionCommand::ResumeSpeaking => self.handle_resume_speaking(),

            SessionCommand::Replay { index } => self.speak_turn(index),

            SessionCommand::DismissError => {
                if self.last_error.take().is_some() {
                    self.emit(SessionEvent::ErrorDismissed);
                }
            }

            SessionCommand::Shutdown => {}

            SessionCommand::TranscriptUpdated { segments } => {
                self.transcript = RecognitionSession::assemble_transcript(&segments);
                self.emit(SessionEvent::TranscriptChanged(self.transcript.clone()));
            }

            SessionCommand::RecognitionFailed { reason } => {
                self.recognition.fail(&reason);
                self.emit(SessionEvent::ListeningChanged(RecognitionState::Idle));
            }

            SessionCommand::RecognitionEnded => {
                self.recognition.ended();
                self.emit(SessionEvent::ListeningChanged(RecognitionState::Idle));
            }

            SessionCommand::PlaybackStarted { index } => {
                if self.synthesis.on_started(index) {
                    self.log.set_playing(index, true);
                    self.emit(SessionEvent::PlayingChanged { index, playing: true });
                    self.emit(SessionEvent::SpeakingChanged(SynthesisState::Speaking));
                }
            }

            SessionCommand::PlaybackFinished { index } => {
                if self.synthesis.on_ended(index) {
                    self.log.set_playing(index, false);
                    self.emit(SessionEvent::PlayingChanged { index, playing: false });
                    self.emit(SessionEvent::SpeakingChanged(SynthesisState::Idle));
                }
            }

            SessionCommand::PlaybackFailed { index } => {
                tracing::warn!(index, "utterance playback failed");
                if self.synthesis.on_ended(index) {
                    self.log.set_playing(index, false);
                    self.emit(SessionEvent::PlayingChanged { index, playing: false });
                    self.emit(SessionEvent::SpeakingChanged(SynthesisState::Idle));
                }
            }

            SessionCommand::ReplyArrived { result } => self.handle_reply(result),
        }
    }

    // ── Send flow ──────────────────────────────────────────────────

    fn handle_send(&mut self) {
        let content = self.transcript.trim().to_string();
        if content.is_empty() {
            tracing::debug!("ignoring send of empty transcript");
            return;
        }

        let message = Message::user(content.clone());
        let index = self.log.push(message.clone());
        self.emit(SessionEvent::MessageAppended { index, message });

        self.transcript.clear();
        self.emit(SessionEvent::TranscriptChanged(String::new()));

        self.send_in_flight = true;
        tracing::info!(chars = content.len(), "dispatching message to chat gateway");

        // The gateway call runs off the session task; its outcome comes
        // back through the command channel, preserving arrival order.
        let gateway = Arc::clone(&self.gateway);
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = gateway.send(&content).await;
            let _ = tx.send(SessionCommand::ReplyArrived { result });
        });
    }

    fn handle_reply(&mut self, result: Result<String, GatewayError>) {
        self.send_in_flight = false;

        match result {
            Ok(reply) => {
                let message = Message::assistant(reply);
                let index = self.log.push(message.clone());
                self.emit(SessionEvent::MessageAppended { index, message });
                if self.auto_speak {
                    self.speak_turn(index);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send message");
                let reason = e.to_string();
                self.last_error = Some(reason.clone());
                self.emit(SessionEvent::SendFailed { reason });
            }
        }
    }

    // ── Playback flow ──────────────────────────────────────────────

    /// Speak an assistant turn, cancelling any in-flight utterance.
    fn speak_turn(&mut self, index: usize) {
        let Some(message) = self.log.get(index) else {
            tracing::warn!(index, "cannot speak out-of-range turn");
            return;
        };
        if !message.is_assistant() {
            tracing::warn!(index, "refusing to speak a user turn");
            return;
        }
        let content = message.content.clone();

        // The superseded utterance will emit no further events, so its
        // flag is cleared here rather than waiting for a callback.
        if let Some(previous) = self.log.playing_index() {
            self.log.clear_playing();
            self.emit(SessionEvent::PlayingChanged { index: previous, playing: false });
        }

        if let Err(e) = self.synthesis.speak(&content, index) {
            tracing::warn!(error = %e, index, "failed to start speech synthesis");
        }
    }

    fn handle_stop_speaking(&mut self) {
        self.synthesis.stop();
        if let Some(index) = self.log.playing_index() {
            self.log.clear_playing();
            self.emit(SessionEvent::PlayingChanged { index, playing: false });
        }
        self.emit(SessionEvent::SpeakingChanged(SynthesisState::Idle));
    }

    fn handle_pause_speaking(&mut self) {
        if self.synthesis.state() != SynthesisState::Speaking {
            return;
        }
        self.synthesis.pause();
        if let Some(index) = self.synthesis.active() {
            self.log.set_playing(index, false);
            self.emit(SessionEvent::PlayingChanged { index, playing: false });
        }
        self.emit(SessionEvent::SpeakingChanged(SynthesisState::Paused));
    }

    fn handle_resume_speaking(&mut self) {
        if self.synthesis.state() != SynthesisState::Paused {
            return;
        }
        self.synthesis.resume();
        if let Some(index) = self.synthesis.active() {
            self.log.set_playing(index, true);
            self.emit(SessionEvent::PlayingChanged { index, playing: true });
        }
        self.emit(SessionEvent::SpeakingChanged(SynthesisState::Speaking));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}
