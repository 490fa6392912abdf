//! Speech session error types.

/// Errors that can occur in the speech sessions.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The host offers no speech-recognition capability.
    #[error("Speech recognition is not available on this host")]
    RecognitionUnavailable,

    /// The host offers no speech-synthesis capability.
    #[error("Speech synthesis is not available on this host")]
    SynthesisUnavailable,

    /// The recognition capability failed to start or capture.
    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    /// The synthesis capability rejected or aborted an utterance.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}
