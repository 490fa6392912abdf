#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod error;
pub mod recognition;
pub mod session;
pub mod synthesis;

// Re-export key types for convenience
pub use backend::{
    NullRecognizer, NullSynthesizer, RecognizerBackend, SpeechRequest, SynthesizerBackend,
    VoiceInfo,
};
pub use error::VoiceError;
pub use recognition::{RecognitionSession, RecognitionState};
pub use session::{
    ChatSession, SessionCommand, SessionConfig, SessionEvent, SessionHandle, SessionStatus,
};
pub use synthesis::{SpeechSettings, SynthesisSession, SynthesisState, select_voice};
