//! Chat domain types: message turns and the append-only message log.

use serde::{Deserialize, Serialize};

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Who authored this turn.
    pub role: MessageRole,

    /// The turn text.
    pub content: String,

    /// Whether this turn is currently being spoken aloud.
    ///
    /// Only meaningful for assistant turns; user turns keep the default.
    #[serde(default)]
    pub is_playing: bool,
}

impl Message {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            is_playing: false,
        }
    }

    /// Create an assistant turn (not playing).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            is_playing: false,
        }
    }

    /// Whether this is an assistant turn.
    #[must_use]
    pub const fn is_assistant(&self) -> bool {
        matches!(self.role, MessageRole::Assistant)
    }
}

/// Append-only, index-addressable log of chat turns.
///
/// The index assigned by [`push`](Self::push) is the turn's identity: the
/// synthesis session uses it to route utterance lifecycle events back to
/// the entry they belong to.
///
/// Invariant: at most one turn has `is_playing == true` at any time.
/// [`set_playing`](Self::set_playing) enforces this by clearing every other
/// flag before setting one.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// Append a turn and return its assigned index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Set one turn's playing flag.
    ///
    /// Setting a flag to `true` first clears the flag on every other turn,
    /// so the single-playing invariant holds for any call sequence. An
    /// out-of-range index is ignored with a warning.
    pub fn set_playing(&mut self, index: usize, playing: bool) {
        if index >= self.messages.len() {
            tracing::warn!(index, len = self.messages.len(), "set_playing index out of range");
            return;
        }

        if playing {
            for message in &mut self.messages {
                message.is_playing = false;
            }
        }
        self.messages[index].is_playing = playing;
    }

    /// Clear the playing flag on every turn (global stop).
    pub fn clear_playing(&mut self) {
        for message in &mut self.messages {
            message.is_playing = false;
        }
    }

    /// Index of the turn currently playing, if any.
    #[must_use]
    pub fn playing_index(&self) -> Option<usize> {
        self.messages.iter().position(|m| m.is_playing)
    }

    /// Get a turn by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Iterate over turns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_sequential_indexes() {
        let mut log = MessageLog::new();
        assert_eq!(log.push(Message::user("hi")), 0);
        assert_eq!(log.push(Message::assistant("hello")), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn set_playing_clears_other_flags() {
        let mut log = MessageLog::new();
        log.push(Message::assistant("one"));
        log.push(Message::assistant("two"));

        log.set_playing(0, true);
        log.set_playing(1, true);

        assert_eq!(log.playing_index(), Some(1));
        assert!(!log.get(0).unwrap().is_playing);
    }

    #[test]
    fn set_playing_out_of_range_is_ignored() {
        let mut log = MessageLog::new();
        log.push(Message::assistant("one"));
        log.set_playing(5, true);
        assert_eq!(log.playing_index(), None);
    }

    #[test]
    fn clear_playing_resets_all_flags() {
        let mut log = MessageLog::new();
        log.push(Message::assistant("one"));
        log.set_playing(0, true);

        log.clear_playing();
        assert_eq!(log.playing_index(), None);

        // Idempotent: a second clear leaves the same end state.
        log.clear_playing();
        assert_eq!(log.playing_index(), None);
    }

    #[test]
    fn clearing_one_flag_leaves_content_untouched() {
        let mut log = MessageLog::new();
        log.push(Message::user("question"));
        let idx = log.push(Message::assistant("answer"));

        log.set_playing(idx, true);
        log.set_playing(idx, false);

        assert_eq!(log.get(0).unwrap().content, "question");
        assert_eq!(log.get(idx).unwrap().content, "answer");
        assert_eq!(log.get(idx).unwrap().role, MessageRole::Assistant);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = Message::user("hi");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["isPlaying"], false);
    }
}
