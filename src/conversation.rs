//! The ordered transcript of a chat session.

use std::slice;

use crate::types::{Message, Role};

/// System message a conversation starts with unless told otherwise.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// An ordered, append-only sequence of role-tagged messages.
///
/// A conversation always starts with exactly one system message.  Messages
/// are kept in the order they were appended and are never reordered or
/// deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation seeded with the given system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Adds a message to the end of the conversation.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full ordered sequence as it exists right now.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system message is never removed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The system prompt the conversation was seeded with.
    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    /// Number of completed user/assistant exchanges.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.role == Role::Assistant)
            .count()
    }

    /// Iterates over the messages in order.
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Drops everything after the first `len` messages.
    ///
    /// Only used to undo a turn that failed; the system message always stays.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_system_message() {
        let conversation = Conversation::default();
        assert_eq!(conversation.len(), 1);
        assert!(!conversation.is_empty());
        assert_eq!(
            conversation.snapshot(),
            &[Message::system("You are a helpful assistant.")]
        );
        assert_eq!(conversation.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(conversation.turns(), 0);
    }

    #[test]
    fn append_preserves_order() {
        let mut conversation = Conversation::new("Be terse.");
        conversation.append(Message::user("one"));
        conversation.append(Message::assistant("1"));
        conversation.append(Message::user("two"));
        conversation.append(Message::assistant("2"));

        let contents: Vec<&str> = conversation.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Be terse.", "one", "1", "two", "2"]);
        assert_eq!(conversation.turns(), 2);
        assert_eq!(conversation.last(), Some(&Message::assistant("2")));
    }

    #[test]
    fn duplicates_are_kept() {
        let mut conversation = Conversation::default();
        conversation.append(Message::user("again"));
        conversation.append(Message::user("again"));
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn snapshot_is_a_point_in_time_copy_when_cloned() {
        let mut conversation = Conversation::default();
        conversation.append(Message::user("first"));
        let before = conversation.snapshot().to_vec();
        conversation.append(Message::assistant("reply"));
        assert_eq!(before.len(), 2);
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn truncate_never_drops_system_message() {
        let mut conversation = Conversation::default();
        conversation.append(Message::user("dangling"));
        conversation.truncate(0);
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.snapshot()[0].role, Role::System);
    }
}
