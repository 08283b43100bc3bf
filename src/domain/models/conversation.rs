use super::Message;

pub const DEFAULT_GREETING: &str = "How can I help you?";

/// Ordered, append-only log of the messages exchanged in one session.
///
/// Insertion order is chronological and is never changed: there is no
/// deletion, editing or deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Starts a log holding a single assistant greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True when no two neighbouring messages share a role.
    pub fn is_alternating(&self) -> bool {
        self.messages
            .windows(2)
            .all(|pair| pair[0].role() != pair[1].role())
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::seeded(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_store_holds_the_greeting() {
        let store = ConversationStore::default();
        assert_eq!(store.all(), &[Message::assistant("How can I help you?")]);
    }

    #[test]
    fn append_preserves_order() {
        let mut store = ConversationStore::seeded("hello");
        store.append(Message::user("a"));
        store.append(Message::assistant("b"));

        let contents: Vec<_> = store.all().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["hello", "a", "b"]);
        assert!(store.is_alternating());
    }

    #[test]
    fn consecutive_roles_break_alternation() {
        let mut store = ConversationStore::seeded("hello");
        store.append(Message::user("a"));
        store.append(Message::user("b"));
        assert!(!store.is_alternating());
    }
}
