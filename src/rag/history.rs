//! Per-farmer rolling conversation window

use std::collections::VecDeque;

use dashmap::DashMap;

use crate::llm::ChatMessage;

/// Recent exchanges keyed by farmer id, held in process memory
pub struct ConversationHistory {
    conversations: DashMap<String, VecDeque<ChatMessage>>,
    max_messages: usize,
}

impl ConversationHistory {
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            max_messages,
        }
    }

    /// Messages for `farmer_id`, oldest first
    #[must_use]
    pub fn recent(&self, farmer_id: &str) -> Vec<ChatMessage> {
        self.conversations
            .get(farmer_id)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append a question and its answer, dropping the oldest exchanges
    /// beyond the window. The window always starts with a user message, so
    /// an odd `max_messages` holds one message less and anything below two
    /// disables history.
    pub fn append(&self, farmer_id: &str, question: &str, answer: &str) {
        if self.max_messages < 2 {
            return;
        }

        let mut messages = self.conversations.entry(farmer_id.to_string()).or_default();
        messages.push_back(ChatMessage::user(question));
        messages.push_back(ChatMessage::assistant(answer));
        while messages.len() > self.max_messages {
            messages.pop_front();
            messages.pop_front();
        }
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(10)
    }
}
