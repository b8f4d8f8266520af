//! Conversation memory fed back to the completion service as context.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ModelMessage;

/// One completed turn: the trimmed query and the answer returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered exchanges, oldest first.
///
/// With a window, the oldest exchanges are evicted once it is full. Without
/// one, memory grows for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    exchanges: VecDeque<Exchange>,
    window: Option<usize>,
}

impl ConversationMemory {
    /// Unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory holding at most `window` exchanges. `None` or zero is unbounded.
    pub fn with_window(window: Option<usize>) -> Self {
        Self {
            exchanges: VecDeque::new(),
            window: window.filter(|w| *w > 0),
        }
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);
        if let Some(window) = self.window {
            while self.exchanges.len() > window {
                self.exchanges.pop_front();
            }
        }
    }

    pub fn exchanges(&self) -> impl DoubleEndedIterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Prior exchanges as alternating user/assistant messages.
    pub fn as_messages(&self) -> Vec<ModelMessage> {
        self.exchanges
            .iter()
            .flat_map(|e| [ModelMessage::user(e.query.clone()), ModelMessage::assistant(e.answer.clone())])
            .collect()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}
