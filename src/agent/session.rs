//! Per-session state and the manager that keys it by session id.

use std::collections::HashMap;

use super::history::SessionHistory;
use super::memory::{ConversationMemory, Exchange};

/// Remembers the last completed query and its answer.
#[derive(Debug, Clone, Default)]
pub struct DuplicateGuard {
    last: Option<(String, String)>,
}

impl DuplicateGuard {
    /// The stored answer when `query` equals the previous query.
    pub fn check(&self, query: &str) -> Option<&str> {
        match &self.last {
            Some((last_query, answer)) if last_query == query => Some(answer),
            _ => None,
        }
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last.as_ref().map(|(q, _)| q.as_str())
    }

    pub fn record(&mut self, query: &str, answer: &str) {
        self.last = Some((query.to_string(), answer.to_string()));
    }
}

/// Everything one conversation carries between turns.
///
/// Only the query agent mutates it, and only after a turn completes.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    memory: ConversationMemory,
    history: SessionHistory,
    guard: DuplicateGuard,
}

impl SessionState {
    pub fn new(memory_window: Option<usize>) -> Self {
        Self {
            memory: ConversationMemory::with_window(memory_window),
            history: SessionHistory::new(),
            guard: DuplicateGuard::default(),
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn guard(&self) -> &DuplicateGuard {
        &self.guard
    }

    /// Record a completed turn in memory, history and the duplicate guard.
    pub(crate) fn commit(&mut self, query: &str, answer: &str) {
        let exchange = Exchange::new(query, answer);
        self.memory.append(exchange.clone());
        self.history.append(exchange);
        self.guard.record(query, answer);
    }
}

/// Independent sessions keyed by id, one per user of a shared front end.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<String, SessionState>,
    memory_window: Option<usize>,
}

impl SessionManager {
    pub fn new(memory_window: Option<usize>) -> Self {
        Self {
            sessions: HashMap::new(),
            memory_window,
        }
    }

    /// Get or create a session by id.
    pub fn get_or_create(&mut self, session_id: &str) -> &mut SessionState {
        let window = self.memory_window;
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(window))
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }

    pub fn remove(&mut self, session_id: &str) -> Option<SessionState> {
        self.sessions.remove(session_id)
    }

    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.keys().map(|k| k.as_str()).collect()
    }
}
