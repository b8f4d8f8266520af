//! Display log of a session's turns.

use super::memory::Exchange;

/// Append-only record of every completed turn, shown most recent first.
///
/// Unlike [`ConversationMemory`](super::ConversationMemory) it is never
/// windowed and never sent to the completion service.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<Exchange>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, exchange: Exchange) {
        self.entries.push(exchange);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, most recent first.
    pub fn recent_first(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter().rev()
    }

    /// Numbered `Query:`/`Response:` blocks, most recent first.
    pub fn render(&self) -> String {
        self.recent_first()
            .enumerate()
            .map(|(i, e)| format!("{}. Query: {}\nResponse: {}", i + 1, e.query, e.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_most_recent_first() {
        let mut history = SessionHistory::new();
        history.append(Exchange::new("first", "one"));
        history.append(Exchange::new("second", "two"));
        assert_eq!(
            history.render(),
            "1. Query: second\nResponse: two\n\n2. Query: first\nResponse: one"
        );
    }

    #[test]
    fn empty_history_renders_nothing() {
        assert_eq!(SessionHistory::new().render(), "");
    }
}
