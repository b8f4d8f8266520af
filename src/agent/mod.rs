//! Agent system: sessions, conversation memory and the query agent.

pub mod agent;
pub mod history;
pub mod memory;
pub mod session;

pub use agent::{AgentSettings, QueryAgent, TurnOutcome};
pub use history::SessionHistory;
pub use memory::{ConversationMemory, Exchange};
pub use session::{DuplicateGuard, SessionManager, SessionState};
