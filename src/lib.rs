//! Conversational inventory query engine.
//!
//! Answers natural-language questions about a facility inventory (materials,
//! locations, quantities) by letting a completion service call inventory
//! tools, keeps per-session conversation memory, and exports the whole
//! inventory as CSV when a user asks for a download.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use inventory_agent::prelude::*;
//!
//! # async fn example() -> inventory_agent::error::Result<()> {
//! let policy: Arc<dyn InterpretationPolicy> = Arc::new(RuleTablePolicy::default());
//! let source: Arc<dyn InventorySource> = Arc::new(CsvInventorySource::new("inventory.csv"));
//! let provider = Arc::new(LocalProvider::new(policy.clone()));
//! let assistant = InventoryAssistant::assemble(provider, source, policy, AgentSettings::default());
//!
//! let mut session = SessionState::new(Some(20));
//! let response = assistant.submit(&mut session, "What are the items available in Hallway?").await?;
//! println!("{}", response.answer());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod assistant;
pub mod config;
pub mod error;
pub mod export;
pub mod interpret;
pub mod inventory;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
