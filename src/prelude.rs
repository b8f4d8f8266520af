//! Convenience re-exports for common use.

pub use crate::agent::{AgentSettings, QueryAgent, SessionManager, SessionState, TurnOutcome};
pub use crate::assistant::{InventoryAssistant, TurnResponse, SAMPLE_QUERIES};
pub use crate::config::{AccessGate, AppConfig, Backend};
pub use crate::error::{InventoryError, Result};
pub use crate::export::{ExportArtifact, ExportOutcome, InventoryExporter};
pub use crate::interpret::{EmergencyCategory, InterpretationPolicy, RuleTablePolicy};
pub use crate::inventory::{
    CachedInventorySource, CsvInventorySource, InventoryRecord, InventorySnapshot, InventorySource,
    MemoryInventorySource, Quantity,
};
pub use crate::provider::local::LocalProvider;
pub use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{GenerationSettings, ModelMessage, Role, Usage};
