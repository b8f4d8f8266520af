//! Tool system for function calling.

pub mod arguments;
pub mod inventory;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use inventory::{EmergencySuppliesTool, InventoryTool, EMERGENCY_TOOL_NAME, INVENTORY_TOOL_NAME};
pub use tool::{AgentTool, Tool, ToolDescriptor, ToolExecutionContext};
pub use types::AgentToolParameters;
