//! Inventory access tools.

use std::sync::Arc;

use async_trait::async_trait;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::InventoryError;
use crate::interpret::{EmergencyCategory, InterpretationPolicy};
use crate::inventory::render::render_record;
use crate::inventory::InventorySource;

pub const INVENTORY_TOOL_NAME: &str = "inventory_csv_reader";
pub const EMERGENCY_TOOL_NAME: &str = "find_emergency_supplies";

/// Prefix of the in-band text a tool returns when the source cannot be read.
pub const DATA_UNAVAILABLE_PREFIX: &str = "Error reading inventory: ";

fn unavailable_text(err: &InventoryError) -> String {
    match err {
        InventoryError::DataUnavailable(reason) => format!("{DATA_UNAVAILABLE_PREFIX}{reason}"),
        other => format!("{DATA_UNAVAILABLE_PREFIX}{other}"),
    }
}

/// Returns the whole inventory as text, one record per line.
///
/// A source failure is returned as the tool output rather than an error, so
/// the reasoning layer can tell the user what went wrong.
pub struct InventoryTool {
    source: Arc<dyn InventorySource>,
    description: String,
    parameters: AgentToolParameters,
}

impl InventoryTool {
    pub fn new(source: Arc<dyn InventorySource>, policy: &dyn InterpretationPolicy) -> Self {
        let description = format!(
            "Reads every record of the facility inventory. Each output line is one record: \
             material name, location, quantity and unit.\n\n{}",
            policy.guidance()
        );
        Self {
            source,
            description,
            parameters: AgentToolParameters::empty(),
        }
    }

    /// Text rendering of the current inventory, or the failure text.
    pub async fn fetch_inventory(&self) -> String {
        match self.source.load().await {
            Ok(snapshot) if snapshot.is_empty() => "The inventory is empty.".to_string(),
            Ok(snapshot) => snapshot.render(),
            Err(e) => {
                warn!(source = %self.source.describe(), error = %e, "inventory unavailable");
                unavailable_text(&e)
            }
        }
    }
}

#[async_trait]
impl Tool for InventoryTool {
    fn name(&self) -> &str {
        INVENTORY_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        _args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, InventoryError> {
        debug!(step = ctx.step, "fetching inventory");
        Ok(serde_json::Value::String(self.fetch_inventory().await))
    }
}

/// Lists the inventory items relevant to one emergency category.
pub struct EmergencySuppliesTool {
    source: Arc<dyn InventorySource>,
    policy: Arc<dyn InterpretationPolicy>,
    parameters: AgentToolParameters,
}

impl EmergencySuppliesTool {
    pub fn new(source: Arc<dyn InventorySource>, policy: Arc<dyn InterpretationPolicy>) -> Self {
        let categories: Vec<String> = EmergencyCategory::iter().map(|c| c.to_string()).collect();
        let values: Vec<&str> = categories.iter().map(String::as_str).collect();
        let parameters = AgentToolParameters::object()
            .string_enum("category", "Emergency situation to find supplies for", &values, true)
            .build();
        Self {
            source,
            policy,
            parameters,
        }
    }
}

#[async_trait]
impl Tool for EmergencySuppliesTool {
    fn name(&self) -> &str {
        EMERGENCY_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Lists inventory items that are useful in an emergency (flood, fire, medical, power outage, \
         general disaster), each with the reason it helps. Only items present in the inventory are returned."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, InventoryError> {
        let raw = args.get_str("category")?;
        let category: EmergencyCategory = raw
            .trim()
            .parse()
            .map_err(|_| InventoryError::InvalidArgument(format!("unknown emergency category '{raw}'")))?;

        let snapshot = match self.source.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(serde_json::Value::String(unavailable_text(&e))),
        };

        let selections = self.policy.select(category, snapshot.records());
        let text = if selections.is_empty() {
            format!("No inventory items are relevant to a {}.", category.label())
        } else {
            selections
                .iter()
                .map(|s| format!("{} | reason: {}", render_record(s.record), s.reason))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Ok(serde_json::Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::RuleTablePolicy;
    use crate::inventory::{CsvInventorySource, InventoryRecord, InventorySnapshot, MemoryInventorySource};

    fn source() -> Arc<dyn InventorySource> {
        Arc::new(MemoryInventorySource::new(InventorySnapshot::from_records(vec![
            InventoryRecord::new("Flashlight", "Shelf-2", 4.0),
            InventoryRecord::new("Round table", "Hallway", 12.0).with_unit("pcs"),
        ])))
    }

    #[tokio::test]
    async fn inventory_tool_renders_every_record() {
        let tool = InventoryTool::new(source(), &RuleTablePolicy::default());
        let out = tool
            .execute(&ToolArguments::new(serde_json::json!({})), &ToolExecutionContext::default())
            .await
            .unwrap();
        let text = out.as_str().unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("material_name: Round table | location: Hallway | quantity: 12 | unit: pcs"));
    }

    #[tokio::test]
    async fn unreadable_source_is_reported_in_band() {
        let missing: Arc<dyn InventorySource> = Arc::new(CsvInventorySource::new("/no/such/inventory.csv"));
        let tool = InventoryTool::new(missing, &RuleTablePolicy::default());
        let text = tool.fetch_inventory().await;
        assert!(text.starts_with(DATA_UNAVAILABLE_PREFIX));
    }

    #[tokio::test]
    async fn emergency_tool_returns_reasons() {
        let tool = EmergencySuppliesTool::new(source(), Arc::new(RuleTablePolicy::default()));
        let out = tool
            .execute(
                &ToolArguments::new(serde_json::json!({"category": "power_outage"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();
        let text = out.as_str().unwrap();
        assert!(text.contains("Flashlight"));
        assert!(text.contains("reason: provides light without power"));
        assert!(!text.contains("Round table"));
    }

    #[tokio::test]
    async fn emergency_tool_rejects_unknown_category() {
        let tool = EmergencySuppliesTool::new(source(), Arc::new(RuleTablePolicy::default()));
        let err = tool
            .execute(
                &ToolArguments::new(serde_json::json!({"category": "volcano"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }
}
