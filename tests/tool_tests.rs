//! Tests for the tool system.

mod common;

use std::sync::Arc;

use inventory_agent::error::InventoryError;
use inventory_agent::interpret::RuleTablePolicy;
use inventory_agent::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use inventory_agent::tools::*;

#[test]
fn parameter_builder_constructs_schema() {
    let params = AgentToolParameters::object()
        .string("location", "Location to look in", true)
        .string("material", "Material name", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["location"]["type"], "string");
    assert_eq!(schema["required"].as_array().unwrap().len(), 1);
}

#[test]
fn emergency_tool_advertises_every_category() {
    let tool = EmergencySuppliesTool::new(common::memory_source(), Arc::new(RuleTablePolicy::default()));
    let descriptor = tool.descriptor();

    assert_eq!(descriptor.name, EMERGENCY_TOOL_NAME);
    let values = descriptor.parameters["properties"]["category"]["enum"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(values.len(), 5);
    assert!(values.contains(&serde_json::json!("power_outage")));
}

#[test]
fn inventory_tool_description_carries_answer_guidance() {
    let tool = InventoryTool::new(common::memory_source(), &RuleTablePolicy::default());

    assert_eq!(tool.name(), INVENTORY_TOOL_NAME);
    assert!(tool.description().contains("Only include items that are actually listed in the inventory"));
    assert_eq!(tool.parameters().schema["type"], "object");
}

#[tokio::test]
async fn emergency_tool_rejects_unknown_category() {
    let tool = EmergencySuppliesTool::new(common::memory_source(), Arc::new(RuleTablePolicy::default()));

    let err = tool
        .execute(
            &ToolArguments::new(serde_json::json!({"category": "alien invasion"})),
            &ToolExecutionContext::default(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("alien invasion"));
}

#[tokio::test]
async fn agent_tool_executes() {
    let tool = AgentTool::new(
        "echo_location",
        "Echoes a location back",
        AgentToolParameters::object()
            .string("location", "Location", true)
            .build(),
        |args, ctx| async move {
            let location = args.get_str("location")?.to_string();
            Ok::<_, InventoryError>(serde_json::json!({ "location": location, "step": ctx.step }))
        },
    );

    let ctx = ToolExecutionContext {
        query: "items in hallway".into(),
        step: 1,
    };
    let result = tool
        .execute(&ToolArguments::new(serde_json::json!({"location": "Hallway"})), &ctx)
        .await
        .unwrap();

    assert_eq!(result, serde_json::json!({ "location": "Hallway", "step": 1 }));
}
