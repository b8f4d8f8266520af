//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use inventory_agent::agent::{AgentSettings, QueryAgent};
use inventory_agent::error::InventoryError;
use inventory_agent::interpret::RuleTablePolicy;
use inventory_agent::inventory::{InventorySnapshot, MemoryInventorySource};
use inventory_agent::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use inventory_agent::tools::InventoryTool;
use inventory_agent::types::*;
use inventory_agent::util::retry::RetryPolicy;

pub const SAMPLE_CSV: &str = "\
Material Name,Location,Quantity,Unit
Round table,Hallway,12,pcs
Chairs,Hallway,30,pcs
Cold pack,Shelf-1,6,box
Flashlight,Shelf-10,4,
Sandbags,Basement,40,bags
Fire extinguisher,Top Floor,2,
";

pub fn sample_snapshot() -> InventorySnapshot {
    InventorySnapshot::parse_csv(SAMPLE_CSV).expect("sample csv parses")
}

pub fn memory_source() -> Arc<MemoryInventorySource> {
    Arc::new(MemoryInventorySource::new(sample_snapshot()))
}

/// Write `contents` to a temporary CSV file that lives as long as the handle.
pub fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write csv");
    file
}

/// Fast, single-attempt settings so failures surface immediately.
pub fn test_settings(max_steps: usize) -> AgentSettings {
    AgentSettings::builder()
        .max_steps(max_steps)
        .retry(RetryPolicy::none())
        .build()
}

/// Agent over `provider` with the inventory tool on the sample data.
pub fn agent_with(provider: Arc<MockProvider>) -> QueryAgent {
    let policy = RuleTablePolicy::default();
    QueryAgent::new(provider, &policy)
        .with_tool(Arc::new(InventoryTool::new(memory_source(), &policy)))
        .with_settings(test_settings(8))
}

enum Scripted {
    Respond(ProviderResponse),
    Fail(InventoryError),
}

/// A mock provider that plays back scripted responses and records requests.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a final text answer.
    pub fn queue_response(&self, text: &str) {
        let mut response = ProviderResponse::final_answer(text);
        response.usage = Usage {
            input_tokens: 10,
            output_tokens: 20,
            total_tokens: 30,
        };
        self.push(Scripted::Respond(response));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        let mut response = ProviderResponse::tool_call(AgentToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: args,
        });
        response.usage = Usage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
        };
        self.push(Scripted::Respond(response));
    }

    /// Queue a raw response.
    pub fn queue(&self, response: ProviderResponse) {
        self.push(Scripted::Respond(response));
    }

    /// Queue a failure for the next call.
    pub fn queue_failure(&self, error: InventoryError) {
        self.push(Scripted::Fail(error));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn push(&self, entry: Scripted) {
        self.script.lock().unwrap().push_back(entry);
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, InventoryError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            None => Ok(ProviderResponse::final_answer("Mock response")),
        }
    }
}
