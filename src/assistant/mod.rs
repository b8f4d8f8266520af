//! Front door for a conversational turn: the query agent plus the export path.

use std::sync::Arc;

use tracing::debug;

use crate::agent::{AgentSettings, QueryAgent, SessionState, TurnOutcome};
use crate::config::AppConfig;
use crate::error::Result;
use crate::export::{is_export_intent, ExportOutcome, InventoryExporter};
use crate::interpret::{InterpretationPolicy, RuleTablePolicy};
use crate::inventory::{CachedInventorySource, CsvInventorySource, InventorySource};
use crate::provider::{create_provider, ModelProvider};
use crate::tools::{EmergencySuppliesTool, InventoryTool};

/// Example questions offered to new users.
pub const SAMPLE_QUERIES: &[&str] = &[
    "What are the items available in Hallway?",
    "What are the materials available in shelf-1?",
    "How many Round tables are available with us?",
    "What are the items available on the Top Floor?",
    "Supplies available behind sandy hall curtain?",
    "What can we use during a power outage and why?",
    "Download full inventory list",
];

/// Answer to a submitted query, with the export when one was asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResponse {
    pub outcome: TurnOutcome,
    pub export: Option<ExportOutcome>,
}

impl TurnResponse {
    pub fn answer(&self) -> &str {
        &self.outcome.answer
    }
}

pub struct InventoryAssistant {
    agent: QueryAgent,
    exporter: InventoryExporter,
}

impl InventoryAssistant {
    pub fn new(agent: QueryAgent, exporter: InventoryExporter) -> Self {
        Self { agent, exporter }
    }

    /// Standard wiring: inventory tool, emergency supplies tool and an
    /// exporter over the same source.
    pub fn assemble(
        provider: Arc<dyn ModelProvider>,
        source: Arc<dyn InventorySource>,
        policy: Arc<dyn InterpretationPolicy>,
        settings: AgentSettings,
    ) -> Self {
        let agent = QueryAgent::new(provider, policy.as_ref())
            .with_tool(Arc::new(InventoryTool::new(source.clone(), policy.as_ref())))
            .with_tool(Arc::new(EmergencySuppliesTool::new(source.clone(), policy)))
            .with_settings(settings);
        Self::new(agent, InventoryExporter::new(source))
    }

    /// Build everything `config` describes: CSV source (cached when a TTL is
    /// set), rule table, completion backend.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let policy: Arc<dyn InterpretationPolicy> = match &config.rules_path {
            Some(path) => Arc::new(RuleTablePolicy::from_toml_file(path).await?),
            None => Arc::new(RuleTablePolicy::default()),
        };

        let csv = CsvInventorySource::new(&config.inventory_path);
        let source: Arc<dyn InventorySource> = match config.cache_ttl {
            Some(ttl) => Arc::new(CachedInventorySource::new(csv, ttl)),
            None => Arc::new(csv),
        };

        let provider = create_provider(config, policy.clone())?;
        let assistant = Self::assemble(provider, source, policy, AgentSettings::from_config(config));
        Ok(Self {
            exporter: assistant.exporter.with_file_name(config.export_file_name.clone()),
            agent: assistant.agent,
        })
    }

    pub fn agent(&self) -> &QueryAgent {
        &self.agent
    }

    pub fn exporter(&self) -> &InventoryExporter {
        &self.exporter
    }

    /// Run a turn, then prepare the export if the query asked for one.
    ///
    /// The export only runs once the turn has completed, and its failure
    /// never replaces the answer.
    pub async fn submit(&self, session: &mut SessionState, query: &str) -> Result<TurnResponse> {
        let outcome = self.agent.handle_query(session, query).await?;
        let export = if is_export_intent(query) {
            debug!("query asks for a download, preparing export");
            Some(self.exporter.prepare().await)
        } else {
            None
        };
        Ok(TurnResponse { outcome, export })
    }
}
