//! Deterministic, offline reasoner.
//!
//! Behaves like a completion service that always asks for the inventory tool
//! first, then answers from the rendered records with the interpretation
//! policy. Useful without credentials and for reproducible answers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{ModelProvider, ProviderRequest, ProviderResponse};
use crate::error::InventoryError;
use crate::interpret::{
    format_bullet, format_bullet_with_reason, wants_justification, EmergencyCategory, InterpretationPolicy,
};
use crate::inventory::render::parse_rendered;
use crate::inventory::InventoryRecord;
use crate::tools::inventory::{DATA_UNAVAILABLE_PREFIX, INVENTORY_TOOL_NAME};
use crate::types::{AgentToolCall, Role};

const FULL_LISTING_WORDS: &[&str] = &["all", "full", "every", "everything", "entire", "complete", "whole", "list"];

pub struct LocalProvider {
    policy: Arc<dyn InterpretationPolicy>,
}

impl LocalProvider {
    pub fn new(policy: Arc<dyn InterpretationPolicy>) -> Self {
        Self { policy }
    }

    /// Compose an answer for `query` from the records the tool returned.
    ///
    /// A location named in the query scopes every kind of answer. Words that
    /// belong to a material named in the query ("fire extinguisher") are not
    /// read as emergency triggers.
    pub fn answer(&self, query: &str, records: &[InventoryRecord]) -> String {
        let justify = wants_justification(query);
        let query_text = format!(" {} ", normalize(query));

        let by_location: Vec<&InventoryRecord> = records
            .iter()
            .filter(|r| query_text.contains(&format!(" {} ", normalize(&r.location))))
            .collect();
        let places = distinct_locations(&by_location);

        let mut residual = query_text.clone();
        let mut by_material: Vec<&InventoryRecord> = Vec::new();
        for record in records {
            let name = normalize(&record.material_name);
            if name.is_empty() {
                continue;
            }
            let needle = format!(" {name}");
            if query_text.contains(&needle) {
                residual = residual.replace(&needle, " ");
                by_material.push(record);
            }
        }

        if let Some(category) = self.policy.detect_category(&residual) {
            return self.emergency_answer(category, records, &places, justify);
        }

        if !by_material.is_empty() {
            if places.is_empty() {
                return listing("Matching items:", &by_material);
            }
            let here: Vec<&InventoryRecord> = by_material
                .into_iter()
                .filter(|r| places.contains(&r.location.as_str()))
                .collect();
            if here.is_empty() {
                return format!("None of the requested items are stored in {}.", places.join(", "));
            }
            return listing(&format!("Matching items in {}:", places.join(", ")), &here);
        }

        if !by_location.is_empty() {
            return listing(&format!("Items available in {}:", places.join(", ")), &by_location);
        }

        if query_text
            .split_whitespace()
            .any(|w| FULL_LISTING_WORDS.contains(&w))
        {
            let all: Vec<&InventoryRecord> = records.iter().collect();
            return listing("Full inventory:", &all);
        }

        "I could not find any inventory items matching your question.".to_string()
    }

    fn emergency_answer(
        &self,
        category: EmergencyCategory,
        records: &[InventoryRecord],
        places: &[&str],
        justify: bool,
    ) -> String {
        let mut selections = self.policy.select(category, records);
        if !places.is_empty() {
            selections.retain(|s| places.contains(&s.record.location.as_str()));
        }
        let scope = if places.is_empty() {
            String::new()
        } else {
            format!(" in {}", places.join(", "))
        };
        if selections.is_empty() {
            return format!("The inventory has no items{scope} that would help in a {}.", category.label());
        }

        let bullets: Vec<String> = selections
            .iter()
            .map(|s| {
                if justify {
                    format_bullet_with_reason(s.record, &s.reason)
                } else {
                    format_bullet(s.record)
                }
            })
            .collect();
        format!("Items{scope} useful for a {}:\n{}", category.label(), bullets.join("\n"))
    }
}

fn distinct_locations<'a>(records: &[&'a InventoryRecord]) -> Vec<&'a str> {
    let mut places: Vec<&str> = Vec::new();
    for r in records {
        if !places.contains(&r.location.as_str()) {
            places.push(&r.location);
        }
    }
    places
}

fn listing(header: &str, records: &[&InventoryRecord]) -> String {
    let bullets: Vec<String> = records.iter().map(|r| format_bullet(r)).collect();
    format!("{header}\n{}", bullets.join("\n"))
}

/// Lowercase, punctuation to spaces, whitespace collapsed.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ModelProvider for LocalProvider {
    fn provider_name(&self) -> &str {
        "local"
    }

    fn model_id(&self) -> &str {
        "rule-table"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, InventoryError> {
        let last_user = request
            .messages
            .iter()
            .rposition(|m| m.role == Role::User)
            .ok_or_else(|| InventoryError::InvalidArgument("request has no user message".into()))?;
        let query = request.messages[last_user].text_content();

        let tool_output = request.messages[last_user + 1..]
            .iter()
            .flat_map(|m| m.tool_results())
            .last()
            .map(|r| r.as_text());

        let Some(output) = tool_output else {
            if !request.tools.iter().any(|t| t.name == INVENTORY_TOOL_NAME) {
                return Ok(ProviderResponse::final_answer("No inventory tool is available."));
            }
            debug!("local reasoner requesting inventory");
            return Ok(ProviderResponse::tool_call(AgentToolCall {
                id: format!("local-{}", uuid::Uuid::new_v4()),
                name: INVENTORY_TOOL_NAME.to_string(),
                arguments: serde_json::json!({}),
            }));
        };

        if output.starts_with(DATA_UNAVAILABLE_PREFIX) {
            return Ok(ProviderResponse::final_answer(output));
        }
        let records = parse_rendered(&output);
        if records.is_empty() {
            return Ok(ProviderResponse::final_answer(output.trim()));
        }
        Ok(ProviderResponse::final_answer(self.answer(&query, &records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::RuleTablePolicy;
    use crate::provider::Completion;
    use crate::tools::ToolDescriptor;
    use crate::types::{GenerationSettings, ModelMessage};

    fn records() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("Round table", "Hallway", 12.0).with_unit("pcs"),
            InventoryRecord::new("Cold pack", "Shelf-1", 6.0).with_unit("box"),
            InventoryRecord::new("Flashlight", "Shelf-10", 4.0),
            InventoryRecord::new("Chairs", "Top Floor", 30.0),
        ]
    }

    fn provider() -> LocalProvider {
        LocalProvider::new(Arc::new(RuleTablePolicy::default()))
    }

    #[test]
    fn location_query_lists_only_that_location() {
        let answer = provider().answer("What are the materials available in shelf-1?", &records());
        assert_eq!(answer, "Items available in Shelf-1:\n\u{2022} Cold pack -- 6 -- box");
    }

    #[test]
    fn material_query_matches_plural() {
        let answer = provider().answer("How many Round tables are available with us?", &records());
        assert!(answer.contains("\u{2022} Round table -- 12 -- pcs"));
        assert_eq!(answer.lines().count(), 2);
    }

    #[test]
    fn emergency_query_expands_semantically() {
        let answer = provider().answer("What can we use in a power outage and why?", &records());
        assert!(answer.contains("Flashlight -- 4: provides light without power"));
        assert!(!answer.contains("Round table"));
    }

    #[test]
    fn unknown_query_does_not_fabricate() {
        let answer = provider().answer("Where are the kayaks?", &records());
        assert_eq!(answer, "I could not find any inventory items matching your question.");
    }

    fn facility() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("Fire extinguisher", "Hallway", 1.0),
            InventoryRecord::new("Chairs", "Hallway", 30.0).with_unit("pcs"),
            InventoryRecord::new("Fire extinguisher", "Top Floor", 2.0),
            InventoryRecord::new("Flashlight", "Shelf-10", 4.0),
            InventoryRecord::new("Sandbags", "Basement", 40.0),
            InventoryRecord::new("Mop", "Basement", 3.0),
            InventoryRecord::new("", "Storage", 9.0),
        ]
    }

    #[test]
    fn material_name_containing_trigger_word_is_a_literal_lookup() {
        let answer = provider().answer("Is there a fire extinguisher in the Hallway?", &facility());
        assert_eq!(answer, "Matching items in Hallway:\n\u{2022} Fire extinguisher -- 1");

        let answer = provider().answer("How many fire extinguishers do we have?", &facility());
        assert_eq!(
            answer,
            "Matching items:\n\u{2022} Fire extinguisher -- 1\n\u{2022} Fire extinguisher -- 2"
        );
    }

    #[test]
    fn emergency_query_is_scoped_to_named_location() {
        let answer = provider().answer("What flood supplies are in the Hallway?", &facility());
        assert_eq!(answer, "The inventory has no items in Hallway that would help in a flood.");

        let answer = provider().answer("What flood supplies are in the basement?", &facility());
        assert_eq!(
            answer,
            "Items in Basement useful for a flood:\n\u{2022} Sandbags -- 40\n\u{2022} Mop -- 3"
        );
    }

    #[test]
    fn requested_material_missing_from_location() {
        let answer = provider().answer("Do we keep a mop in the hallway?", &facility());
        assert_eq!(answer, "None of the requested items are stored in Hallway.");
    }

    #[test]
    fn nameless_records_never_match_a_material_query() {
        let answer = provider().answer("Where are the kayaks?", &facility());
        assert_eq!(answer, "I could not find any inventory items matching your question.");
    }

    #[tokio::test]
    async fn first_step_requests_inventory_tool() {
        let request = ProviderRequest {
            messages: vec![ModelMessage::user("items in hallway")],
            tools: vec![ToolDescriptor {
                name: INVENTORY_TOOL_NAME.into(),
                description: String::new(),
                parameters: serde_json::json!({}),
            }],
            settings: GenerationSettings::default(),
        };
        let response = provider().generate(&request).await.unwrap();
        match response.completion() {
            Completion::ToolInvocation { calls, .. } => assert_eq!(calls[0].name, INVENTORY_TOOL_NAME),
            other => panic!("expected tool invocation, got {other:?}"),
        }
    }
}
