//! Interpretation policy: how tool output is turned into an answer.
//!
//! The fuzzy part of answering, mapping an emergency such as "power outage"
//! to inventory items that help with it, lives behind
//! [`InterpretationPolicy`] so it can be tested without a language model.

pub mod format;
pub mod rules;

pub use format::{format_bullet, format_bullet_with_reason, normalize_line_breaks, wants_justification};
pub use rules::{Rule, RuleTablePolicy};

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::inventory::InventoryRecord;

/// Emergency contexts that trigger semantic expansion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmergencyCategory {
    Flood,
    Fire,
    Medical,
    PowerOutage,
    GeneralDisaster,
}

impl EmergencyCategory {
    /// Phrase used in prompts and answers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Fire => "fire emergency",
            Self::Medical => "medical emergency",
            Self::PowerOutage => "power outage",
            Self::GeneralDisaster => "general disaster preparedness",
        }
    }

    fn trigger(&self) -> &'static str {
        match self {
            Self::Flood => r"\bflood(s|ing|ed)?\b|\bwater damage\b|\bstorm surge\b",
            Self::Fire => r"\b(wild)?fires?\b|\bsmoke\b|\bburns?\b",
            Self::Medical => r"\bmedical\b|\binjur(y|ies|ed)\b|\bfirst[- ]aid\b|\bwound(s|ed)?\b|\bhealth\b",
            Self::PowerOutage => {
                r"\bpower (outage|cut|failure)s?\b|\boutages?\b|\bblackouts?\b|\bno power\b|\belectricity\b"
            }
            Self::GeneralDisaster => {
                r"\bdisasters?\b|\bpreparedness\b|\bemergenc(y|ies)\b|\bevacuat\w*|\bearthquakes?\b|\bstorms?\b"
            }
        }
    }
}

fn triggers() -> &'static [(EmergencyCategory, Regex)] {
    static TRIGGERS: OnceLock<Vec<(EmergencyCategory, Regex)>> = OnceLock::new();
    TRIGGERS.get_or_init(|| {
        EmergencyCategory::iter()
            .map(|c| {
                let pattern = format!("(?i){}", c.trigger());
                (c, Regex::new(&pattern).expect("built-in trigger pattern is valid"))
            })
            .collect()
    })
}

/// Find the emergency category a query refers to.
///
/// Specific categories win over general preparedness, so "medical emergency"
/// resolves to [`EmergencyCategory::Medical`].
pub fn detect_category(query: &str) -> Option<EmergencyCategory> {
    triggers()
        .iter()
        .find(|(_, re)| re.is_match(query))
        .map(|(c, _)| *c)
}

/// An inventory item chosen for an emergency, with the reason it helps.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub record: &'a InventoryRecord,
    pub reason: String,
}

/// Decides which records are relevant to a query and how answers read.
pub trait InterpretationPolicy: Send + Sync {
    /// Emergency category the query refers to, if any.
    fn detect_category(&self, query: &str) -> Option<EmergencyCategory> {
        detect_category(query)
    }

    /// Why `record` helps in `category`, or `None` when it does not.
    fn relevance(&self, category: EmergencyCategory, record: &InventoryRecord) -> Option<String>;

    /// Guidance text handed to the reasoning layer with the tool description.
    fn guidance(&self) -> String;

    /// Every record relevant to `category`, in inventory order.
    fn select<'a>(&self, category: EmergencyCategory, records: &'a [InventoryRecord]) -> Vec<Selection<'a>> {
        records
            .iter()
            .filter_map(|record| {
                self.relevance(category, record)
                    .map(|reason| Selection { record, reason })
            })
            .collect()
    }
}
