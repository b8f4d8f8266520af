//! Rule-table implementation of [`InterpretationPolicy`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::{EmergencyCategory, InterpretationPolicy};
use crate::error::{InventoryError, Result};
use crate::inventory::InventoryRecord;

/// One keyword that marks a material as relevant, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub keyword: String,
    pub reason: String,
}

impl Rule {
    pub fn new(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            reason: reason.into(),
        }
    }

    /// Keyword occurs in `name` as a whole word, optionally pluralized
    /// with `s` or `es`.
    fn matches(&self, name: &str) -> bool {
        if self.keyword.is_empty() {
            return false;
        }
        let name = name.to_lowercase();
        let boundary = |text: &str| text.chars().next().map_or(true, |c| !c.is_alphanumeric());
        name.match_indices(self.keyword.as_str()).any(|(idx, kw)| {
            let starts_word = name[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let rest = &name[idx + kw.len()..];
            starts_word
                && [Some(rest), rest.strip_prefix('s'), rest.strip_prefix("es")]
                    .into_iter()
                    .flatten()
                    .any(boundary)
        })
    }
}

const DEFAULT_RULES: &[(EmergencyCategory, &str, &str)] = &[
    (EmergencyCategory::Flood, "sandbag", "holds back rising water"),
    (EmergencyCategory::Flood, "pump", "removes standing water"),
    (EmergencyCategory::Flood, "wet vac", "removes standing water"),
    (EmergencyCategory::Flood, "mop", "cleans up after water recedes"),
    (EmergencyCategory::Flood, "bucket", "bails and carries water"),
    (EmergencyCategory::Flood, "towel", "soaks up water"),
    (EmergencyCategory::Flood, "tarp", "covers and protects exposed items"),
    (EmergencyCategory::Flood, "plastic sheet", "covers and protects exposed items"),
    (EmergencyCategory::Flood, "boot", "keeps feet dry in standing water"),
    (EmergencyCategory::Flood, "bleach", "disinfects surfaces after flooding"),
    (EmergencyCategory::Flood, "cleaning", "cleans up flood aftermath"),
    (EmergencyCategory::Flood, "cleaner", "cleans up flood aftermath"),
    (EmergencyCategory::Flood, "disinfectant", "disinfects surfaces after flooding"),
    (EmergencyCategory::Flood, "dehumidifier", "dries out damp rooms"),
    (EmergencyCategory::Flood, "trash bag", "clears damaged debris"),
    (EmergencyCategory::Flood, "garbage bag", "clears damaged debris"),
    (EmergencyCategory::Flood, "glove", "protects hands during cleanup"),
    (EmergencyCategory::Fire, "extinguisher", "puts out small fires"),
    (EmergencyCategory::Fire, "fire blanket", "smothers small fires"),
    (EmergencyCategory::Fire, "smoke", "detects or protects against smoke"),
    (EmergencyCategory::Fire, "mask", "filters smoke while evacuating"),
    (EmergencyCategory::Fire, "first aid", "treats burns and minor injuries"),
    (EmergencyCategory::Fire, "burn", "treats burns"),
    (EmergencyCategory::Fire, "hose", "delivers water to a fire"),
    (EmergencyCategory::Fire, "bucket", "carries water or sand"),
    (EmergencyCategory::Fire, "sand", "smothers small fires"),
    (EmergencyCategory::Fire, "goggle", "protects eyes from smoke"),
    (EmergencyCategory::Fire, "flashlight", "lights escape routes through smoke"),
    (EmergencyCategory::Medical, "first aid", "first response for injuries"),
    (EmergencyCategory::Medical, "cold pack", "reduces swelling from injuries"),
    (EmergencyCategory::Medical, "ice pack", "reduces swelling from injuries"),
    (EmergencyCategory::Medical, "bandage", "covers wounds"),
    (EmergencyCategory::Medical, "band-aid", "covers small cuts"),
    (EmergencyCategory::Medical, "gauze", "dresses wounds"),
    (EmergencyCategory::Medical, "antiseptic", "cleans wounds"),
    (EmergencyCategory::Medical, "glove", "protects responders from contamination"),
    (EmergencyCategory::Medical, "aed", "restarts the heart in cardiac arrest"),
    (EmergencyCategory::Medical, "defibrillator", "restarts the heart in cardiac arrest"),
    (EmergencyCategory::Medical, "stretcher", "moves injured people"),
    (EmergencyCategory::Medical, "splint", "immobilizes fractures"),
    (EmergencyCategory::Medical, "thermometer", "checks for fever"),
    (EmergencyCategory::Medical, "sanitizer", "keeps hands clean while treating people"),
    (EmergencyCategory::Medical, "wipes", "cleans hands and small wounds"),
    (EmergencyCategory::Medical, "mask", "limits spread of infection"),
    (EmergencyCategory::Medical, "blanket", "keeps patients warm and prevents shock"),
    (EmergencyCategory::PowerOutage, "flashlight", "provides light without power"),
    (EmergencyCategory::PowerOutage, "torch", "provides light without power"),
    (EmergencyCategory::PowerOutage, "headlamp", "hands-free light without power"),
    (EmergencyCategory::PowerOutage, "lantern", "lights a room without power"),
    (EmergencyCategory::PowerOutage, "candle", "light source without power"),
    (EmergencyCategory::PowerOutage, "battery", "powers lights and radios"),
    (EmergencyCategory::PowerOutage, "batteries", "powers lights and radios"),
    (EmergencyCategory::PowerOutage, "generator", "supplies backup power"),
    (EmergencyCategory::PowerOutage, "power bank", "charges phones"),
    (EmergencyCategory::PowerOutage, "extension cord", "distributes backup power"),
    (EmergencyCategory::PowerOutage, "radio", "receives news without power"),
    (EmergencyCategory::PowerOutage, "match", "lights candles and lanterns"),
    (EmergencyCategory::PowerOutage, "lighter", "lights candles and lanterns"),
    (EmergencyCategory::PowerOutage, "blanket", "keeps people warm without heating"),
    (EmergencyCategory::GeneralDisaster, "first aid", "treats injuries"),
    (EmergencyCategory::GeneralDisaster, "water", "drinking water supply"),
    (EmergencyCategory::GeneralDisaster, "blanket", "keeps people warm"),
    (EmergencyCategory::GeneralDisaster, "flashlight", "provides light"),
    (EmergencyCategory::GeneralDisaster, "battery", "powers emergency devices"),
    (EmergencyCategory::GeneralDisaster, "batteries", "powers emergency devices"),
    (EmergencyCategory::GeneralDisaster, "radio", "receives emergency broadcasts"),
    (EmergencyCategory::GeneralDisaster, "whistle", "signals for help"),
    (EmergencyCategory::GeneralDisaster, "tarp", "makes temporary shelter"),
    (EmergencyCategory::GeneralDisaster, "rope", "secures shelter and gear"),
    (EmergencyCategory::GeneralDisaster, "duct tape", "makes quick repairs"),
    (EmergencyCategory::GeneralDisaster, "tool kit", "makes quick repairs"),
    (EmergencyCategory::GeneralDisaster, "toolkit", "makes quick repairs"),
    (EmergencyCategory::GeneralDisaster, "food", "emergency food supply"),
    (EmergencyCategory::GeneralDisaster, "canned", "emergency food supply"),
    (EmergencyCategory::GeneralDisaster, "extinguisher", "puts out small fires"),
    (EmergencyCategory::GeneralDisaster, "generator", "supplies backup power"),
];

/// Keyword table per emergency category.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTablePolicy {
    rules: BTreeMap<EmergencyCategory, Vec<Rule>>,
}

impl Default for RuleTablePolicy {
    fn default() -> Self {
        let mut rules: BTreeMap<EmergencyCategory, Vec<Rule>> = BTreeMap::new();
        for (category, keyword, reason) in DEFAULT_RULES {
            rules.entry(*category).or_default().push(Rule::new(*keyword, *reason));
        }
        Self { rules }
    }
}

impl RuleTablePolicy {
    pub fn new(rules: BTreeMap<EmergencyCategory, Vec<Rule>>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(c, list)| (c, list.into_iter().map(|r| Rule::new(r.keyword, r.reason)).collect()))
            .collect();
        Self { rules }
    }

    /// Load a table from TOML, one array of tables per category:
    ///
    /// ```toml
    /// [[flood]]
    /// keyword = "sandbag"
    /// reason = "holds back rising water"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let rules: BTreeMap<EmergencyCategory, Vec<Rule>> = toml::from_str(text)
            .map_err(|e| InventoryError::Configuration(format!("invalid rule table: {e}")))?;
        Ok(Self::new(rules))
    }

    pub async fn from_toml_file(path: &std::path::Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&text)
    }

    pub fn rules(&self, category: EmergencyCategory) -> &[Rule] {
        self.rules.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl InterpretationPolicy for RuleTablePolicy {
    fn relevance(&self, category: EmergencyCategory, record: &InventoryRecord) -> Option<String> {
        self.rules(category)
            .iter()
            .find(|rule| rule.matches(&record.material_name))
            .map(|rule| rule.reason.clone())
    }

    fn guidance(&self) -> String {
        let mut text = String::from(
            "When the user asks about available items or materials at a particular location, follow these rules:\n\
             1. For a general question, answer with a bullet list, one material per line:\n\
             \u{2022} Material Name -- Quantity -- Unit (leave out the unit when there is none)\n\
             2. When the user asks for materials relevant to an emergency situation \
             (floods, fire emergencies, medical emergencies, power outages, general disaster preparedness), \
             analyze the inventory and list the items that would be useful in that context \
             even when they are not named after it. For example:\n",
        );
        for category in EmergencyCategory::iter() {
            let examples: Vec<&str> = self
                .rules(category)
                .iter()
                .take(4)
                .map(|r| r.keyword.as_str())
                .collect();
            if !examples.is_empty() {
                text.push_str(&format!("   - {}: {}\n", category.label(), examples.join(", ")));
            }
        }
        text.push_str(
            "Only include items that are actually listed in the inventory.\n\
             If the user asks why an item is useful, add a short explanation after each bullet.\n\
             Use the same bullet format in every case.",
        );
        text
    }
}
