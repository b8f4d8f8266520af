//! Argument schemas advertised to the completion service.
//!
//! Inventory tools take at most a few string arguments (a location, an
//! emergency category), so only string and string-enum properties exist.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON Schema `object` describing a tool's arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentToolParameters {
    pub schema: Value,
}

impl AgentToolParameters {
    /// Tool called without arguments, such as the full inventory read.
    pub fn empty() -> Self {
        Self::object().build()
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder::default()
    }
}

/// Accumulates properties for [`AgentToolParameters`].
#[derive(Default)]
pub struct ParameterBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name.into(), json!({ "type": "string", "description": description.into() }), required)
    }

    /// String restricted to `values`, e.g. the emergency category names.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        self.property(
            name.into(),
            json!({ "type": "string", "description": description.into(), "enum": values }),
            required,
        )
    }

    fn property(mut self, name: String, schema: Value, required: bool) -> Self {
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
