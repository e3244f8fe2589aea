use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single priced line of a resource.
///
/// Only `name` is interpreted; every other key is carried along untouched and
/// serialised back in its original order. A component whose `name` is missing
/// or not a string never matches the golden report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostComponent {
    pub fields: Map<String, Value>,
}

impl CostComponent {
    /// Creates a component holding only a name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        Self { fields }
    }

    /// Adds or replaces a payload key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Component name, matched case-sensitively against the golden report.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// A resource as stored in the JSON fixtures. Sub-resources share the same
/// shape, so the type is recursive even though only one level is ever
/// produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub cost_components: Vec<CostComponent>,
    #[serde(default)]
    pub sub_resources: Vec<Resource>,
}

impl Resource {
    /// Creates a resource without components or sub-resources.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost_components: Vec::new(),
            sub_resources: Vec::new(),
        }
    }
}

/// Expected grouping of a single sub-resource in the golden report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubResourceSchema {
    pub name: String,
    pub cost_components: Vec<String>,
}

impl SubResourceSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost_components: Vec::new(),
        }
    }
}

/// Authoritative layout of one resource as extracted from a golden report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    /// Component names listed directly under the resource, in report order.
    pub cost_components: Vec<String>,
    /// Sub-resources in report order, each with its own component names.
    pub sub_resources: Vec<SubResourceSchema>,
}

impl ResourceSchema {
    /// Returns `true` when the report listed nothing under the resource.
    pub fn is_empty(&self) -> bool {
        self.cost_components.is_empty() && self.sub_resources.is_empty()
    }
}

/// Resource name → expected layout.
pub type SchemaSet = BTreeMap<String, ResourceSchema>;
