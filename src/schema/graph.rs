//! Schema graph parsing and lookup
//!
//! The YAML file lists nodes with lowercase keys:
//!
//! ```yaml
//! didgraph:
//!   - key: "c4a0e0f6-9a2b-4c61-8e41-2f6d2b0c9a11"
//!     mime: "application/datau+node"
//!     description: "Passport"
//!     children: ["5b1f...", "9e2d..."]
//! ```
//!
//! The definition is served back to browsers unchanged, with the
//! capitalised field names the frontend expects.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ItemId;

/// Errors loading the schema definition. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema definition: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("node '{node}' has invalid identifier '{value}'")]
    InvalidIdentifier { node: String, value: String },
}

/// Root of the schema definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(rename(serialize = "Didgraph", deserialize = "didgraph"), default)]
    pub nodes: Vec<SchemaNode>,
}

/// A single node of the schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename(serialize = "Key", deserialize = "key"))]
    pub key: String,
    #[serde(rename(serialize = "Mime", deserialize = "mime"), default)]
    pub mime: String,
    #[serde(
        rename(serialize = "Description", deserialize = "description"),
        default
    )]
    pub description: String,
    #[serde(rename(serialize = "Children", deserialize = "children"), default)]
    pub children: Vec<String>,
}

/// Read-only adjacency map: identifier -> ordered children
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    definition: SchemaDefinition,
    children: HashMap<ItemId, Vec<ItemId>>,
}

impl SchemaGraph {
    /// Load the definition from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load the definition from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        let definition: SchemaDefinition = serde_yaml::from_str(content)?;
        Self::from_definition(definition)
    }

    /// Index a parsed definition. Repeated keys append their children.
    pub fn from_definition(definition: SchemaDefinition) -> Result<Self, SchemaError> {
        let mut children: HashMap<ItemId, Vec<ItemId>> = HashMap::new();

        for node in &definition.nodes {
            let key = parse_identifier(&node.key, &node.key)?;
            let entry = children.entry(key).or_default();
            for child in &node.children {
                entry.push(parse_identifier(&node.key, child)?);
            }
        }

        Ok(Self {
            definition,
            children,
        })
    }

    /// Declared children of `id`, empty when unknown.
    pub fn children(&self, id: &ItemId) -> &[ItemId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The definition exactly as loaded
    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn parse_identifier(node: &str, value: &str) -> Result<ItemId, SchemaError> {
    Uuid::parse_str(value.trim())
        .map(ItemId::from_uuid)
        .map_err(|_| SchemaError::InvalidIdentifier {
            node: node.to_string(),
            value: value.to_string(),
        })
}
