//! Attribute schemas
//!
//! Every resource and data source is described by a [`ResourceSchema`]: a tree
//! of [`Attribute`] definitions that the codec walks to convert between typed
//! models and API documents. Schemas are plain data, deserialized from JSON
//! files embedded in the binary and served by the [`registry`].
//!
//! # JSON form
//!
//! ```json
//! {
//!   "name": "ipAddresses",
//!   "type": "list",
//!   "optional": true,
//!   "element": {
//!     "type": "object",
//!     "attributes": [{ "name": "node", "type": "string", "optional": true }]
//!   }
//! }
//! ```

mod registry;

pub use registry::*;

use crate::codec::{AttributePath, Model, Value};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Shape of an attribute
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    Int64,
    Float64,
    /// Arbitrary-precision decimal
    Number,
    Object {
        attributes: Vec<Attribute>,
    },
    List {
        element: Box<AttributeKind>,
    },
    Set {
        element: Box<AttributeKind>,
    },
    /// String-keyed map with a single element type
    Map {
        element: Box<AttributeKind>,
    },
    Tuple {
        elements: Vec<AttributeKind>,
    },
}

impl AttributeKind {
    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Bool => "bool",
            AttributeKind::Int64 => "int64",
            AttributeKind::Float64 => "float64",
            AttributeKind::Number => "number",
            AttributeKind::Object { .. } => "object",
            AttributeKind::List { .. } => "list",
            AttributeKind::Set { .. } => "set",
            AttributeKind::Map { .. } => "map",
            AttributeKind::Tuple { .. } => "tuple",
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            AttributeKind::String
                | AttributeKind::Bool
                | AttributeKind::Int64
                | AttributeKind::Float64
                | AttributeKind::Number
        )
    }
}

/// A named attribute with its shape and plan-time flags
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(flatten)]
    pub kind: AttributeKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    /// Default literal applied by the host at plan time
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Accept numbers and booleans sent by the API as strings
    #[serde(default)]
    pub string_encoded: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl Attribute {
    pub fn new(name: &str, kind: AttributeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            optional: true,
            computed: false,
            default: None,
            string_encoded: false,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Mark as assigned by the server only
    pub fn computed_only(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn string_encoded(mut self) -> Self {
        self.string_encoded = true;
        self
    }

    /// Server-assigned with nothing the client could supply
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required && self.default.is_none()
    }
}

/// Whether a schema describes a managed resource or a read-only lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Resource,
    DataSource,
}

/// REST path templates, with `{namespace}` and `{name}` placeholders
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPaths {
    #[serde(default)]
    pub create: Option<String>,
    pub read: String,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

/// Dotted model paths holding the object's namespace and name
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub namespace: String,
    pub name: String,
}

/// Complete description of one resource type
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSchema {
    pub type_name: String,
    pub kind: SchemaKind,
    #[serde(default)]
    pub description: Option<String>,
    pub api: ApiPaths,
    pub identity: Identity,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate attribute {path}")]
    DuplicateAttribute { path: AttributePath },
    #[error("tuple at {path} declares no elements")]
    EmptyTuple { path: AttributePath },
}

impl ResourceSchema {
    /// Check structural invariants of the attribute tree
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_attributes(&self.attributes, &AttributePath::root())
    }

    /// Top-level attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Model with every top-level attribute null
    pub fn null_model(&self) -> Model {
        self.model_with(Value::Null)
    }

    /// Model with every top-level attribute unknown, as planned before any
    /// value is supplied
    pub fn unknown_model(&self) -> Model {
        self.model_with(Value::Unknown)
    }

    /// Insert `default` literals for attributes missing from a plan
    /// document, descending into nested objects and object collections
    pub fn apply_defaults(&self, document: &mut serde_json::Value) {
        if let serde_json::Value::Object(entries) = document {
            apply_attribute_defaults(&self.attributes, entries);
        }
    }

    fn model_with(&self, value: Value) -> Model {
        self.attributes
            .iter()
            .fold(Model::new(), |model, attr| model.with(&attr.name, value.clone()))
    }
}

fn apply_attribute_defaults(
    attributes: &[Attribute],
    entries: &mut serde_json::Map<String, serde_json::Value>,
) {
    for attr in attributes {
        match entries.get_mut(&attr.name) {
            Some(node) => apply_kind_defaults(&attr.kind, node),
            None => {
                if let Some(default) = &attr.default {
                    entries.insert(attr.name.clone(), default.clone());
                }
            }
        }
    }
}

fn apply_kind_defaults(kind: &AttributeKind, node: &mut serde_json::Value) {
    match (kind, node) {
        (AttributeKind::Object { attributes }, serde_json::Value::Object(entries)) => {
            apply_attribute_defaults(attributes, entries)
        }
        (
            AttributeKind::List { element } | AttributeKind::Set { element },
            serde_json::Value::Array(items),
        ) => items
            .iter_mut()
            .for_each(|item| apply_kind_defaults(element, item)),
        (AttributeKind::Map { element }, serde_json::Value::Object(entries)) => entries
            .values_mut()
            .for_each(|item| apply_kind_defaults(element, item)),
        _ => {}
    }
}

fn validate_attributes(attributes: &[Attribute], path: &AttributePath) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for attr in attributes {
        let attr_path = path.attribute(&attr.name);
        if !seen.insert(attr.name.as_str()) {
            return Err(SchemaError::DuplicateAttribute { path: attr_path });
        }
        validate_kind(&attr.kind, &attr_path)?;
    }
    Ok(())
}

fn validate_kind(kind: &AttributeKind, path: &AttributePath) -> Result<(), SchemaError> {
    match kind {
        AttributeKind::Object { attributes } => validate_attributes(attributes, path),
        AttributeKind::List { element }
        | AttributeKind::Set { element }
        | AttributeKind::Map { element } => validate_kind(element, &path.index(0)),
        AttributeKind::Tuple { elements } => {
            if elements.is_empty() {
                return Err(SchemaError::EmptyTuple { path: path.clone() });
            }
            elements
                .iter()
                .enumerate()
                .try_for_each(|(i, element)| validate_kind(element, &path.index(i)))
        }
        _ => Ok(()),
    }
}
