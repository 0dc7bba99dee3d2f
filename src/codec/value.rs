//! Typed value tree
//!
//! A [`Model`] holds the top-level attributes of one resource instance. Each
//! node is a [`Value`]: known, null, or unknown (a plan-time placeholder the
//! host has not resolved yet).

use rust_decimal::Decimal;
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

/// One node of a typed model
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Known(Payload),
    Null,
    Unknown,
}

/// Contents of a known node
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    String(String),
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Number(Decimal),
    Object(BTreeMap<String, Value>),
    List(Vec<Value>),
    /// Members in stored order
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Tuple(Vec<Value>),
}

impl Payload {
    /// Name used in diagnostics, matching `AttributeKind::name`
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::String(_) => "string",
            Payload::Bool(_) => "bool",
            Payload::Int64(_) => "int64",
            Payload::Float64(_) => "float64",
            Payload::Number(_) => "number",
            Payload::Object(_) => "object",
            Payload::List(_) => "list",
            Payload::Set(_) => "set",
            Payload::Map(_) => "map",
            Payload::Tuple(_) => "tuple",
        }
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Known(Payload::String(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Value::Known(Payload::Bool(b))
    }

    pub fn int64(i: i64) -> Self {
        Value::Known(Payload::Int64(i))
    }

    pub fn float64(f: f64) -> Self {
        Value::Known(Payload::Float64(f))
    }

    pub fn number(d: Decimal) -> Self {
        Value::Known(Payload::Number(d))
    }

    pub fn object<K: Into<String>>(children: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Known(Payload::Object(
            children.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Known(Payload::List(items.into_iter().collect()))
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Known(Payload::Set(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Known(Payload::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Known(Payload::Tuple(items.into_iter().collect()))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Child of a known object
    pub fn child(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Known(Payload::Object(children)) => children.get(name),
            _ => None,
        }
    }
}

/// Top-level attributes of one resource instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    attributes: BTreeMap<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attribute value, with absent attributes reading as null
    pub fn value(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    /// Follow a dotted path such as `metadata.name` through known objects
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.attributes.get(first)?, |current, part| current.child(part))
    }

    /// Set a value at a dotted path, turning null or unknown parents into
    /// objects along the way. Returns false when a parent holds a non-object.
    pub fn set_path(&mut self, path: &str, value: Value) -> bool {
        let parts: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            return false;
        };

        let mut children = &mut self.attributes;
        for part in parents {
            let slot = children.entry(part.to_string()).or_insert(Value::Null);
            if !slot.is_known() {
                *slot = Value::Known(Payload::Object(BTreeMap::new()));
            }
            children = match slot {
                Value::Known(Payload::Object(next)) => next,
                _ => return false,
            };
        }
        children.insert(last.to_string(), value);
        true
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.attributes
    }
}

/// Raw string of a known string node, or an empty string for anything else.
///
/// Used for URL path segments; callers must reject the empty result where the
/// segment is required.
pub fn string_value(value: &Value) -> String {
    match value {
        Value::Known(Payload::String(s)) => s.clone(),
        _ => String::new(),
    }
}
