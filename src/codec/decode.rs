//! Response document into typed model.
//!
//! Decoding merges: a key missing from the response leaves the model's prior
//! value in place, which is how server-assigned fields land next to the
//! client's planned ones.

use super::document::{parse_decimal, parse_f64};
use super::{AttributePath, CodecError, Document, DocumentMap, Model, Payload, Value};
use crate::schema::{Attribute, AttributeKind, ResourceSchema};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// Merge an API response into `model`.
///
/// Every declared attribute is visited once; those absent from the model and
/// the response end up null. On error the model is left untouched.
pub fn any_map_to_model(
    schema: &ResourceSchema,
    document: &DocumentMap,
    model: &mut Model,
) -> Result<(), CodecError> {
    let mut merged = model.clone();
    decode_attributes(
        &schema.attributes,
        document,
        merged.attributes_mut(),
        &AttributePath::root(),
    )?;
    *model = merged;
    Ok(())
}

fn decode_attributes(
    attributes: &[Attribute],
    document: &DocumentMap,
    target: &mut BTreeMap<String, Value>,
    path: &AttributePath,
) -> Result<(), CodecError> {
    for attr in attributes {
        let slot = target.entry(attr.name.clone()).or_insert(Value::Null);
        if let Some(node) = document.get(&attr.name) {
            decode_value(
                &attr.kind,
                node,
                slot,
                attr.string_encoded,
                &path.attribute(&attr.name),
            )?;
        }
    }
    Ok(())
}

/// Decode `node` into `slot`. `lenient` allows string-encoded scalars and
/// carries into collection elements, not into object children.
fn decode_value(
    kind: &AttributeKind,
    node: &Document,
    slot: &mut Value,
    lenient: bool,
    path: &AttributePath,
) -> Result<(), CodecError> {
    if let Document::Null = node {
        *slot = Value::Null;
        return Ok(());
    }

    match kind {
        AttributeKind::String => {
            *slot = Value::string(decode_string(kind, node, path)?);
        }
        AttributeKind::Bool => {
            *slot = Value::bool(decode_bool(kind, node, lenient, path)?);
        }
        AttributeKind::Int64 => {
            let text = decode_numeric(kind, node, lenient, path)?;
            let i = match text.parse::<i64>() {
                Ok(i) => i,
                Err(_) => {
                    let d = parse_decimal(&text).ok_or_else(|| {
                        CodecError::type_mismatch(path, kind, format!("number {}", text))
                    })?;
                    if !d.fract().is_zero() {
                        return Err(CodecError::type_mismatch(path, kind, format!("fractional number {}", text)));
                    }
                    d.to_i64().ok_or_else(|| {
                        CodecError::type_mismatch(path, kind, format!("out-of-range number {}", text))
                    })?
                }
            };
            *slot = Value::int64(i);
        }
        AttributeKind::Float64 => {
            let text = decode_numeric(kind, node, lenient, path)?;
            let f = parse_f64(&text)
                .ok_or_else(|| CodecError::type_mismatch(path, kind, format!("number {}", text)))?;
            *slot = Value::float64(f);
        }
        AttributeKind::Number => {
            let text = decode_numeric(kind, node, lenient, path)?;
            let d = parse_decimal(&text).ok_or_else(|| {
                CodecError::type_mismatch(path, kind, format!("inexact number {}", text))
            })?;
            *slot = Value::number(d);
        }
        AttributeKind::Object { attributes } => {
            let Document::Mapping(entries) = node else {
                return Err(CodecError::structural_mismatch(path, "mapping", node));
            };
            let children = known_object(kind, slot, path)?;
            decode_attributes(attributes, entries, children, path)?;
        }
        AttributeKind::List { element } => {
            let Document::Sequence(items) = node else {
                return Err(CodecError::structural_mismatch(path, "sequence", node));
            };
            let prior = match prior_payload(kind, slot, path)? {
                Some(Payload::List(prior)) => prior,
                _ => Vec::new(),
            };
            *slot = Value::Known(Payload::List(decode_sequence(element, items, prior, lenient, path)?));
        }
        AttributeKind::Set { element } => {
            let Document::Sequence(items) = node else {
                return Err(CodecError::structural_mismatch(path, "sequence", node));
            };
            // set members have no identity to merge by
            prior_payload(kind, slot, path)?;
            *slot = Value::Known(Payload::Set(decode_sequence(
                element,
                items,
                Vec::new(),
                lenient,
                path,
            )?));
        }
        AttributeKind::Map { element } => {
            let Document::Mapping(entries) = node else {
                return Err(CodecError::structural_mismatch(path, "mapping", node));
            };
            let mut prior = match prior_payload(kind, slot, path)? {
                Some(Payload::Map(prior)) => prior,
                _ => BTreeMap::new(),
            };
            let mut decoded = BTreeMap::new();
            for (key, entry) in entries {
                let mut value = prior.remove(key).unwrap_or(Value::Null);
                decode_value(element, entry, &mut value, lenient, &path.key(key))?;
                decoded.insert(key.clone(), value);
            }
            *slot = Value::Known(Payload::Map(decoded));
        }
        AttributeKind::Tuple { elements } => {
            let Document::Sequence(items) = node else {
                return Err(CodecError::structural_mismatch(path, "sequence", node));
            };
            if items.len() != elements.len() {
                return Err(CodecError::StructuralMismatch {
                    path: path.clone(),
                    expected: format!("sequence of {}", elements.len()),
                    found: format!("sequence of {}", items.len()),
                });
            }
            let mut prior = match prior_payload(kind, slot, path)? {
                Some(Payload::Tuple(prior)) => prior,
                _ => Vec::new(),
            }
            .into_iter();
            let mut decoded = Vec::with_capacity(items.len());
            for (i, (element, item)) in elements.iter().zip(items).enumerate() {
                let mut value = prior.next().unwrap_or(Value::Null);
                decode_value(element, item, &mut value, lenient, &path.index(i))?;
                decoded.push(value);
            }
            *slot = Value::Known(Payload::Tuple(decoded));
        }
    }
    Ok(())
}

fn decode_sequence(
    element: &AttributeKind,
    items: &[Document],
    prior: Vec<Value>,
    lenient: bool,
    path: &AttributePath,
) -> Result<Vec<Value>, CodecError> {
    let mut prior = prior.into_iter();
    let mut decoded = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let mut value = prior.next().unwrap_or(Value::Null);
        decode_value(element, item, &mut value, lenient, &path.index(i))?;
        decoded.push(value);
    }
    Ok(decoded)
}

/// Take the slot's known payload, checking it matches `kind`
fn prior_payload(
    kind: &AttributeKind,
    slot: &mut Value,
    path: &AttributePath,
) -> Result<Option<Payload>, CodecError> {
    match std::mem::replace(slot, Value::Null) {
        Value::Known(payload) => {
            if payload.kind_name() != kind.name() {
                let err = CodecError::schema_mismatch(path, kind, &payload);
                *slot = Value::Known(payload);
                return Err(err);
            }
            Ok(Some(payload))
        }
        _ => Ok(None),
    }
}

/// The slot's object children, starting an empty object when it held none
fn known_object<'a>(
    kind: &AttributeKind,
    slot: &'a mut Value,
    path: &AttributePath,
) -> Result<&'a mut BTreeMap<String, Value>, CodecError> {
    if !slot.is_known() {
        *slot = Value::Known(Payload::Object(BTreeMap::new()));
    }
    match slot {
        Value::Known(Payload::Object(children)) => Ok(children),
        Value::Known(other) => Err(CodecError::schema_mismatch(path, kind, other)),
        _ => Err(CodecError::SchemaMismatch {
            path: path.clone(),
            expected: kind.name(),
            found: "null",
        }),
    }
}

fn decode_string(kind: &AttributeKind, node: &Document, path: &AttributePath) -> Result<String, CodecError> {
    match node {
        Document::String(s) => Ok(s.clone()),
        Document::Sequence(_) | Document::Mapping(_) => {
            Err(CodecError::structural_mismatch(path, "string", node))
        }
        other => Err(CodecError::type_mismatch(path, kind, other.kind_name())),
    }
}

fn decode_bool(
    kind: &AttributeKind,
    node: &Document,
    lenient: bool,
    path: &AttributePath,
) -> Result<bool, CodecError> {
    match node {
        Document::Bool(b) => Ok(*b),
        Document::String(s) if lenient => s
            .parse::<bool>()
            .map_err(|_| CodecError::type_mismatch(path, kind, format!("string {:?}", s))),
        Document::Sequence(_) | Document::Mapping(_) => {
            Err(CodecError::structural_mismatch(path, "bool", node))
        }
        other => Err(CodecError::type_mismatch(path, kind, other.kind_name())),
    }
}

/// Numeric text of a number node, or of a string when `lenient`
fn decode_numeric(
    kind: &AttributeKind,
    node: &Document,
    lenient: bool,
    path: &AttributePath,
) -> Result<String, CodecError> {
    match node {
        Document::Number(n) => Ok(n.to_string()),
        Document::String(s) if lenient => {
            let text = s.trim();
            if parse_f64(text).is_none() {
                return Err(CodecError::type_mismatch(path, kind, format!("string {:?}", s)));
            }
            Ok(text.to_string())
        }
        Document::Sequence(_) | Document::Mapping(_) => {
            Err(CodecError::structural_mismatch(path, "number", node))
        }
        other => Err(CodecError::type_mismatch(path, kind, other.kind_name())),
    }
}
