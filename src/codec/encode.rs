//! Typed model to request document.

use super::document::{decimal_to_number, float_to_number};
use super::{AttributePath, CodecError, Document, DocumentMap, Model, Payload, Value};
use crate::schema::{Attribute, AttributeKind, ResourceSchema};
use serde_json::Number;
use std::collections::BTreeMap;

/// Encode a defaulted model as a request body.
///
/// Every declared attribute is emitted, null ones as explicit `null`. The one
/// exception is a computed-only attribute still unknown after defaulting: the
/// server assigns it, so it is left out. Any other unknown value is an
/// [`CodecError::UnresolvedValue`]; a model entry the schema does not declare
/// is a [`CodecError::SchemaMismatch`].
///
/// Floats go out in their shortest round-trip form and decimals digit for
/// digit.
pub fn model_to_any_map(schema: &ResourceSchema, model: &Model) -> Result<DocumentMap, CodecError> {
    encode_attributes(&schema.attributes, model.attributes(), &AttributePath::root())
}

fn encode_attributes(
    attributes: &[Attribute],
    values: &BTreeMap<String, Value>,
    path: &AttributePath,
) -> Result<DocumentMap, CodecError> {
    CodecError::check_declared(attributes, values, path)?;

    let mut out = DocumentMap::new();
    for attr in attributes {
        let value = values.get(&attr.name).unwrap_or(&Value::Null);
        if value.is_unknown() && attr.is_computed_only() {
            continue;
        }
        let encoded = encode_value(&attr.kind, value, &path.attribute(&attr.name))?;
        out.insert(attr.name.clone(), encoded);
    }
    Ok(out)
}

fn encode_value(kind: &AttributeKind, value: &Value, path: &AttributePath) -> Result<Document, CodecError> {
    let payload = match value {
        Value::Known(payload) => payload,
        Value::Null => return Ok(Document::Null),
        Value::Unknown => return Err(CodecError::UnresolvedValue { path: path.clone() }),
    };

    Ok(match (kind, payload) {
        (AttributeKind::String, Payload::String(s)) => Document::String(s.clone()),
        (AttributeKind::Bool, Payload::Bool(b)) => Document::Bool(*b),
        (AttributeKind::Int64, Payload::Int64(i)) => Document::Number(Number::from(*i)),
        (AttributeKind::Float64, Payload::Float64(f)) => {
            Document::Number(float_to_number(*f).ok_or_else(|| CodecError::TypeMismatch {
                path: path.clone(),
                expected: "number",
                found: format!("float64 {}", f),
            })?)
        }
        (AttributeKind::Number, Payload::Number(d)) => {
            Document::Number(decimal_to_number(d).ok_or_else(|| CodecError::TypeMismatch {
                path: path.clone(),
                expected: "number",
                found: format!("decimal {}", d),
            })?)
        }
        (AttributeKind::Object { attributes }, Payload::Object(children)) => {
            Document::Mapping(encode_attributes(attributes, children, path)?)
        }
        (AttributeKind::List { element }, Payload::List(items))
        | (AttributeKind::Set { element }, Payload::Set(items)) => Document::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| encode_value(element, item, &path.index(i)))
                .collect::<Result<_, _>>()?,
        ),
        (AttributeKind::Map { element }, Payload::Map(entries)) => Document::Mapping(
            entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), encode_value(element, item, &path.key(key))?)))
                .collect::<Result<_, CodecError>>()?,
        ),
        (AttributeKind::Tuple { elements }, Payload::Tuple(items)) => {
            if elements.len() != items.len() {
                return Err(CodecError::SchemaMismatch {
                    path: path.clone(),
                    expected: "tuple",
                    found: "tuple of different arity",
                });
            }
            Document::Sequence(
                elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (element, item))| encode_value(element, item, &path.index(i)))
                    .collect::<Result<_, _>>()?,
            )
        }
        (kind, payload) => return Err(CodecError::schema_mismatch(path, kind, payload)),
    })
}
