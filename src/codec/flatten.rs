//! Typed model to query parameters.

use super::{AttributePath, CodecError, Model, Payload, Value};
use crate::schema::{AttributeKind, ResourceSchema};
use std::collections::BTreeMap;

/// Project a model's top-level known primitives into query parameters.
///
/// Null and unknown attributes are left out entirely, never sent as empty
/// strings. Only top-level attributes are considered and keys are the
/// attribute names unchanged. A known composite attribute has no query form
/// and fails with [`CodecError::UnsupportedForQuery`].
///
/// Rendering: strings as-is, booleans as `true`/`false`, integers in decimal,
/// floats in their shortest round-trip form, decimals exactly. NaN and
/// infinities are rejected as they are by encoding.
pub fn model_to_string_map(
    schema: &ResourceSchema,
    model: &Model,
) -> Result<BTreeMap<String, String>, CodecError> {
    CodecError::check_declared(&schema.attributes, model.attributes(), &AttributePath::root())?;

    let mut params = BTreeMap::new();

    for attr in &schema.attributes {
        let Value::Known(payload) = model.value(&attr.name) else {
            continue;
        };
        let path = AttributePath::root().attribute(&attr.name);

        let rendered = match (&attr.kind, payload) {
            (AttributeKind::String, Payload::String(s)) => s.clone(),
            (AttributeKind::Bool, Payload::Bool(b)) => b.to_string(),
            (AttributeKind::Int64, Payload::Int64(i)) => i.to_string(),
            (AttributeKind::Float64, Payload::Float64(f)) if f.is_finite() => f.to_string(),
            (AttributeKind::Float64, Payload::Float64(f)) => {
                return Err(CodecError::TypeMismatch {
                    path,
                    expected: "number",
                    found: format!("float64 {}", f),
                })
            }
            (AttributeKind::Number, Payload::Number(d)) => d.to_string(),
            (kind, _) if !kind.is_primitive() => {
                return Err(CodecError::UnsupportedForQuery {
                    path,
                    kind: kind.name(),
                })
            }
            (kind, payload) => return Err(CodecError::schema_mismatch(&path, kind, payload)),
        };

        params.insert(attr.name.clone(), rendered);
    }

    Ok(params)
}
