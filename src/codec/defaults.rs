//! Resolve unknown plan values ahead of encoding.

use super::{AttributePath, CodecError, Model, Payload, Value};
use crate::schema::{Attribute, AttributeKind, ResourceSchema};
use std::collections::BTreeMap;

/// Replace every unknown node with null, except computed-only attributes
/// which stay unknown until the API response fills them.
///
/// Unknown objects and tuples are expanded into their full structure first,
/// so each child is defaulted on its own. Unknown lists, sets and maps have
/// no structure to expand and become null. Entries the schema does not
/// declare are a [`CodecError::SchemaMismatch`]. Idempotent. On error the
/// model is left untouched.
pub fn fill_missing_values(schema: &ResourceSchema, model: &mut Model) -> Result<(), CodecError> {
    let mut filled = model.clone();
    fill_attributes(&schema.attributes, filled.attributes_mut(), &AttributePath::root())?;
    *model = filled;
    Ok(())
}

fn fill_attributes(
    attributes: &[Attribute],
    values: &mut BTreeMap<String, Value>,
    path: &AttributePath,
) -> Result<(), CodecError> {
    CodecError::check_declared(attributes, values, path)?;

    for attr in attributes {
        let value = values.entry(attr.name.clone()).or_insert(Value::Null);
        if value.is_unknown() && attr.is_computed_only() {
            continue;
        }
        fill_value(&attr.kind, value, &path.attribute(&attr.name))?;
    }
    Ok(())
}

fn fill_value(kind: &AttributeKind, value: &mut Value, path: &AttributePath) -> Result<(), CodecError> {
    if value.is_unknown() {
        *value = expand_unknown(kind);
    }

    let Value::Known(payload) = value else {
        return Ok(());
    };

    match (kind, payload) {
        (AttributeKind::String, Payload::String(_))
        | (AttributeKind::Bool, Payload::Bool(_))
        | (AttributeKind::Int64, Payload::Int64(_))
        | (AttributeKind::Float64, Payload::Float64(_))
        | (AttributeKind::Number, Payload::Number(_)) => Ok(()),
        (AttributeKind::Object { attributes }, Payload::Object(children)) => {
            fill_attributes(attributes, children, path)
        }
        (AttributeKind::List { element }, Payload::List(items))
        | (AttributeKind::Set { element }, Payload::Set(items)) => items
            .iter_mut()
            .enumerate()
            .try_for_each(|(i, item)| fill_value(element, item, &path.index(i))),
        (AttributeKind::Map { element }, Payload::Map(entries)) => entries
            .iter_mut()
            .try_for_each(|(key, item)| fill_value(element, item, &path.key(key))),
        (AttributeKind::Tuple { elements }, Payload::Tuple(items)) => {
            if elements.len() != items.len() {
                return Err(CodecError::SchemaMismatch {
                    path: path.clone(),
                    expected: "tuple",
                    found: "tuple of different arity",
                });
            }
            elements
                .iter()
                .zip(items.iter_mut())
                .enumerate()
                .try_for_each(|(i, (element, item))| fill_value(element, item, &path.index(i)))
        }
        (kind, payload) => Err(CodecError::schema_mismatch(path, kind, payload)),
    }
}

fn expand_unknown(kind: &AttributeKind) -> Value {
    match kind {
        AttributeKind::Object { attributes } => Value::Known(Payload::Object(
            attributes
                .iter()
                .map(|attr| (attr.name.clone(), Value::Unknown))
                .collect(),
        )),
        AttributeKind::Tuple { elements } => {
            Value::Known(Payload::Tuple(vec![Value::Unknown; elements.len()]))
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ApiPaths, Identity, SchemaKind};

    fn schema() -> ResourceSchema {
        ResourceSchema {
            type_name: "irb".to_string(),
            kind: SchemaKind::Resource,
            description: None,
            api: ApiPaths {
                create: None,
                read: "/irb/{name}".to_string(),
                update: None,
                delete: None,
            },
            identity: Identity {
                namespace: "namespace".to_string(),
                name: "name".to_string(),
            },
            attributes: vec![
                Attribute::new("name", AttributeKind::String).required(),
                Attribute::new("description", AttributeKind::String),
                Attribute::new(
                    "spec",
                    AttributeKind::Object {
                        attributes: vec![
                            Attribute::new("router", AttributeKind::String),
                            Attribute::new("mtu", AttributeKind::Int64),
                            Attribute::new("generation", AttributeKind::Int64).computed_only(),
                        ],
                    },
                ),
                Attribute::new(
                    "selectors",
                    AttributeKind::List {
                        element: Box::new(AttributeKind::String),
                    },
                ),
                Attribute::new("status", AttributeKind::String).computed_only(),
            ],
        }
    }

    #[test]
    fn test_unknown_leaves_become_null() {
        let mut model = schema().unknown_model().with("name", Value::string("irb-1"));

        fill_missing_values(&schema(), &mut model).unwrap();

        assert_eq!(model.value("name"), &Value::string("irb-1"));
        assert_eq!(model.value("description"), &Value::Null);
        assert_eq!(model.value("selectors"), &Value::Null);
    }

    #[test]
    fn test_computed_only_stays_unknown() {
        let mut model = schema().unknown_model();
        fill_missing_values(&schema(), &mut model).unwrap();
        assert_eq!(model.value("status"), &Value::Unknown);
    }

    #[test]
    fn test_unknown_object_is_expanded() {
        let mut model = schema().unknown_model();
        fill_missing_values(&schema(), &mut model).unwrap();

        assert_eq!(
            model.value("spec"),
            &Value::object([
                ("router", Value::Null),
                ("mtu", Value::Null),
                ("generation", Value::Unknown),
            ])
        );
    }

    #[test]
    fn test_nested_unknowns_inside_known_values() {
        let mut model = schema()
            .null_model()
            .with(
                "spec",
                Value::object([("router", Value::string("r1")), ("mtu", Value::Unknown)]),
            )
            .with("selectors", Value::list([Value::string("a"), Value::Unknown]));

        fill_missing_values(&schema(), &mut model).unwrap();

        assert_eq!(
            model.value("spec"),
            &Value::object([
                ("router", Value::string("r1")),
                ("mtu", Value::Null),
                ("generation", Value::Null),
            ])
        );
        assert_eq!(
            model.value("selectors"),
            &Value::list([Value::string("a"), Value::Null])
        );
    }

    #[test]
    fn test_idempotent() {
        let mut once = schema().unknown_model();
        fill_missing_values(&schema(), &mut once).unwrap();
        let mut twice = once.clone();
        fill_missing_values(&schema(), &mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tuple_expansion() {
        let kind = AttributeKind::Tuple {
            elements: vec![AttributeKind::String, AttributeKind::Int64],
        };
        let mut value = Value::Unknown;
        fill_value(&kind, &mut value, &AttributePath::root()).unwrap();
        assert_eq!(value, Value::tuple([Value::Null, Value::Null]));
    }

    #[test]
    fn test_schema_mismatch_leaves_model_untouched() {
        let mut model = schema()
            .unknown_model()
            .with("spec", Value::object([("mtu", Value::string("1500"))]));
        let before = model.clone();

        let err = fill_missing_values(&schema(), &mut model).unwrap_err();

        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                path: AttributePath::root().attribute("spec").attribute("mtu"),
                expected: "int64",
                found: "string",
            }
        );
        assert_eq!(model, before);
    }

    #[test]
    fn test_undeclared_child_is_schema_mismatch() {
        let mut model = schema()
            .unknown_model()
            .with("spec", Value::object([("colour", Value::Unknown)]));
        let before = model.clone();

        let err = fill_missing_values(&schema(), &mut model).unwrap_err();

        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                path: AttributePath::root().attribute("spec").attribute("colour"),
                expected: "undeclared",
                found: "unknown",
            }
        );
        assert_eq!(model, before);
    }
}
