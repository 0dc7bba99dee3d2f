use super::AttributePath;
use super::{Document, Payload, Value};
use crate::schema::{Attribute, AttributeKind};
use std::collections::BTreeMap;
use thiserror::Error;

/// Every codec failure, located at the attribute where it occurred.
///
/// Passes stop at the first error in depth-first order and never hand back
/// partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A model value does not have the shape its attribute declares
    #[error("schema mismatch at {path}: attribute is {expected} but value is {found}")]
    SchemaMismatch {
        path: AttributePath,
        expected: &'static str,
        found: &'static str,
    },

    /// An unknown value reached encoding
    #[error("unresolved unknown value at {path}")]
    UnresolvedValue { path: AttributePath },

    /// A document scalar cannot become the attribute's primitive
    #[error("type mismatch at {path}: cannot decode {found} into {expected}")]
    TypeMismatch {
        path: AttributePath,
        expected: &'static str,
        found: String,
    },

    /// A document node has the wrong composite shape for the attribute
    #[error("structural mismatch at {path}: expected {expected}, found {found}")]
    StructuralMismatch {
        path: AttributePath,
        expected: String,
        found: String,
    },

    /// A composite attribute was given a value for a query lookup
    #[error("{kind} attribute {path} cannot be used as a query parameter")]
    UnsupportedForQuery {
        path: AttributePath,
        kind: &'static str,
    },
}

impl CodecError {
    pub(crate) fn schema_mismatch(path: &AttributePath, kind: &AttributeKind, found: &Payload) -> Self {
        CodecError::SchemaMismatch {
            path: path.clone(),
            expected: kind.name(),
            found: found.kind_name(),
        }
    }

    pub(crate) fn type_mismatch(path: &AttributePath, kind: &AttributeKind, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            path: path.clone(),
            expected: kind.name(),
            found: found.into(),
        }
    }

    pub(crate) fn structural_mismatch(
        path: &AttributePath,
        expected: impl Into<String>,
        found: &Document,
    ) -> Self {
        CodecError::StructuralMismatch {
            path: path.clone(),
            expected: expected.into(),
            found: found.kind_name().to_string(),
        }
    }

    /// A model entry with no attribute definition behind it
    pub(crate) fn undeclared(path: &AttributePath, found: &Value) -> Self {
        CodecError::SchemaMismatch {
            path: path.clone(),
            expected: "undeclared",
            found: match found {
                Value::Known(payload) => payload.kind_name(),
                Value::Null => "null",
                Value::Unknown => "unknown",
            },
        }
    }

    /// Reject entries of `values` that `attributes` does not declare
    pub(crate) fn check_declared(
        attributes: &[Attribute],
        values: &BTreeMap<String, Value>,
        path: &AttributePath,
    ) -> Result<(), Self> {
        match values
            .iter()
            .find(|(name, _)| !attributes.iter().any(|attr| &attr.name == *name))
        {
            Some((name, value)) => Err(Self::undeclared(&path.attribute(name), value)),
            None => Ok(()),
        }
    }

    /// Where the error occurred
    pub fn path(&self) -> &AttributePath {
        match self {
            CodecError::SchemaMismatch { path, .. }
            | CodecError::UnresolvedValue { path }
            | CodecError::TypeMismatch { path, .. }
            | CodecError::StructuralMismatch { path, .. }
            | CodecError::UnsupportedForQuery { path, .. } => path,
        }
    }
}
