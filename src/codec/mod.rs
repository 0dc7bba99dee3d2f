//! Model/document codec
//!
//! Converts between typed models described by a [`ResourceSchema`] and the
//! JSON documents exchanged with the EDA API.
//!
//! # Passes
//!
//! - [`fill_missing_values`] - resolve unknown plan values to null
//! - [`model_to_any_map`] - model to request body
//! - [`any_map_to_model`] - merge a response body into a model
//! - [`model_to_string_map`] - model to query parameters
//! - [`string_value`] - raw string for URL path segments
//!
//! All passes are pure functions of their inputs and safe to run
//! concurrently on independent models.
//!
//! # Example
//!
//! ```ignore
//! use eda_services::codec::{fill_missing_values, model_to_any_map, mapping_to_json};
//!
//! fill_missing_values(schema, &mut plan)?;
//! let body = mapping_to_json(&model_to_any_map(schema, &plan)?);
//! ```
//!
//! [`ResourceSchema`]: crate::schema::ResourceSchema

mod decode;
mod defaults;
mod document;
mod encode;
mod error;
mod flatten;
mod path;
mod value;

pub use decode::any_map_to_model;
pub use defaults::fill_missing_values;
pub use document::{mapping_from_json, mapping_to_json, Document, DocumentMap};
pub use encode::model_to_any_map;
pub use error::CodecError;
pub use flatten::model_to_string_map;
pub use path::AttributePath;
pub use value::{string_value, Model, Payload, Value};
