//! EDA services provider
//!
//! Declarative resources for the EDA services API: IRB interfaces as managed
//! resources, VLANs and virtual networks as data sources.
//!
//! - [`schema`] - attribute schemas and the embedded registry
//! - [`codec`] - defaulting, encoding, decoding and flattening of models
//! - [`eda`] - authenticated REST client
//! - [`provider`] - resource and data source handlers
//! - [`config`] - persisted connection settings

pub mod codec;
pub mod config;
pub mod eda;
pub mod provider;
pub mod schema;

/// Version injected at compile time via EDA_SERVICES_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("EDA_SERVICES_VERSION") {
    Some(v) => v,
    None => "dev",
};
