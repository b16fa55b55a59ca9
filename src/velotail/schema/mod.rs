//! Schema resolution
//!
//! A message's schema comes from one of two places:
//! - **Registry**: the ID in the wire envelope is looked up in a Confluent
//!   schema registry ([`SchemaRegistryClient`]) and the parsed codec is cached
//!   per ID.
//! - **File**: a single schema is loaded from disk at startup and applies to
//!   every message.
//!
//! [`SchemaResolver`] hides which one is active from the decode pipeline.

pub mod error;
pub mod registry_client;
pub mod resolver;

pub use error::{SchemaError, SchemaResult};
pub use registry_client::{RegistryAuth, RegistryClientConfig, SchemaRegistryClient};
pub use resolver::{SchemaProvider, SchemaResolver};
