pub mod config;
pub mod error;
pub mod kafka;
pub mod pipeline;
pub mod schema;
pub mod serialization;
