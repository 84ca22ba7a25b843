//! # queuewatch config
//!
//! TOML configuration for the queuewatch monitor: loading with environment
//! expansion, schema with serde defaults, and validation.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
