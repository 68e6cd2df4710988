//! Shared library for the Facturación IMA front server
//!
//! This library contains the pieces used by both the proxy routes and the
//! boletas store:
//! - Configuration
//! - Error taxonomy and its HTTP rendering
//! - Upstream response classification
//! - Boleta normalization
//! - Common types and URL helpers

pub mod boleta;
pub mod classify;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use boleta::{normalize_list, Boleta};
pub use classify::{classify_response, Classified};
pub use config::{BackendConfig, Config};
pub use error::{AppError, Result};
pub use types::*;
