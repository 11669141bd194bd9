//! Core types shared by the registry
//!
//! - `RegistryError` / `RegistryResult` - Error types

pub mod error;

pub use error::{RegistryError, RegistryResult};
