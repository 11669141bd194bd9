pub mod core;
pub mod config;

// Optional components
pub mod logging;

// Lifecycle hook registry and dispatch
pub mod hooks;

pub use config::{DuplicatePolicy, RegistryConfig};
pub use crate::core::{RegistryError, RegistryResult};
pub use hooks::{HookDefinition, HookEvent, HookRegistry};
