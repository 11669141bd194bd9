//! Hooks Module
//!
//! Observe an agent's execution at four lifecycle points.
//!
//! # Overview
//!
//! Hooks let you:
//! - Log and audit the messages sent to the model
//! - Record model responses and generation failures
//! - Trace tool calls and their results
//!
//! # Example
//!
//! ```ignore
//! use agent_hooks::hooks::{priority, HookDefinition, HookRegistry};
//!
//! let hooks = HookRegistry::new();
//! hooks.initialize()?;
//!
//! // Trace every shell command before it runs
//! hooks.register(
//!     "shell-audit",
//!     HookDefinition::new()
//!         .with_priority(priority::HIGH)
//!         .before_tool_call(|tool, params| {
//!             tracing::info!("{} {:?}", tool, params.get("command"));
//!         })
//!         .with_tool_pattern("Bash")?,
//! )?;
//!
//! // Called by the agent runtime
//! hooks.dispatch("beforeToolCall", &json!({"tool": "Bash", "params": {"command": "ls"}}))?;
//! ```
//!
//! # Hook Events
//!
//! | Event | When | Payload |
//! |-------|------|---------|
//! | `beforeGenerate` | Before a model call | `messages` |
//! | `afterGenerate` | After a model call | `response`, `error` |
//! | `beforeToolCall` | Before a tool runs | `tool`, `params` |
//! | `afterToolCall` | After a tool runs | `tool`, `result`, `error` |
//!
//! # Ordering
//!
//! Enabled hooks run one at a time, highest priority first. Hooks with the
//! same priority run in registration order.

mod record;
mod registry;
mod types;

pub use record::{
    AfterGenerateFn, AfterToolCallFn, BeforeGenerateFn, BeforeToolCallFn, HookCallbacks,
    HookDefinition,
};
pub use registry::{DispatchReport, HookRegistry};
pub use types::{
    priority, AfterGeneratePayload, AfterToolCallPayload, BeforeGeneratePayload,
    BeforeToolCallPayload, GenerateResponse, HookEvent, HookInfo, HookPayload, HookStats, Message,
};
