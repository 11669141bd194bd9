//! Hook definitions and records
//!
//! Contains:
//! - Callback type aliases, one per lifecycle event
//! - `HookDefinition` - what a caller hands to `register`
//! - `HookRecord` - what the registry stores per hook id

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use super::types::{GenerateResponse, HookEvent, HookInfo, HookPayload, Message};
use crate::core::{RegistryError, RegistryResult};

/// Callback for `beforeGenerate`: receives the outgoing messages
pub type BeforeGenerateFn = Arc<dyn Fn(&[Message]) + Send + Sync>;

/// Callback for `afterGenerate`: receives the response and the error, if any
pub type AfterGenerateFn = Arc<dyn Fn(&GenerateResponse, Option<&str>) + Send + Sync>;

/// Callback for `beforeToolCall`: receives the tool name and its parameters
pub type BeforeToolCallFn = Arc<dyn Fn(&str, &Map<String, Value>) + Send + Sync>;

/// Callback for `afterToolCall`: receives the tool name, result and error, if any
pub type AfterToolCallFn = Arc<dyn Fn(&str, &Value, Option<&str>) + Send + Sync>;

/// The four optional callback slots of a hook
#[derive(Clone, Default)]
pub struct HookCallbacks {
    before_generate: Option<BeforeGenerateFn>,
    after_generate: Option<AfterGenerateFn>,
    before_tool_call: Option<BeforeToolCallFn>,
    after_tool_call: Option<AfterToolCallFn>,
}

impl HookCallbacks {
    /// Whether a callback is installed for `event`
    pub fn handles(&self, event: HookEvent) -> bool {
        match event {
            HookEvent::BeforeGenerate => self.before_generate.is_some(),
            HookEvent::AfterGenerate => self.after_generate.is_some(),
            HookEvent::BeforeToolCall => self.before_tool_call.is_some(),
            HookEvent::AfterToolCall => self.after_tool_call.is_some(),
        }
    }

    /// Event kinds with an installed callback, in lifecycle order
    pub fn events(&self) -> Vec<HookEvent> {
        HookEvent::ALL
            .into_iter()
            .filter(|event| self.handles(*event))
            .collect()
    }

    /// Run the slot matching the payload. Returns `false` if the slot is empty.
    fn invoke(&self, payload: &HookPayload) -> bool {
        match payload {
            HookPayload::BeforeGenerate(p) => self
                .before_generate
                .as_ref()
                .map(|f| f(&p.messages))
                .is_some(),
            HookPayload::AfterGenerate(p) => self
                .after_generate
                .as_ref()
                .map(|f| f(&p.response, p.error.as_deref()))
                .is_some(),
            HookPayload::BeforeToolCall(p) => self
                .before_tool_call
                .as_ref()
                .map(|f| f(&p.tool, &p.params))
                .is_some(),
            HookPayload::AfterToolCall(p) => self
                .after_tool_call
                .as_ref()
                .map(|f| f(&p.tool, &p.result, p.error.as_deref()))
                .is_some(),
        }
    }
}

impl fmt::Debug for HookCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.events()).finish()
    }
}

/// Everything a caller supplies when registering a hook
///
/// # Example
///
/// ```ignore
/// let definition = HookDefinition::new()
///     .with_priority(priority::HIGH)
///     .before_tool_call(|tool, params| {
///         tracing::info!("calling {} with {:?}", tool, params);
///     })
///     .with_tool_pattern("^mcp__")?;
///
/// registry.register("audit", definition)?;
/// ```
#[derive(Clone, Default)]
pub struct HookDefinition {
    priority: Option<i32>,
    callbacks: HookCallbacks,
    tool_pattern: Option<Regex>,
}

impl HookDefinition {
    /// Create an empty definition (no callbacks, registry default priority)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the priority. Higher runs earlier.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Only fire tool callbacks for tools whose name matches `pattern`
    ///
    /// Pattern examples:
    /// - `"Bash"` - match only Bash tool
    /// - `"Read|Write|Edit"` - match file tools
    /// - `"^mcp__"` - match all MCP tools
    pub fn with_tool_pattern(mut self, pattern: &str) -> RegistryResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            RegistryError::invalid_argument(format!("invalid tool pattern '{}': {}", pattern, e))
        })?;
        self.tool_pattern = Some(regex);
        Ok(self)
    }

    pub fn before_generate<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Message]) + Send + Sync + 'static,
    {
        self.callbacks.before_generate = Some(Arc::new(f));
        self
    }

    pub fn after_generate<F>(mut self, f: F) -> Self
    where
        F: Fn(&GenerateResponse, Option<&str>) + Send + Sync + 'static,
    {
        self.callbacks.after_generate = Some(Arc::new(f));
        self
    }

    pub fn before_tool_call<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Map<String, Value>) + Send + Sync + 'static,
    {
        self.callbacks.before_tool_call = Some(Arc::new(f));
        self
    }

    pub fn after_tool_call<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Value, Option<&str>) + Send + Sync + 'static,
    {
        self.callbacks.after_tool_call = Some(Arc::new(f));
        self
    }

    /// Explicit priority, if one was set
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// Event kinds this definition has callbacks for
    pub fn events(&self) -> Vec<HookEvent> {
        self.callbacks.events()
    }
}

impl fmt::Debug for HookDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDefinition")
            .field("priority", &self.priority)
            .field("callbacks", &self.callbacks)
            .field("tool_pattern", &self.tool_pattern.as_ref().map(|r| r.as_str()))
            .finish()
    }
}

/// A registered hook
///
/// Cloning is cheap: callbacks are shared. Dispatch works on clones so the
/// table lock is never held while user code runs.
#[derive(Clone)]
pub(crate) struct HookRecord {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
    /// Registration order, used to break priority ties
    pub sequence: u64,
    callbacks: HookCallbacks,
    tool_pattern: Option<Regex>,
}

impl HookRecord {
    pub fn new(
        id: String,
        definition: HookDefinition,
        default_priority: i32,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            priority: definition.priority.unwrap_or(default_priority),
            enabled: true,
            sequence,
            callbacks: definition.callbacks,
            tool_pattern: definition.tool_pattern,
        }
    }

    pub fn info(&self) -> HookInfo {
        HookInfo {
            id: self.id.clone(),
            enabled: self.enabled,
            priority: self.priority,
            events: self.callbacks.events(),
        }
    }

    /// Whether this hook would run for `event` (ignores the tool filter)
    pub fn handles(&self, event: HookEvent) -> bool {
        self.callbacks.handles(event)
    }

    fn matches_tool(&self, tool_name: &str) -> bool {
        match &self.tool_pattern {
            Some(regex) => regex.is_match(tool_name),
            None => true,
        }
    }

    /// Run the callback for this payload, if any. Returns whether one ran.
    pub fn invoke(&self, payload: &HookPayload) -> bool {
        if let Some(tool_name) = payload.tool_name() {
            if !self.matches_tool(tool_name) {
                return false;
            }
        }
        self.callbacks.invoke(payload)
    }
}

impl fmt::Debug for HookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRecord")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("sequence", &self.sequence)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
