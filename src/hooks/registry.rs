//! Hook Registry
//!
//! Contains:
//! - `HookRegistry` - stores hooks by id and dispatches lifecycle events
//! - `DispatchReport` - which hooks ran for one dispatch

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::{Map, Value};

use super::record::{HookDefinition, HookRecord};
use super::types::{
    AfterGeneratePayload, AfterToolCallPayload, BeforeGeneratePayload, BeforeToolCallPayload,
    GenerateResponse, HookEvent, HookInfo, HookPayload, HookStats, Message,
};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::core::{RegistryError, RegistryResult};

/// Outcome of a single dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub event: HookEvent,
    /// Hooks whose callback ran to completion, in invocation order
    pub invoked: Vec<String>,
    /// Hooks whose callback panicked (only with `isolate_panics`)
    pub failed: Vec<String>,
}

impl DispatchReport {
    fn new(event: HookEvent) -> Self {
        Self {
            event,
            invoked: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every matching hook completed
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Table guarded by the registry lock
#[derive(Default)]
struct RegistryState {
    initialized: bool,
    hooks: HashMap<String, HookRecord>,
    next_sequence: u64,
}

/// Central registry for lifecycle hooks
///
/// One readers-writer lock guards the table. Mutations take the write lock,
/// queries and the dispatch snapshot take the read lock. Callbacks always run
/// after the lock is released, on the calling thread, one after another in
/// descending priority (ties: earlier registration first).
///
/// The registry starts uninitialized; every operation fails with
/// `NotInitialized` until `initialize()` is called and again after `cleanup()`.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(HookRegistry::new());
/// registry.initialize()?;
///
/// registry.register(
///     "audit",
///     HookDefinition::new()
///         .with_priority(priority::HIGH)
///         .before_tool_call(|tool, _params| tracing::info!("tool: {}", tool)),
/// )?;
///
/// registry.dispatch("beforeToolCall", &json!({"tool": "Bash", "params": {}}))?;
/// ```
pub struct HookRegistry {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
}

impl HookRegistry {
    /// Create an uninitialized registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an uninitialized registry
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // === Lifecycle ===

    /// Mark the registry ready. Calling it again is a no-op.
    pub fn initialize(&self) -> RegistryResult<()> {
        let mut state = self.write();
        if !state.initialized {
            state.initialized = true;
            tracing::info!("[HookRegistry] Initialized");
        }
        Ok(())
    }

    /// Drop every hook and return to the uninitialized state
    pub fn cleanup(&self) -> RegistryResult<()> {
        let mut state = self.write();
        let dropped = state.hooks.len();
        state.hooks.clear();
        state.initialized = false;
        tracing::info!("[HookRegistry] Cleaned up ({} hooks dropped)", dropped);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    // === Registration ===

    /// Register a hook under `id` and return the id
    ///
    /// An existing hook with the same id is replaced, or the call fails with
    /// `AlreadyExists` under `DuplicatePolicy::Reject`.
    pub fn register(
        &self,
        id: impl Into<String>,
        definition: HookDefinition,
    ) -> RegistryResult<String> {
        let id = id.into();
        let mut state = self.write_initialized()?;
        validate_id(&id)?;

        if state.hooks.contains_key(&id) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => return Err(RegistryError::AlreadyExists(id)),
                DuplicatePolicy::Replace => {
                    tracing::warn!("[HookRegistry] Replacing existing hook: {}", id);
                }
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let record =
            HookRecord::new(id.clone(), definition, self.config.default_priority, sequence);
        tracing::info!(
            "[HookRegistry] Registered hook '{}' (priority {}, events {:?})",
            id,
            record.priority,
            record.info().events
        );
        state.hooks.insert(id.clone(), record);

        Ok(id)
    }

    /// Remove a hook. Returns whether it existed.
    pub fn unregister(&self, id: &str) -> RegistryResult<bool> {
        let mut state = self.write_initialized()?;
        validate_id(id)?;

        let existed = state.hooks.remove(id).is_some();
        if existed {
            tracing::info!("[HookRegistry] Unregistered hook: {}", id);
        }
        Ok(existed)
    }

    /// Remove every hook and return how many were removed
    pub fn clear(&self) -> RegistryResult<usize> {
        let mut state = self.write_initialized()?;
        let count = state.hooks.len();
        state.hooks.clear();
        tracing::info!("[HookRegistry] Cleared {} hooks", count);
        Ok(count)
    }

    // === Enable / disable ===

    pub fn enable(&self, id: &str) -> RegistryResult<bool> {
        self.set_enabled(id, true)
    }

    /// Stop dispatching to a hook without removing it
    pub fn disable(&self, id: &str) -> RegistryResult<bool> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> RegistryResult<bool> {
        let mut state = self.write_initialized()?;
        validate_id(id)?;

        let record = state
            .hooks
            .get_mut(id)
            .ok_or_else(|| RegistryError::not_found(id))?;
        record.enabled = enabled;
        tracing::debug!("[HookRegistry] Hook '{}' enabled = {}", id, enabled);
        Ok(true)
    }

    /// Enable several hooks. Unknown ids yield `false` instead of an error.
    pub fn batch_enable<I, S>(&self, ids: I) -> RegistryResult<Vec<bool>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.batch_set_enabled(ids, true)
    }

    /// Disable several hooks. Unknown ids yield `false` instead of an error.
    pub fn batch_disable<I, S>(&self, ids: I) -> RegistryResult<Vec<bool>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.batch_set_enabled(ids, false)
    }

    fn batch_set_enabled<I, S>(&self, ids: I, enabled: bool) -> RegistryResult<Vec<bool>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.write_initialized()?;
        let results = ids
            .into_iter()
            .map(|id| match state.hooks.get_mut(id.as_ref()) {
                Some(record) => {
                    record.enabled = enabled;
                    true
                }
                None => false,
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            "[HookRegistry] Batch enabled = {}: {}/{} applied",
            enabled,
            results.iter().filter(|ok| **ok).count(),
            results.len()
        );
        Ok(results)
    }

    // === Priority ===

    pub fn set_priority(&self, id: &str, priority: i32) -> RegistryResult<()> {
        let mut state = self.write_initialized()?;
        validate_id(id)?;

        let record = state
            .hooks
            .get_mut(id)
            .ok_or_else(|| RegistryError::not_found(id))?;
        tracing::debug!(
            "[HookRegistry] Hook '{}' priority {} -> {}",
            id,
            record.priority,
            priority
        );
        record.priority = priority;
        Ok(())
    }

    pub fn get_priority(&self, id: &str) -> RegistryResult<i32> {
        let state = self.read_initialized()?;
        validate_id(id)?;

        state
            .hooks
            .get(id)
            .map(|record| record.priority)
            .ok_or_else(|| RegistryError::not_found(id))
    }

    // === Queries ===

    pub fn get_info(&self, id: &str) -> RegistryResult<HookInfo> {
        let state = self.read_initialized()?;
        validate_id(id)?;

        state
            .hooks
            .get(id)
            .map(HookRecord::info)
            .ok_or_else(|| RegistryError::not_found(id))
    }

    /// Snapshots of all hooks, highest priority first
    pub fn list(&self) -> RegistryResult<Vec<HookInfo>> {
        let state = self.read_initialized()?;
        let mut records: Vec<&HookRecord> = state.hooks.values().collect();
        records.sort_by(|a, b| dispatch_order(*a, *b));
        Ok(records.into_iter().map(HookRecord::info).collect())
    }

    pub fn stats(&self) -> RegistryResult<HookStats> {
        let state = self.read_initialized()?;
        Ok(HookStats {
            total_hooks: state.hooks.len(),
            enabled_hooks: state.hooks.values().filter(|r| r.enabled).count(),
        })
    }

    /// Check if any enabled hook handles `event`
    ///
    /// Tool patterns are not consulted, so this can be true for a tool call
    /// that every matching hook would skip.
    pub fn has_hooks(&self, event: HookEvent) -> RegistryResult<bool> {
        Ok(self.hook_count(event)? > 0)
    }

    /// Number of enabled hooks that handle `event`, ignoring tool patterns
    pub fn hook_count(&self, event: HookEvent) -> RegistryResult<usize> {
        let state = self.read_initialized()?;
        Ok(state
            .hooks
            .values()
            .filter(|r| r.enabled && r.handles(event))
            .count())
    }

    // === Dispatch ===

    /// Dispatch a lifecycle event given its tag and a JSON payload
    ///
    /// Returns `true` when every matching hook completed. That is always the
    /// case unless `isolate_panics` caught a panicking callback.
    pub fn dispatch(&self, event: &str, payload: &Value) -> RegistryResult<bool> {
        self.ensure_initialized()?;
        let event: HookEvent = event.parse()?;
        let payload = HookPayload::from_value(event, payload)?;
        self.dispatch_payload(&payload)
    }

    /// Dispatch an already decoded payload
    pub fn dispatch_payload(&self, payload: &HookPayload) -> RegistryResult<bool> {
        Ok(self.dispatch_with_report(payload)?.all_succeeded())
    }

    /// Dispatch and report which hooks ran
    ///
    /// The set of hooks and their order are fixed when dispatch starts.
    /// Registry changes made while callbacks run (including by the callbacks
    /// themselves) only affect later dispatches.
    pub fn dispatch_with_report(&self, payload: &HookPayload) -> RegistryResult<DispatchReport> {
        let event = payload.event();
        let hooks = self.snapshot(event)?;
        let mut report = DispatchReport::new(event);

        tracing::debug!("[HookRegistry] Dispatching {} to {} hooks", event, hooks.len());

        for hook in &hooks {
            if self.config.isolate_panics {
                match panic::catch_unwind(AssertUnwindSafe(|| hook.invoke(payload))) {
                    Ok(true) => report.invoked.push(hook.id.clone()),
                    Ok(false) => {}
                    Err(panic) => {
                        tracing::error!(
                            hook = %hook.id,
                            event = %event,
                            "[HookRegistry] Hook panicked: {}",
                            panic_message(panic.as_ref())
                        );
                        report.failed.push(hook.id.clone());
                    }
                }
            } else if hook.invoke(payload) {
                report.invoked.push(hook.id.clone());
            }
        }

        Ok(report)
    }

    /// Run `beforeGenerate` hooks
    pub fn before_generate(&self, messages: &[Message]) -> RegistryResult<bool> {
        self.dispatch_payload(&HookPayload::BeforeGenerate(BeforeGeneratePayload {
            messages: messages.to_vec(),
        }))
    }

    /// Run `afterGenerate` hooks
    pub fn after_generate(
        &self,
        response: &GenerateResponse,
        error: Option<&str>,
    ) -> RegistryResult<bool> {
        self.dispatch_payload(&HookPayload::AfterGenerate(AfterGeneratePayload {
            response: response.clone(),
            error: error.map(str::to_string),
        }))
    }

    /// Run `beforeToolCall` hooks
    pub fn before_tool_call(
        &self,
        tool: &str,
        params: &Map<String, Value>,
    ) -> RegistryResult<bool> {
        self.dispatch_payload(&HookPayload::BeforeToolCall(BeforeToolCallPayload {
            tool: tool.to_string(),
            params: params.clone(),
        }))
    }

    /// Run `afterToolCall` hooks
    pub fn after_tool_call(
        &self,
        tool: &str,
        result: &Value,
        error: Option<&str>,
    ) -> RegistryResult<bool> {
        self.dispatch_payload(&HookPayload::AfterToolCall(AfterToolCallPayload {
            tool: tool.to_string(),
            result: result.clone(),
            error: error.map(str::to_string),
        }))
    }

    /// Enabled hooks handling `event`, in dispatch order
    fn snapshot(&self, event: HookEvent) -> RegistryResult<Vec<HookRecord>> {
        let mut hooks: Vec<HookRecord> = {
            let state = self.read_initialized()?;
            state
                .hooks
                .values()
                .filter(|r| r.enabled && r.handles(event))
                .cloned()
                .collect()
        };
        hooks.sort_by(dispatch_order);
        Ok(hooks)
    }

    // === Locking ===

    // Callbacks never run under the lock, so poisoning can only come from a
    // panic inside this file; the table is still consistent in that case.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_initialized(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        let state = self.read();
        if !state.initialized {
            return Err(RegistryError::NotInitialized);
        }
        Ok(state)
    }

    fn write_initialized(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        let state = self.write();
        if !state.initialized {
            return Err(RegistryError::NotInitialized);
        }
        Ok(state)
    }

    fn ensure_initialized(&self) -> RegistryResult<()> {
        self.read_initialized().map(|_| ())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("HookRegistry")
            .field("initialized", &state.initialized)
            .field("hooks", &state.hooks.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Descending priority, then registration order
fn dispatch_order(a: &HookRecord, b: &HookRecord) -> std::cmp::Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

fn validate_id(id: &str) -> RegistryResult<()> {
    if id.is_empty() {
        return Err(RegistryError::invalid_argument("id must be a non-empty string"));
    }
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
