//! Hook Types
//!
//! Core types for the hooks system:
//! - `HookEvent` - The lifecycle event kinds hooks attach to
//! - `HookPayload` - Event-specific data handed to callbacks
//! - `HookInfo` / `HookStats` - Read-only snapshots of registry state
//! - `priority` - Named priority levels

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::{RegistryError, RegistryResult};

/// Named priority levels. Higher values run earlier.
pub mod priority {
    pub const HIGHEST: i32 = 1000;
    pub const HIGH: i32 = 100;
    pub const NORMAL: i32 = 0;
    pub const LOW: i32 = -100;
    pub const LOWEST: i32 = -1000;
}

/// Hook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    /// Before the agent asks the model for a generation
    BeforeGenerate,
    /// After a generation returned (or failed)
    AfterGenerate,
    /// Before a tool is invoked
    BeforeToolCall,
    /// After a tool returned (or failed)
    AfterToolCall,
}

impl HookEvent {
    /// Every event kind, in lifecycle order
    pub const ALL: [HookEvent; 4] = [
        HookEvent::BeforeGenerate,
        HookEvent::AfterGenerate,
        HookEvent::BeforeToolCall,
        HookEvent::AfterToolCall,
    ];

    /// The literal tag used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforeGenerate => "beforeGenerate",
            HookEvent::AfterGenerate => "afterGenerate",
            HookEvent::BeforeToolCall => "beforeToolCall",
            HookEvent::AfterToolCall => "afterToolCall",
        }
    }

    /// Whether this event concerns a tool invocation
    pub fn is_tool_event(&self) -> bool {
        matches!(self, HookEvent::BeforeToolCall | HookEvent::AfterToolCall)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownEventKind(s.to_string()))
    }
}

/// A conversation message as seen by `beforeGenerate` hooks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A model response as seen by `afterGenerate` hooks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub content: String,
}

impl GenerateResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Payload for `beforeGenerate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeforeGeneratePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// Payload for `afterGenerate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterGeneratePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub response: GenerateResponse,
    pub error: Option<String>,
}

/// Payload for `beforeToolCall`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeforeToolCallPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub tool: String,
    #[serde(deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
}

/// Payload for `afterToolCall`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterToolCallPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub tool: String,
    pub result: Value,
    pub error: Option<String>,
}

/// Decode an explicit `null` as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Event-specific data for one dispatch
///
/// Missing or `null` fields fall back to their defaults, so `{}` is a valid
/// payload for every event kind. Fields with the wrong JSON type are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum HookPayload {
    BeforeGenerate(BeforeGeneratePayload),
    AfterGenerate(AfterGeneratePayload),
    BeforeToolCall(BeforeToolCallPayload),
    AfterToolCall(AfterToolCallPayload),
}

impl HookPayload {
    /// Decode the payload for `event` from a JSON object
    pub fn from_value(event: HookEvent, value: &Value) -> RegistryResult<Self> {
        if !value.is_object() {
            return Err(RegistryError::invalid_argument(format!(
                "{} payload must be an object",
                event
            )));
        }

        let payload = match event {
            HookEvent::BeforeGenerate => HookPayload::BeforeGenerate(decode(event, value)?),
            HookEvent::AfterGenerate => HookPayload::AfterGenerate(decode(event, value)?),
            HookEvent::BeforeToolCall => HookPayload::BeforeToolCall(decode(event, value)?),
            HookEvent::AfterToolCall => HookPayload::AfterToolCall(decode(event, value)?),
        };
        Ok(payload)
    }

    /// The event kind this payload belongs to
    pub fn event(&self) -> HookEvent {
        match self {
            HookPayload::BeforeGenerate(_) => HookEvent::BeforeGenerate,
            HookPayload::AfterGenerate(_) => HookEvent::AfterGenerate,
            HookPayload::BeforeToolCall(_) => HookEvent::BeforeToolCall,
            HookPayload::AfterToolCall(_) => HookEvent::AfterToolCall,
        }
    }

    /// Tool name for tool events
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            HookPayload::BeforeToolCall(p) => Some(&p.tool),
            HookPayload::AfterToolCall(p) => Some(&p.tool),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(event: HookEvent, value: &Value) -> RegistryResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        RegistryError::invalid_argument(format!("invalid {} payload: {}", event, e))
    })
}

/// Read-only snapshot of one registered hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInfo {
    pub id: String,
    pub enabled: bool,
    pub priority: i32,
    /// Event kinds this hook has callbacks for
    pub events: Vec<HookEvent>,
}

/// Registry counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookStats {
    pub total_hooks: usize,
    pub enabled_hooks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_tags() {
        for event in HookEvent::ALL {
            assert_eq!(event.as_str().parse::<HookEvent>().unwrap(), event);
            assert_eq!(event.to_string(), event.as_str());
        }

        let err = "notAKind".parse::<HookEvent>().unwrap_err();
        assert!(matches!(err, RegistryError::UnknownEventKind(tag) if tag == "notAKind"));

        // Tags are case sensitive
        assert!("BeforeGenerate".parse::<HookEvent>().is_err());
    }

    #[test]
    fn test_event_serializes_as_tag() {
        let value = serde_json::to_value(HookEvent::AfterToolCall).unwrap();
        assert_eq!(value, json!("afterToolCall"));
    }

    #[test]
    fn test_before_generate_payload() {
        let value = json!({
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        });

        let payload = HookPayload::from_value(HookEvent::BeforeGenerate, &value).unwrap();
        match payload {
            HookPayload::BeforeGenerate(p) => {
                assert_eq!(p.messages.len(), 2);
                assert_eq!(p.messages[1], Message::new("user", "hi"));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_after_tool_call_payload() {
        let value = json!({"tool": "search", "result": {"hits": 3}, "error": null});
        let payload = HookPayload::from_value(HookEvent::AfterToolCall, &value).unwrap();

        assert_eq!(payload.event(), HookEvent::AfterToolCall);
        assert_eq!(payload.tool_name(), Some("search"));
        match payload {
            HookPayload::AfterToolCall(p) => {
                assert_eq!(p.result, json!({"hits": 3}));
                assert!(p.error.is_none());
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_empty_object_is_valid_for_every_event() {
        for event in HookEvent::ALL {
            let payload = HookPayload::from_value(event, &json!({})).unwrap();
            assert_eq!(payload.event(), event);
        }
    }

    #[test]
    fn test_rejects_non_object_payload() {
        let err = HookPayload::from_value(HookEvent::BeforeGenerate, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_mistyped_field() {
        let err = HookPayload::from_value(HookEvent::BeforeToolCall, &json!({"tool": 42}))
            .unwrap_err();
        match err {
            RegistryError::InvalidArgument(msg) => assert!(msg.contains("beforeToolCall")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let payload = HookPayload::from_value(
            HookEvent::AfterGenerate,
            &json!({"response": null, "error": "timeout"}),
        )
        .unwrap();
        assert_eq!(
            payload,
            HookPayload::AfterGenerate(AfterGeneratePayload {
                response: GenerateResponse::default(),
                error: Some("timeout".to_string()),
            })
        );

        let payload = HookPayload::from_value(
            HookEvent::BeforeToolCall,
            &json!({"tool": null, "params": null}),
        )
        .unwrap();
        assert_eq!(payload, HookPayload::BeforeToolCall(BeforeToolCallPayload::default()));

        let payload =
            HookPayload::from_value(HookEvent::BeforeGenerate, &json!({"messages": null}))
                .unwrap();
        assert_eq!(payload, HookPayload::BeforeGenerate(BeforeGeneratePayload::default()));

        // Wrong non-null types are still rejected
        for (event, value) in [
            (HookEvent::BeforeGenerate, json!({"messages": "hi"})),
            (HookEvent::AfterGenerate, json!({"response": 3})),
            (HookEvent::BeforeToolCall, json!({"params": [1]})),
            (HookEvent::AfterToolCall, json!({"tool": false})),
        ] {
            let err = HookPayload::from_value(event, &value).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidArgument(_)), "{}", value);
        }
    }

    #[test]
    fn test_stats_field_names() {
        let stats = HookStats {
            total_hooks: 3,
            enabled_hooks: 2,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"total_hooks": 3, "enabled_hooks": 2})
        );
    }
}
