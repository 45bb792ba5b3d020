//! Agent invocation collaborator.
//!
//! An agent takes a free-text instruction and an opaque agent id and resolves
//! to an [`AgentResult`]. `Err` from [`AgentInvoker::invoke`] is a transport
//! failure; a declared failure is `Ok` with `success: false`.

pub mod client;

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalizer::decode_payload;

/// Agent that produces roadmap updates.
pub const GENERATION_AGENT_ID: &str = "699d43ba84b11a9ffb6a147f";
/// Agent that dispatches stakeholder messages.
pub const DELIVERY_AGENT_ID: &str = "699d43d7b180522b55d44611";

/// Which agent id each operation is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRouting {
    pub generation: String,
    pub delivery: String,
}

impl Default for AgentRouting {
    fn default() -> Self {
        Self {
            generation: GENERATION_AGENT_ID.to_string(),
            delivery: DELIVERY_AGENT_ID.to_string(),
        }
    }
}

#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, instruction: &str, agent_id: &str) -> Result<AgentResult, String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AgentResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    /// A successful result carrying `payload` as its structured result.
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            response: Some(AgentResponse {
                result: Some(payload),
                message: None,
            }),
            error: None,
        }
    }

    /// A declared failure with the given error text.
    pub fn declined(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }

    /// Lenient decode of a raw envelope. Wrong-shaped fields read as absent.
    pub fn from_value(value: &Value) -> Self {
        let non_empty_str = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        let response = value.get("response").and_then(Value::as_object).map(|r| {
            AgentResponse {
                result: r.get("result").filter(|v| !v.is_null()).cloned(),
                message: non_empty_str(r.get("message")),
            }
        });
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            response,
            error: non_empty_str(value.get("error")),
        }
    }

    /// The structured result as a record, when the call succeeded and the
    /// result is usable.
    pub fn payload(&self) -> Option<Map<String, Value>> {
        if !self.success {
            return None;
        }
        self.response
            .as_ref()
            .and_then(|r| r.result.as_ref())
            .and_then(decode_payload)
    }

    /// The collaborator's own explanation, else `fallback`.
    pub fn failure_message(&self, fallback: &str) -> String {
        let declared = self
            .error
            .as_deref()
            .or_else(|| self.response.as_ref().and_then(|r| r.message.as_deref()))
            .filter(|m| !m.trim().is_empty());
        declared.unwrap_or(fallback).to_string()
    }
}

/// Agent that replays queued results in order and records every call.
///
/// Backs offline mode and tests. Once the queue is drained every call
/// resolves to a transport error.
#[derive(Default)]
pub struct ReplayAgent {
    queue: Mutex<VecDeque<Result<AgentResult, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ReplayAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: Result<AgentResult, String>) -> &Self {
        self.queue.lock().push_back(result);
        self
    }

    /// `(instruction, agent_id)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AgentInvoker for ReplayAgent {
    async fn invoke(&self, instruction: &str, agent_id: &str) -> Result<AgentResult, String> {
        self.calls
            .lock()
            .push((instruction.to_string(), agent_id.to_string()));
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("No agent response queued".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_is_lenient() {
        let result = AgentResult::from_value(&json!({
            "success": "yes",
            "response": {"result": null, "message": 5},
            "error": ""
        }));
        assert!(!result.success);
        assert_eq!(result.response, Some(AgentResponse::default()));
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_payload_requires_success_and_record() {
        assert!(AgentResult::ok(json!({"a": 1})).payload().is_some());
        assert!(AgentResult::ok(json!("{\"a\":1}")).payload().is_some());
        assert!(AgentResult::ok(json!("plain text")).payload().is_none());
        assert!(AgentResult::ok(json!([1])).payload().is_none());

        let mut declined = AgentResult::ok(json!({"a": 1}));
        declined.success = false;
        assert!(declined.payload().is_none());
    }

    #[test]
    fn test_failure_message_precedence() {
        let both = AgentResult {
            success: false,
            response: Some(AgentResponse {
                result: None,
                message: Some("from response".into()),
            }),
            error: Some("from error".into()),
        };
        assert_eq!(both.failure_message("fallback"), "from error");

        let response_only = AgentResult {
            error: None,
            ..both.clone()
        };
        assert_eq!(response_only.failure_message("fallback"), "from response");

        assert_eq!(AgentResult::default().failure_message("fallback"), "fallback");
    }

    #[tokio::test]
    async fn test_replay_agent_records_and_drains() {
        let agent = ReplayAgent::new();
        agent.push(Ok(AgentResult::declined("busy")));

        let first = agent.invoke("hello", "agent-1").await;
        assert_eq!(first, Ok(AgentResult::declined("busy")));
        assert!(agent.invoke("again", "agent-1").await.is_err());
        assert_eq!(agent.calls().len(), 2);
        assert_eq!(agent.calls()[0], ("hello".to_string(), "agent-1".to_string()));
    }
}
