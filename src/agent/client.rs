//! HTTP client for the agent endpoint.
//!
//! Uses reqwest with optional Bearer token auth. Every call is a JSON POST of
//! `{ "message": ..., "agent_id": ... }` to the configured endpoint.

use async_trait::async_trait;
use serde::Serialize;

use super::{AgentInvoker, AgentResult};

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    message: &'a str,
    agent_id: &'a str,
}

pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAgentClient {
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentInvoker for HttpAgentClient {
    async fn invoke(&self, instruction: &str, agent_id: &str) -> Result<AgentResult, String> {
        let body = InvokeRequest {
            message: instruction,
            agent_id,
        };
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| format!("Agent request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Agent API error {}: {}", status, text));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse agent response: {}", e))?;

        Ok(AgentResult::from_value(&json))
    }
}
