use super::{
    AgentRegistration, CaptureRequest, ClientError, ContinuousScan, ContinuousScanRequest,
    ContinuousScanStop, ControllerApi, DeauthRequest, Scan, ScanRequest,
};
use crate::agent::{Agent, AgentId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the controller REST API.
pub struct HttpControllerClient {
    http_client: Client,
    base_url: String,
}

impl HttpControllerClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .user_agent("sparrow-fusion/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.http_client.get(self.url(path)), path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.http_client.post(self.url(path)).json(body), path)
            .await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.http_client.delete(self.url(path)), path).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(path = %path, status = %status, bytes = body.len(), "Controller response");

        check_response_status(status, &body)?;

        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .map_err(|e| ClientError::Decode(format!("{}: {}", path, e)))?
        };
        serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{}: {}", path, e)))
    }
}

/// Map the response status to a client error.
///
/// - 404 → not found
/// - Other non-2xx → server error carrying the controller's `detail` text
fn check_response_status(status: StatusCode, body: &[u8]) -> Result<(), ClientError> {
    if status.is_success() {
        return Ok(());
    }

    let message = error_message(status, body);
    if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(message))
    } else {
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));

    match detail {
        Some(detail) => detail,
        None => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                text
            }
        }
    }
}

#[async_trait]
impl ControllerApi for HttpControllerClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, ClientError> {
        self.get("/api/agents").await
    }

    async fn get_agent(&self, agent_id: AgentId) -> Result<Agent, ClientError> {
        self.get(&format!("/api/agents/{}", agent_id)).await
    }

    async fn register_agent(&self, registration: &AgentRegistration) -> Result<Agent, ClientError> {
        self.post("/api/agents", registration).await
    }

    async fn delete_agent(&self, agent_id: AgentId) -> Result<(), ClientError> {
        let _: Value = self.delete(&format!("/api/agents/{}", agent_id)).await?;
        Ok(())
    }

    async fn get_agent_status(&self, agent_id: AgentId) -> Result<Value, ClientError> {
        self.get(&format!("/api/agents/{}/status", agent_id)).await
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<Scan>, ClientError> {
        self.get(&format!("/api/scans?limit={}", limit)).await
    }

    async fn list_continuous_scans(&self) -> Result<Vec<ContinuousScan>, ClientError> {
        self.get("/api/scans/continuous").await
    }

    async fn start_scan(&self, request: &ScanRequest) -> Result<Scan, ClientError> {
        self.post("/api/scans", request).await
    }

    async fn start_continuous_scan(&self, request: &ContinuousScanRequest) -> Result<(), ClientError> {
        let _: Value = self.post("/api/scans/continuous", request).await?;
        Ok(())
    }

    async fn stop_continuous_scan(&self, stop: &ContinuousScanStop) -> Result<(), ClientError> {
        let _: Value = self.post("/api/scans/continuous/stop", stop).await?;
        Ok(())
    }

    async fn start_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/monitor/start", agent_id);
        self.post(&path, &json!({ "interface": interface })).await
    }

    async fn stop_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/monitor/stop", agent_id);
        self.post(&path, &json!({ "interface": interface })).await
    }

    async fn start_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/scan/start", agent_id);
        self.post(&path, &json!({ "interface": interface })).await
    }

    async fn stop_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/scan/stop", agent_id);
        self.post(&path, &json!({ "interface": interface })).await
    }

    async fn get_attack_scan_status(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/scan/status", agent_id);
        let request = self
            .http_client
            .get(self.url(&path))
            .query(&[("interface", interface)]);
        self.send(request, &path).await
    }

    async fn get_attack_scan_results(&self, agent_id: AgentId) -> Result<Value, ClientError> {
        self.get(&format!("/api/falcon/{}/scan/results", agent_id)).await
    }

    async fn start_deauth(&self, agent_id: AgentId, request: &DeauthRequest) -> Result<Value, ClientError> {
        self.post(&format!("/api/falcon/{}/deauth", agent_id), request).await
    }

    async fn stop_all_deauths(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        let path = format!("/api/falcon/{}/deauth/stopall", agent_id);
        self.post(&path, &json!({ "interface": interface })).await
    }

    async fn start_capture(&self, agent_id: AgentId, request: &CaptureRequest) -> Result<Value, ClientError> {
        self.post(&format!("/api/falcon/{}/crack", agent_id), request).await
    }
}
