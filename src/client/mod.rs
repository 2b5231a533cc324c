//! Controller service boundary.
//!
//! [`ControllerApi`] is the seam between the core and the remote controller
//! that fronts the agents. [`HttpControllerClient`] implements it over HTTP;
//! tests substitute their own implementations.

mod error;
mod http;
mod types;

pub use error::ClientError;
pub use http::HttpControllerClient;
pub use types::{
    AgentRegistration, CaptureRequest, ContinuousScan, ContinuousScanRequest, ContinuousScanStop,
    DeauthRequest, Scan, ScanRequest,
};

use crate::agent::{Agent, AgentId};
use async_trait::async_trait;
use serde_json::Value;

/// Operations the core consumes from the controller service.
///
/// Payload shapes owned by the remote agents (status, results) stay as raw
/// JSON and are interpreted tolerantly by the core.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<Agent>, ClientError>;

    async fn get_agent(&self, agent_id: AgentId) -> Result<Agent, ClientError>;

    async fn register_agent(&self, registration: &AgentRegistration) -> Result<Agent, ClientError>;

    async fn delete_agent(&self, agent_id: AgentId) -> Result<(), ClientError>;

    /// Live interface/Bluetooth status reported by the agent.
    async fn get_agent_status(&self, agent_id: AgentId) -> Result<Value, ClientError>;

    /// Most recent scans, newest first.
    async fn list_scans(&self, limit: usize) -> Result<Vec<Scan>, ClientError>;

    async fn list_continuous_scans(&self) -> Result<Vec<ContinuousScan>, ClientError>;

    async fn start_scan(&self, request: &ScanRequest) -> Result<Scan, ClientError>;

    async fn start_continuous_scan(&self, request: &ContinuousScanRequest) -> Result<(), ClientError>;

    async fn stop_continuous_scan(&self, stop: &ContinuousScanStop) -> Result<(), ClientError>;

    /// Put `interface` into monitor mode. The response names the alias.
    async fn start_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    async fn stop_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    async fn start_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    async fn stop_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    async fn get_attack_scan_status(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    async fn get_attack_scan_results(&self, agent_id: AgentId) -> Result<Value, ClientError>;

    async fn start_deauth(&self, agent_id: AgentId, request: &DeauthRequest) -> Result<Value, ClientError>;

    async fn stop_all_deauths(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError>;

    /// Start a handshake capture for offline cracking.
    async fn start_capture(&self, agent_id: AgentId, request: &CaptureRequest) -> Result<Value, ClientError>;
}

#[cfg(test)]
pub(crate) mod mock;
