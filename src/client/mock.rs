// In-memory controller used by unit tests

use super::{
    AgentRegistration, CaptureRequest, ClientError, ContinuousScan, ContinuousScanRequest,
    ContinuousScanStop, ControllerApi, DeauthRequest, Scan, ScanRequest,
};
use crate::agent::{Agent, AgentId};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct MockController {
    pub agents: Mutex<Vec<Agent>>,
    /// Attack-scan status by monitor alias; missing aliases answer with an error
    pub probes: Mutex<HashMap<String, Result<Value, ClientError>>>,
    pub results: Mutex<Option<Result<Value, ClientError>>>,
    /// When set, result fetches wait for a notification before answering
    pub results_gate: Mutex<Option<Arc<Notify>>>,
    pub status_error: Mutex<Option<ClientError>>,
    pub action_error: Mutex<Option<ClientError>>,
    pub scans: Mutex<Vec<Scan>>,
    pub continuous: Mutex<Vec<ContinuousScan>>,
    pub continuous_error: Mutex<Option<ClientError>>,
    pub launched: Mutex<Vec<ScanRequest>>,
    pub deauths: Mutex<Vec<DeauthRequest>>,
    pub captures: Mutex<Vec<CaptureRequest>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_agents(agents: Vec<Agent>) -> Arc<Self> {
        let mock = Self::default();
        *mock.agents.lock().unwrap() = agents;
        Arc::new(mock)
    }

    pub fn set_probe(&self, alias: &str, status: Result<Value, ClientError>) {
        self.probes.lock().unwrap().insert(alias.to_string(), status);
    }

    pub fn set_results(&self, results: Result<Value, ClientError>) {
        *self.results.lock().unwrap() = Some(results);
    }

    pub fn set_agents(&self, agents: Vec<Agent>) {
        *self.agents.lock().unwrap() = agents;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn action(&self, call: String, response: Value) -> Result<Value, ClientError> {
        self.record(call);
        match self.action_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn list_agents(&self) -> Result<Vec<Agent>, ClientError> {
        self.record("list_agents".to_string());
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn get_agent(&self, agent_id: AgentId) -> Result<Agent, ClientError> {
        self.record(format!("get_agent:{}", agent_id));
        self.agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == agent_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Agent not found".to_string()))
    }

    async fn register_agent(&self, registration: &AgentRegistration) -> Result<Agent, ClientError> {
        self.record(format!("register_agent:{}", registration.name));
        let mut agents = self.agents.lock().unwrap();
        let id = agents.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let agent: Agent = serde_json::from_value(json!({
            "id": id,
            "name": registration.name,
            "base_url": registration.base_url,
            "capabilities": registration.capabilities,
        }))
        .unwrap();
        agents.push(agent.clone());
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: AgentId) -> Result<(), ClientError> {
        self.record(format!("delete_agent:{}", agent_id));
        let mut agents = self.agents.lock().unwrap();
        let before = agents.len();
        agents.retain(|a| a.id != agent_id);
        if agents.len() == before {
            Err(ClientError::NotFound("Agent not found".to_string()))
        } else {
            Ok(())
        }
    }

    async fn get_agent_status(&self, agent_id: AgentId) -> Result<Value, ClientError> {
        self.record(format!("get_agent_status:{}", agent_id));
        match self.status_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(json!({"interfaces": {}})),
        }
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<Scan>, ClientError> {
        self.record(format!("list_scans:{}", limit));
        Ok(self.scans.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn list_continuous_scans(&self) -> Result<Vec<ContinuousScan>, ClientError> {
        self.record("list_continuous_scans".to_string());
        match self.continuous_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(self.continuous.lock().unwrap().clone()),
        }
    }

    async fn start_scan(&self, request: &ScanRequest) -> Result<Scan, ClientError> {
        self.record(format!("start_scan:{}", request.agent_id));
        self.launched.lock().unwrap().push(request.clone());
        Ok(Scan {
            id: 100,
            agent_id: request.agent_id,
            scan_type: request.scan_type.clone(),
            status: "pending".to_string(),
            response_payload: None,
            error: None,
            created_at: None,
        })
    }

    async fn start_continuous_scan(&self, request: &ContinuousScanRequest) -> Result<(), ClientError> {
        self.record(format!("start_continuous_scan:{}", request.scan.agent_id));
        self.continuous.lock().unwrap().push(ContinuousScan {
            agent_id: request.scan.agent_id,
            scan_type: request.scan.scan_type.clone(),
            interface: request.scan.interface.clone(),
            interval_seconds: request.interval_seconds,
        });
        Ok(())
    }

    async fn stop_continuous_scan(&self, stop: &ContinuousScanStop) -> Result<(), ClientError> {
        self.record(format!("stop_continuous_scan:{}", stop.agent_id));
        let mut loops = self.continuous.lock().unwrap();
        let before = loops.len();
        loops.retain(|c| {
            !(c.agent_id == stop.agent_id
                && c.scan_type == stop.scan_type
                && c.interface == stop.interface)
        });
        if loops.len() == before {
            Err(ClientError::NotFound("Continuous scan not found".to_string()))
        } else {
            Ok(())
        }
    }

    async fn start_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.action(
            format!("start_monitor_mode:{}:{}", agent_id, interface),
            json!({"interface": format!("{}mon", interface)}),
        )
    }

    async fn stop_monitor_mode(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.action(
            format!("stop_monitor_mode:{}:{}", agent_id, interface),
            json!({"status": "ok"}),
        )
    }

    async fn start_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.action(
            format!("start_attack_scan:{}:{}", agent_id, interface),
            json!({"status": "started"}),
        )
    }

    async fn stop_attack_scan(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.action(
            format!("stop_attack_scan:{}:{}", agent_id, interface),
            json!({"status": "stopped"}),
        )
    }

    async fn get_attack_scan_status(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.record(format!("get_attack_scan_status:{}:{}", agent_id, interface));
        self.probes
            .lock()
            .unwrap()
            .get(interface)
            .cloned()
            .unwrap_or_else(|| Err(ClientError::Transport("no response".to_string())))
    }

    async fn get_attack_scan_results(&self, agent_id: AgentId) -> Result<Value, ClientError> {
        self.record(format!("get_attack_scan_results:{}", agent_id));
        let gate = self.results_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.results
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(json!({"networks": [], "clients": []})))
    }

    async fn start_deauth(&self, agent_id: AgentId, request: &DeauthRequest) -> Result<Value, ClientError> {
        self.deauths.lock().unwrap().push(request.clone());
        self.action(
            format!("start_deauth:{}:{}", agent_id, request.interface),
            json!({"status": "started"}),
        )
    }

    async fn stop_all_deauths(&self, agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        self.action(
            format!("stop_all_deauths:{}:{}", agent_id, interface),
            json!({"status": "stopped"}),
        )
    }

    async fn start_capture(&self, agent_id: AgentId, request: &CaptureRequest) -> Result<Value, ClientError> {
        self.captures.lock().unwrap().push(request.clone());
        self.action(
            format!("start_capture:{}:{}", agent_id, request.interface),
            json!({"status": "capturing"}),
        )
    }
}
