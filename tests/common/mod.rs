// Shared fixtures for integration tests

use async_trait::async_trait;
use serde_json::{json, Value};
use sparrow_fusion::agent::{Agent, AgentId};
use sparrow_fusion::client::{
    AgentRegistration, CaptureRequest, ClientError, ContinuousScan, ContinuousScanRequest,
    ContinuousScanStop, ControllerApi, DeauthRequest, Scan, ScanRequest,
};
use sparrow_fusion::config::DashboardConfig;
use sparrow_fusion::dashboard::Dashboard;
use std::sync::{Arc, Mutex};

/// Controller stub with a fixed agent list and scan history.
#[derive(Default)]
pub struct StubController {
    pub agents: Mutex<Vec<Agent>>,
    pub scans: Mutex<Vec<Scan>>,
    pub launched: Mutex<Vec<ScanRequest>>,
}

#[async_trait]
impl ControllerApi for StubController {
    async fn list_agents(&self) -> Result<Vec<Agent>, ClientError> {
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn get_agent(&self, agent_id: AgentId) -> Result<Agent, ClientError> {
        self.agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == agent_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Agent not found".to_string()))
    }

    async fn register_agent(&self, registration: &AgentRegistration) -> Result<Agent, ClientError> {
        let mut agents = self.agents.lock().unwrap();
        let id = agents.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let mut agent = agent(id, 10.0, 40.0);
        agent.name = registration.name.clone();
        agent.base_url = registration.base_url.clone();
        agents.push(agent.clone());
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: AgentId) -> Result<(), ClientError> {
        self.agents.lock().unwrap().retain(|a| a.id != agent_id);
        Ok(())
    }

    async fn get_agent_status(&self, _agent_id: AgentId) -> Result<Value, ClientError> {
        Ok(json!({"interfaces": {}}))
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<Scan>, ClientError> {
        Ok(self.scans.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn list_continuous_scans(&self) -> Result<Vec<ContinuousScan>, ClientError> {
        Ok(Vec::new())
    }

    async fn start_scan(&self, request: &ScanRequest) -> Result<Scan, ClientError> {
        self.launched.lock().unwrap().push(request.clone());
        Ok(Scan {
            id: 1,
            agent_id: request.agent_id,
            scan_type: request.scan_type.clone(),
            status: "pending".to_string(),
            response_payload: None,
            error: None,
            created_at: None,
        })
    }

    async fn start_continuous_scan(&self, _request: &ContinuousScanRequest) -> Result<(), ClientError> {
        Ok(())
    }

    async fn stop_continuous_scan(&self, _stop: &ContinuousScanStop) -> Result<(), ClientError> {
        Err(ClientError::NotFound("Continuous scan not found".to_string()))
    }

    async fn start_monitor_mode(&self, _agent_id: AgentId, interface: &str) -> Result<Value, ClientError> {
        Ok(json!({"monitorInterface": format!("{}mon", interface)}))
    }

    async fn stop_monitor_mode(&self, _agent_id: AgentId, _interface: &str) -> Result<Value, ClientError> {
        Ok(json!({}))
    }

    async fn start_attack_scan(&self, _agent_id: AgentId, _interface: &str) -> Result<Value, ClientError> {
        Ok(json!({}))
    }

    async fn stop_attack_scan(&self, _agent_id: AgentId, _interface: &str) -> Result<Value, ClientError> {
        Ok(json!({}))
    }

    async fn get_attack_scan_status(&self, _agent_id: AgentId, _interface: &str) -> Result<Value, ClientError> {
        Err(ClientError::Transport("agent offline".to_string()))
    }

    async fn get_attack_scan_results(&self, _agent_id: AgentId) -> Result<Value, ClientError> {
        Ok(json!({"networks": [], "clients": []}))
    }

    async fn start_deauth(&self, _agent_id: AgentId, request: &DeauthRequest) -> Result<Value, ClientError> {
        Ok(json!({"status": "started", "ap": request.apmacaddr}))
    }

    async fn stop_all_deauths(&self, _agent_id: AgentId, _interface: &str) -> Result<Value, ClientError> {
        Ok(json!({"status": "stopped"}))
    }

    async fn start_capture(&self, _agent_id: AgentId, _request: &CaptureRequest) -> Result<Value, ClientError> {
        Err(ClientError::Server {
            status: 502,
            message: "Unable to reach agent".to_string(),
        })
    }
}

pub fn agent(id: AgentId, lat: f64, lon: f64) -> Agent {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("sensor-{}", id),
        "interfaces": {"wlan0": {}, "wlan1": {}},
        "monitor_map": {"wlan1": "wlan1mon"},
        "gps": {"gpspos": {"latitude": lat, "longitude": lon}}
    }))
    .unwrap()
}

/// Dashboard over a stub with agents 1 and 2, already refreshed.
pub async fn dashboard() -> (Arc<StubController>, Arc<Dashboard>) {
    let stub = Arc::new(StubController {
        agents: Mutex::new(vec![agent(1, 10.0, 20.0), agent(2, 10.0, 30.0)]),
        ..Default::default()
    });
    let api: Arc<dyn ControllerApi> = stub.clone();
    let dashboard = Arc::new(Dashboard::new(DashboardConfig::default(), api));
    dashboard.refresh_agents().await.unwrap();
    (stub, dashboard)
}
