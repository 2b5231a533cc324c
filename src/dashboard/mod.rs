// Dashboard service: owns every table and runs the refresh tasks
//
// One instance per process, shared by `Arc` with the HTTP handlers and the
// background loops. Nothing here is global.

mod actions;
mod attack;
mod error;
mod launch;
mod polling;
mod refresh;

pub use actions::{AttackStatus, Launched};
pub use attack::{AttackResults, AttackView, NetworkRow};
pub use error::{DashboardError, ValidationError};
pub use launch::{
    LaunchPlan, ScanLaunch, DEFAULT_CONTINUOUS_INTERVAL_SECS, MIN_CONTINUOUS_INTERVAL_SECS,
};

use crate::agent::{Agent, AgentId, AgentRegistry, MonitorMap};
use crate::client::{ContinuousScan, ControllerApi, Scan};
use crate::config::DashboardConfig;
use crate::continuous::ContinuousRegistry;
use crate::index::EntityIndex;
use crate::ingest::IngestionGateway;
use crate::monitor::{MonitorOverlay, Overrides};
use crate::observation::Domain;
use crate::scan_state::{PollSchedule, ScanState, ScanStateTable};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, RwLock};


pub struct Dashboard {
    config: DashboardConfig,
    api: Arc<dyn ControllerApi>,
    agents: Arc<AgentRegistry>,
    overlay: MonitorOverlay,
    gateway: IngestionGateway,
    scan_states: ScanStateTable,
    schedule: PollSchedule,
    focus: Mutex<Option<AgentId>>,
    attack_results: DashMap<AgentId, AttackResults>,
    recent_scans: RwLock<Vec<Scan>>,
    continuous: ContinuousRegistry,
}

/// Agent detail returned when an agent gains focus.
#[derive(Clone, Debug, Serialize)]
pub struct AgentDetail {
    pub agent: Agent,
    /// Live status payload reported by the agent
    pub status: Value,
    pub scan_state: ScanState,
    pub monitor_map: MonitorMap,
    pub interfaces: Vec<String>,
}

/// Per-agent scan flags for the agent list.
#[derive(Clone, Debug, Serialize)]
pub struct AgentStateView {
    pub agent_id: AgentId,
    pub name: String,
    pub scan_state: ScanState,
    pub focused: bool,
    pub polling: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MonitorView {
    pub agent_id: AgentId,
    pub monitor_map: MonitorMap,
    pub interfaces: Vec<String>,
    pub aliases: Vec<String>,
    pub pending_overrides: Overrides,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScanSummary {
    #[serde(flatten)]
    pub scan: Scan,
    pub summary: String,
}

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl Dashboard {
    pub fn new(config: DashboardConfig, api: Arc<dyn ControllerApi>) -> Self {
        let window_ms = config.index.window_ms();
        let page_size = config.index.page_size;
        let agents = Arc::new(AgentRegistry::new());
        let gateway = IngestionGateway::new(
            agents.clone(),
            Arc::new(EntityIndex::new(Domain::Wifi, window_ms, page_size)),
            Arc::new(EntityIndex::new(Domain::Bluetooth, window_ms, page_size)),
        );

        Self {
            config,
            api,
            agents,
            overlay: MonitorOverlay::new(),
            gateway,
            scan_states: ScanStateTable::new(),
            schedule: PollSchedule::new(),
            focus: Mutex::new(None),
            attack_results: DashMap::new(),
            recent_scans: RwLock::new(Vec::new()),
            continuous: ContinuousRegistry::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn overlay(&self) -> &MonitorOverlay {
        &self.overlay
    }

    pub fn gateway(&self) -> &IngestionGateway {
        &self.gateway
    }

    pub fn wifi(&self) -> &EntityIndex {
        self.gateway.wifi()
    }

    pub fn bluetooth(&self) -> &EntityIndex {
        self.gateway.bluetooth()
    }

    pub fn continuous(&self) -> &ContinuousRegistry {
        &self.continuous
    }

    pub fn focused(&self) -> Option<AgentId> {
        *self.focus.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_focus(&self, agent_id: Option<AgentId>) {
        *self.focus.lock().unwrap_or_else(|e| e.into_inner()) = agent_id;
    }

    pub fn scan_state(&self, agent_id: AgentId) -> ScanState {
        self.scan_states.get(agent_id)
    }

    /// Agent currently being polled for attack results.
    pub fn polling_agent(&self) -> Option<AgentId> {
        self.schedule.polling()
    }

    pub fn agent_states(&self) -> Vec<AgentStateView> {
        let focused = self.focused();
        let polling = self.polling_agent();
        self.agents
            .all()
            .into_iter()
            .map(|agent| AgentStateView {
                agent_id: agent.id,
                name: agent.display_name(),
                scan_state: self.scan_states.get(agent.id),
                focused: focused == Some(agent.id),
                polling: polling == Some(agent.id),
            })
            .collect()
    }

    pub fn monitor_view(&self, agent_id: AgentId) -> Option<MonitorView> {
        if !self.agents.contains(agent_id) {
            return None;
        }
        Some(MonitorView {
            agent_id,
            monitor_map: self.overlay.monitor_map(agent_id),
            interfaces: self.overlay.interfaces(agent_id),
            aliases: self.overlay.aliases(agent_id),
            pending_overrides: self.overlay.pending_overrides(agent_id),
        })
    }

    pub fn attack_results(&self, agent_id: AgentId) -> Option<AttackResults> {
        self.attack_results.get(&agent_id).map(|r| r.clone())
    }

    pub fn attack_view(&self, agent_id: AgentId, network_page: usize, client_page: usize) -> Option<AttackView> {
        self.attack_results.get(&agent_id).map(|results| {
            results.view(network_page, client_page, self.config.index.attack_page_size)
        })
    }

    pub fn recent_scans(&self) -> Vec<ScanSummary> {
        self.recent_scans
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|scan| ScanSummary {
                summary: scan.summary(),
                scan: scan.clone(),
            })
            .collect()
    }

    pub fn continuous_scans(&self) -> Vec<ContinuousScan> {
        self.continuous.list()
    }

    /// Drop every local trace of an agent. The controller is not told.
    pub fn forget_agent(&self, agent_id: AgentId) {
        self.mark_idle(agent_id, &crate::scan_state::ScanSignal::AgentRemoved);
        self.agents.remove(agent_id);
        self.overlay.forget(agent_id);
        self.attack_results.remove(&agent_id);

        let mut focus = self.focus.lock().unwrap_or_else(|e| e.into_inner());
        if *focus == Some(agent_id) {
            *focus = None;
        }
    }
}
