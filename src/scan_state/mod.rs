// Attack-scan state reconciliation
//
// Per agent the only states are Idle and Active. Transitions come from
// explicit start/stop actions, status probes, polling failures and agent
// removal; `transition` is the single place that decides them.

mod probe;
mod schedule;

pub use probe::{classify_status, ProbeStatus};
pub use schedule::PollSchedule;

use crate::agent::AgentId;
use dashmap::DashMap;
use serde::Serialize;
use tracing::info;


/// Attack-scan state of one agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Active { monitor_alias: String },
}

impl ScanState {
    pub fn is_active(&self) -> bool {
        matches!(self, ScanState::Active { .. })
    }

    pub fn monitor_alias(&self) -> Option<&str> {
        match self {
            ScanState::Active { monitor_alias } => Some(monitor_alias),
            ScanState::Idle => None,
        }
    }
}

/// Everything that can move an agent's scan state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanSignal {
    /// Explicit start succeeded on this monitor interface
    Started { monitor_alias: String },
    /// Explicit stop succeeded
    Stopped,
    /// Status probe reported a running scan on this interface
    ProbeRunning { monitor_alias: String },
    /// Status probe reported no running scan
    ProbeStopped,
    /// Agent or scan vanished (poll returned not-found)
    NotFound,
    /// Agent is no longer in the registry
    AgentRemoved,
}

/// Next state after `signal`. Total over every (state, signal) pair.
pub fn transition(_current: &ScanState, signal: &ScanSignal) -> ScanState {
    match signal {
        ScanSignal::Started { monitor_alias } | ScanSignal::ProbeRunning { monitor_alias } => {
            ScanState::Active {
                monitor_alias: monitor_alias.clone(),
            }
        }
        ScanSignal::Stopped
        | ScanSignal::ProbeStopped
        | ScanSignal::NotFound
        | ScanSignal::AgentRemoved => ScanState::Idle,
    }
}

/// Per-agent scan states. Agents without an entry are Idle.
pub struct ScanStateTable {
    states: DashMap<AgentId, ScanState>,
}

impl ScanStateTable {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn get(&self, agent_id: AgentId) -> ScanState {
        self.states
            .get(&agent_id)
            .map(|s| s.clone())
            .unwrap_or(ScanState::Idle)
    }

    pub fn is_active(&self, agent_id: AgentId) -> bool {
        self.get(agent_id).is_active()
    }

    pub fn monitor_alias(&self, agent_id: AgentId) -> Option<String> {
        self.get(agent_id).monitor_alias().map(str::to_string)
    }

    /// Apply `signal` and return the new state.
    pub fn apply(&self, agent_id: AgentId, signal: &ScanSignal) -> ScanState {
        let mut entry = self.states.entry(agent_id).or_insert(ScanState::Idle);
        let next = transition(entry.value(), signal);
        if *entry.value() != next {
            info!(agent_id = %agent_id, ?signal, from = ?entry.value(), to = ?next, "Scan state changed");
        }
        *entry.value_mut() = next.clone();
        drop(entry);

        if next == ScanState::Idle {
            self.states.remove(&agent_id);
        }
        next
    }

    /// Ids of agents currently Active.
    pub fn active_agents(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .states
            .iter()
            .filter(|s| s.value().is_active())
            .map(|s| *s.key())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ScanStateTable {
    fn default() -> Self {
        Self::new()
    }
}
