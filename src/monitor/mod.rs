// Monitor alias overlay
//
// The controller's monitor map is authoritative but only arrives on a full
// refresh. Local overrides cover the gap between "monitor mode started or
// stopped here" and "the controller reports it". They are hints: each one is
// dropped as soon as the server map agrees with it.

use crate::agent::{Agent, AgentId, MonitorMap};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;


/// Pending local corrections: `managed → Some(alias)` (started) or `None` (stopped).
pub type Overrides = BTreeMap<String, Option<String>>;

/// Merge the server map with local overrides.
///
/// Returns the effective map and the overrides that the server has not yet
/// confirmed.
pub fn reconcile(server: &MonitorMap, overrides: &Overrides) -> (MonitorMap, Overrides) {
    let mut effective = server.clone();
    let mut surviving = Overrides::new();

    for (managed, alias) in overrides {
        match alias {
            Some(alias) => {
                if server.get(managed) != Some(alias) {
                    effective.insert(managed.clone(), alias.clone());
                    surviving.insert(managed.clone(), Some(alias.clone()));
                }
            }
            None => {
                if server.contains_key(managed) {
                    effective.remove(managed);
                    surviving.insert(managed.clone(), None);
                }
            }
        }
    }

    (effective, surviving)
}

/// Base interfaces plus every managed interface in the monitor map, in order,
/// without duplicates.
pub fn known_interfaces(base: &[String], effective: &MonitorMap) -> Vec<String> {
    let mut seen = HashSet::new();
    base.iter()
        .chain(effective.keys())
        .filter(|name| seen.insert(name.as_str().to_owned()))
        .cloned()
        .collect()
}

/// Per-agent effective monitor state.
pub struct MonitorOverlay {
    overrides: DashMap<AgentId, Overrides>,
    effective: DashMap<AgentId, MonitorMap>,
    interfaces: DashMap<AgentId, Vec<String>>,
}

impl MonitorOverlay {
    pub fn new() -> Self {
        Self {
            overrides: DashMap::new(),
            effective: DashMap::new(),
            interfaces: DashMap::new(),
        }
    }

    /// Rebuild from a full agent listing.
    ///
    /// Overrides belonging to agents that are no longer listed are discarded.
    pub fn replace_all(&self, agents: &[Agent]) {
        let listed: HashSet<AgentId> = agents.iter().map(|a| a.id).collect();
        self.overrides.retain(|id, _| listed.contains(id));
        self.effective.retain(|id, _| listed.contains(id));
        self.interfaces.retain(|id, _| listed.contains(id));

        for agent in agents {
            self.refresh_agent(agent);
        }
    }

    /// Recompute one agent's effective map from fresh metadata.
    pub fn refresh_agent(&self, agent: &Agent) {
        let server = agent.server_monitor_map();
        let pending = self
            .overrides
            .get(&agent.id)
            .map(|o| o.clone())
            .unwrap_or_default();

        let (effective, surviving) = reconcile(&server, &pending);

        if surviving.len() != pending.len() {
            debug!(
                agent_id = %agent.id,
                confirmed = pending.len() - surviving.len(),
                "Monitor overrides confirmed by controller"
            );
        }

        if surviving.is_empty() {
            self.overrides.remove(&agent.id);
        } else {
            self.overrides.insert(agent.id, surviving);
        }

        let interfaces = known_interfaces(&agent.base_interfaces(), &effective);
        self.interfaces.insert(agent.id, interfaces);
        self.effective.insert(agent.id, effective);
    }

    /// Apply a local monitor-mode change immediately and remember it until
    /// the controller confirms it.
    pub fn apply_local(&self, agent_id: AgentId, managed: &str, alias: Option<String>) {
        if managed.is_empty() {
            return;
        }

        self.overrides
            .entry(agent_id)
            .or_default()
            .insert(managed.to_string(), alias.clone());

        let mut map = self.effective.entry(agent_id).or_default();
        let mut interfaces = self.interfaces.entry(agent_id).or_default();

        match alias {
            Some(alias) => {
                map.insert(managed.to_string(), alias);
            }
            None => {
                if let Some(previous) = map.remove(managed) {
                    interfaces.retain(|name| name != &previous);
                }
            }
        }

        if !interfaces.iter().any(|name| name == managed) {
            interfaces.push(managed.to_string());
        }
    }

    /// Drop everything known about an agent.
    pub fn forget(&self, agent_id: AgentId) {
        self.overrides.remove(&agent_id);
        self.effective.remove(&agent_id);
        self.interfaces.remove(&agent_id);
    }

    /// Effective monitor map (server map with overrides applied).
    pub fn monitor_map(&self, agent_id: AgentId) -> MonitorMap {
        self.effective
            .get(&agent_id)
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Known interfaces: base interfaces ∪ managed interfaces in the effective map.
    pub fn interfaces(&self, agent_id: AgentId) -> Vec<String> {
        self.interfaces
            .get(&agent_id)
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    /// Monitor interface aliases currently in effect.
    pub fn aliases(&self, agent_id: AgentId) -> Vec<String> {
        self.effective
            .get(&agent_id)
            .map(|m| m.values().filter(|a| !a.is_empty()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn alias_for(&self, agent_id: AgentId, managed: &str) -> Option<String> {
        self.effective
            .get(&agent_id)
            .and_then(|m| m.get(managed).cloned())
    }

    pub fn pending_overrides(&self, agent_id: AgentId) -> Overrides {
        self.overrides
            .get(&agent_id)
            .map(|o| o.clone())
            .unwrap_or_default()
    }
}

impl Default for MonitorOverlay {
    fn default() -> Self {
        Self::new()
    }
}
