// Agent metadata cache

use crate::value;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};


/// Controller-assigned agent identifier.
pub type AgentId = i64;

/// `managed interface → monitor interface alias`
pub type MonitorMap = BTreeMap<String, String>;

/// Agent metadata as returned by the controller.
///
/// The core never owns agent lifecycle; this is a cached copy rebuilt on
/// every full refresh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Declared interfaces, keyed by interface name
    #[serde(default)]
    pub interfaces: Option<Map<String, Value>>,

    /// Server-declared monitor map; values may be null or empty
    #[serde(default)]
    pub monitor_map: Option<Map<String, Value>>,

    /// Raw GPS block, `{"gpspos": {"latitude": .., "longitude": ..}, ..}`
    #[serde(default)]
    pub gps: Option<Value>,
}

/// A finite GPS position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GpsFix {
    pub lat: f64,
    pub lon: f64,
}

impl Agent {
    /// Name for display, falling back to "Agent {id}".
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Agent {}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Declared base interface names.
    pub fn base_interfaces(&self) -> Vec<String> {
        self.interfaces
            .as_ref()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Server monitor map with null/empty aliases removed.
    pub fn server_monitor_map(&self) -> MonitorMap {
        self.monitor_map
            .as_ref()
            .map(|m| {
                m.iter()
                    .filter_map(|(managed, alias)| {
                        value::text(alias).map(|alias| (managed.clone(), alias))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The agent's own GPS fix, when it reports finite coordinates.
    pub fn gps_fix(&self) -> Option<GpsFix> {
        let pos = self.gps.as_ref()?.get("gpspos")?;
        let lat = value::number(pos.get("latitude")?)?;
        let lon = value::number(pos.get("longitude")?)?;
        Some(GpsFix { lat, lon })
    }
}

/// Concurrent agent cache keyed by id.
pub struct AgentRegistry {
    agents: DashMap<AgentId, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: DashMap::new(),
        }
    }

    /// Replace the whole cache with a fresh listing.
    ///
    /// Unlisted agents are dropped first; listed agents are overwritten in
    /// place, so a listed id is never briefly absent.
    pub fn replace_all(&self, agents: &[Agent]) {
        let listed: HashSet<AgentId> = agents.iter().map(|a| a.id).collect();
        self.agents.retain(|id, _| listed.contains(id));
        for agent in agents {
            self.agents.insert(agent.id, agent.clone());
        }
    }

    pub fn upsert(&self, agent: Agent) {
        self.agents.insert(agent.id, agent);
    }

    pub fn remove(&self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id).map(|(_, agent)| agent)
    }

    pub fn get(&self, id: AgentId) -> Option<Agent> {
        self.agents.get(&id).map(|a| a.clone())
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn display_name(&self, id: AgentId) -> String {
        self.agents
            .get(&id)
            .map(|a| a.display_name())
            .unwrap_or_else(|| format!("Agent {}", id))
    }

    pub fn gps_fix(&self, id: AgentId) -> Option<GpsFix> {
        self.agents.get(&id).and_then(|a| a.gps_fix())
    }

    /// All cached agents ordered by id.
    pub fn all(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self.agents.iter().map(|a| a.value().clone()).collect();
        agents.sort_by_key(|a| a.id);
        agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
