use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Where a position came from.
///
/// Samples only ever carry `Device`, `Agent` or `Unknown`; `Centroid` is
/// produced by the estimator when several agents contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// The sighted device reported its own GPS fix
    Device,
    /// The scanning agent's GPS fix stood in for the device
    Agent,
    /// Signal-weighted centroid of several agents
    Centroid,
    Unknown,
}

impl LocationSource {
    /// Human label used by the view layer.
    pub fn label(&self) -> &'static str {
        match self {
            LocationSource::Device => "Direct",
            LocationSource::Agent => "Agent GPS",
            LocationSource::Centroid => "Centroid",
            LocationSource::Unknown => "Unknown",
        }
    }
}

/// One raw position/signal reading of an entity from one agent at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Lower-cased hardware address
    pub entity_key: String,
    pub agent_id: AgentId,
    pub lat: f64,
    pub lon: f64,
    /// dBm (wifi) or RSSI (Bluetooth); `None` when the report had no numeric value
    pub signal: Option<f64>,
    pub source: LocationSource,
    /// Unix epoch milliseconds
    pub observed_at_ms: i64,
}

impl Sample {
    pub fn has_finite_position(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}
