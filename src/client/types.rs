use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scan job as listed by the controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scan {
    pub id: i64,
    pub agent_id: AgentId,
    pub scan_type: String,

    #[serde(default)]
    pub status: String,

    /// Agent's scan output: `{networks?, clients?, devices?, created_at?}`
    #[serde(default)]
    pub response_payload: Option<Value>,

    #[serde(default)]
    pub error: Option<String>,

    /// Controller timestamp, RFC 3339 or naive UTC
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl Scan {
    /// One-line description of the result for history listings.
    pub fn summary(&self) -> String {
        if let Some(payload) = &self.response_payload {
            for key in ["networks", "clients", "devices"] {
                if let Some(items) = payload.get(key).and_then(Value::as_array) {
                    return format!("{} {}", items.len(), key);
                }
            }
            return payload.to_string();
        }
        self.error.clone().unwrap_or_default()
    }
}

/// A repeating background scan job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScan {
    pub agent_id: AgentId,
    pub scan_type: String,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub interval_seconds: u64,
}

/// Body of `POST /api/scans`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanRequest {
    pub agent_id: AgentId,
    pub scan_type: String,
    pub interface: Option<String>,
    pub channels: Option<Vec<u32>>,
    pub extras: Option<Map<String, Value>>,
}

/// Body of `POST /api/scans/continuous`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContinuousScanRequest {
    #[serde(flatten)]
    pub scan: ScanRequest,
    pub interval_seconds: u64,
}

/// Body of `POST /api/scans/continuous/stop`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContinuousScanStop {
    pub agent_id: AgentId,
    pub interface: Option<String>,
    pub scan_type: String,
}

/// Body of `POST /api/agents`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_crack_type() -> String {
    "wpapsk".to_string()
}

/// Body of `POST /api/falcon/{id}/deauth`. An empty station targets broadcast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeauthRequest {
    pub interface: String,
    pub apmacaddr: String,
    #[serde(default)]
    pub stationmacaddr: String,
    pub channel: u32,
    #[serde(default = "default_true")]
    pub continuous: bool,
}

/// Body of `POST /api/falcon/{id}/crack`: handshake capture against one AP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub interface: String,
    pub channel: u32,
    #[serde(default)]
    pub ssid: String,
    pub apmacaddr: String,
    #[serde(default = "default_crack_type")]
    pub cracktype: String,
    #[serde(default)]
    pub hasclient: bool,
}
