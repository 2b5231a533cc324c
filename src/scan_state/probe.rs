use serde::Serialize;
use serde_json::Value;

/// Tri-state reading of an attack-scan status payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Running,
    Stopped,
    /// Payload did not say; treated as not running
    Unknown,
}

impl ProbeStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ProbeStatus::Running)
    }
}

const STATE_FIELDS: [&str; 4] = ["state", "status", "scanstate", "scanState"];

/// Classify a status payload of unknown shape.
///
/// A boolean `running` field is authoritative. A string `running` accepts
/// `true/running/1` and `false/stopped/0/idle`. Otherwise the first string
/// among `state`, `status`, `scanstate`, `scanState` is matched against
/// `running/active` and `stopped/idle/complete`, case-insensitively.
pub fn classify_status(status: &Value) -> ProbeStatus {
    let Some(obj) = status.as_object() else {
        return ProbeStatus::Unknown;
    };

    match obj.get("running") {
        Some(Value::Bool(true)) => return ProbeStatus::Running,
        Some(Value::Bool(false)) => return ProbeStatus::Stopped,
        Some(Value::String(s)) => match s.to_lowercase().as_str() {
            "true" | "running" | "1" => return ProbeStatus::Running,
            "false" | "stopped" | "0" | "idle" => return ProbeStatus::Stopped,
            _ => {}
        },
        _ => {}
    }

    let state = STATE_FIELDS
        .iter()
        .filter_map(|name| obj.get(*name))
        .find_map(|v| v.as_str());

    match state.map(str::to_lowercase).as_deref() {
        Some("running") | Some("active") => ProbeStatus::Running,
        Some("stopped") | Some("idle") | Some("complete") => ProbeStatus::Stopped,
        _ => ProbeStatus::Unknown,
    }
}
