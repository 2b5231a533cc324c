use super::ValidationError;
use crate::agent::AgentId;
use crate::client::{ContinuousScanRequest, ScanRequest};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_CONTINUOUS_INTERVAL_SECS: u64 = 10;
pub const MIN_CONTINUOUS_INTERVAL_SECS: u64 = 2;

/// Scan launch form as submitted by the view layer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScanLaunch {
    pub agent_id: AgentId,
    pub scan_type: String,
    #[serde(default)]
    pub interface: Option<String>,
    /// Comma-separated channel list
    #[serde(default)]
    pub channels: Option<String>,
    /// JSON object text
    #[serde(default)]
    pub extras: Option<String>,
    #[serde(default)]
    pub continuous: bool,
    #[serde(default)]
    pub interval_seconds: Option<i64>,
}

/// Validated launch: either a one-shot scan or a continuous loop.
#[derive(Clone, Debug, PartialEq)]
pub enum LaunchPlan {
    Once(ScanRequest),
    Continuous(ContinuousScanRequest),
}

impl ScanLaunch {
    /// Validate and build the controller request.
    ///
    /// Continuous launches are only honoured for wifi; anything else
    /// becomes a one-shot scan.
    pub fn plan(&self) -> Result<LaunchPlan, ValidationError> {
        let request = ScanRequest {
            agent_id: self.agent_id,
            scan_type: self.scan_type.clone(),
            interface: self
                .interface
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            channels: self.channels.as_deref().and_then(parse_channels),
            extras: match self.extras.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => Some(parse_extras(text)?),
                _ => None,
            },
        };

        if self.continuous && self.scan_type == "wifi" {
            let interval_seconds = match self.interval_seconds {
                Some(secs) => secs.max(MIN_CONTINUOUS_INTERVAL_SECS as i64) as u64,
                None => DEFAULT_CONTINUOUS_INTERVAL_SECS,
            };
            Ok(LaunchPlan::Continuous(ContinuousScanRequest {
                scan: request,
                interval_seconds,
            }))
        } else {
            Ok(LaunchPlan::Once(request))
        }
    }
}

fn parse_channels(text: &str) -> Option<Vec<u32>> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        text.split(',')
            .filter_map(|part| part.trim().parse::<u32>().ok())
            .collect(),
    )
}

fn parse_extras(text: &str) -> Result<serde_json::Map<String, Value>, ValidationError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ValidationError::ExtrasNotObject(format!(
            "got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ValidationError::ExtrasNotObject(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
