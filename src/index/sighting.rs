use crate::agent::{AgentId, GpsFix};
use crate::value;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of physical entity a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Wifi access point
    Network,
    /// Wifi station; shares the wifi pipeline with networks
    Client,
    Bluetooth,
}

impl EntityKind {
    /// Name shown when the report carries none.
    pub fn fallback_name(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Network | EntityKind::Bluetooth => "Unknown",
        }
    }
}

/// One normalised report of an entity from a scan payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Sighting {
    /// Lower-cased hardware address, never empty
    pub address: String,
    pub kind: EntityKind,
    pub name: Option<String>,
    pub channel: Option<String>,
    pub signal: Option<f64>,
    /// Device's own fix, present only when flagged valid with finite coordinates
    pub device_fix: Option<GpsFix>,
    /// Entity's own last/first-seen time, epoch ms
    pub reported_at_ms: Option<i64>,
}

const SEEN_FIELDS: [&str; 4] = ["lastseen", "lastSeen", "firstseen", "firstSeen"];
const VALID_FIELDS: [&str; 2] = ["gpsvalid", "gpsValid"];

impl Sighting {
    /// Parse a wifi network or client item. `None` when it has no address.
    ///
    /// Wifi items without a validity flag are taken as valid.
    pub fn from_wifi(item: &Value, kind: EntityKind) -> Option<Self> {
        let address = address(item, &["macAddr", "macaddr"])?;
        let gps_valid = value::field(item, &VALID_FIELDS).map_or(true, value::truthy);

        Some(Self {
            address,
            kind,
            name: value::field(item, &["ssid", "name"]).and_then(value::text),
            channel: value::field(item, &["channel"]).and_then(value::text),
            signal: value::field(item, &["signal", "power"]).and_then(value::number),
            device_fix: device_fix(item, gps_valid),
            reported_at_ms: value::field(item, &SEEN_FIELDS).and_then(value::timestamp_ms),
        })
    }

    /// Parse a Bluetooth device item. `None` when it has no address.
    ///
    /// Bluetooth items without a validity flag are taken as invalid.
    pub fn from_bluetooth(item: &Value) -> Option<Self> {
        let address = address(item, &["mac", "macAddr"])?;
        let gps_valid = value::field(item, &VALID_FIELDS).map_or(false, value::truthy);

        Some(Self {
            address,
            kind: EntityKind::Bluetooth,
            name: value::field(item, &["name"]).and_then(value::text),
            channel: None,
            signal: value::field(item, &["rssi", "signal"]).and_then(value::number),
            device_fix: device_fix(item, gps_valid),
            reported_at_ms: value::field(item, &SEEN_FIELDS).and_then(value::timestamp_ms),
        })
    }
}

fn address(item: &Value, names: &[&str]) -> Option<String> {
    value::field(item, names)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn device_fix(item: &Value, gps_valid: bool) -> Option<GpsFix> {
    if !gps_valid {
        return None;
    }
    let lat = value::field(item, &["lat", "latitude"]).and_then(value::number)?;
    let lon = value::field(item, &["lon", "longitude"]).and_then(value::number)?;
    Some(GpsFix { lat, lon })
}

/// Provenance of the scan that carried a batch of sightings.
#[derive(Clone, Debug, PartialEq)]
pub struct SightingContext {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub scan_id: Option<i64>,
    pub scan_type: String,
    /// Scan timestamp, epoch ms; upper bound for every entity timestamp
    pub scan_ts_ms: i64,
}

impl SightingContext {
    /// Entity timestamp clamped to the scan timestamp; missing or zero
    /// timestamps fall back to the scan's.
    pub fn clamp(&self, reported_at_ms: Option<i64>) -> i64 {
        match reported_at_ms {
            Some(ts) if ts != 0 => ts.min(self.scan_ts_ms),
            _ => self.scan_ts_ms,
        }
    }
}
