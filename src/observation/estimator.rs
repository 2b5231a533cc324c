use super::{LocationSource, Sample};
use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Radio domain of an entity. Selects the signal offset used for weighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Wifi,
    Bluetooth,
}

impl Domain {
    /// Offset added to the signal before scaling: dBm for wifi, RSSI for Bluetooth.
    pub fn signal_offset(&self) -> f64 {
        match self {
            Domain::Wifi => 120.0,
            Domain::Bluetooth => 100.0,
        }
    }

    /// Centroid weight for one sample. Non-numeric signals weigh 1.
    pub fn weight(&self, signal: Option<f64>) -> f64 {
        match signal {
            Some(s) if s.is_finite() => ((self.signal_offset() + s) / 60.0).max(0.1),
            _ => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Wifi => "wifi",
            Domain::Bluetooth => "bluetooth",
        }
    }
}

/// Best-estimate position of an entity, derived from its observation log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocationEstimate {
    pub has_position: bool,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub provenance: Option<LocationSource>,
    pub contributors: usize,
}

impl LocationEstimate {
    fn none(contributors: usize) -> Self {
        Self {
            has_position: false,
            lat: None,
            lon: None,
            provenance: None,
            contributors,
        }
    }

    fn at(lat: f64, lon: f64, provenance: LocationSource, contributors: usize) -> Self {
        Self {
            has_position: true,
            lat: Some(lat),
            lon: Some(lon),
            provenance: Some(provenance),
            contributors,
        }
    }
}

/// Estimate a position from `samples`.
///
/// Only the latest in-window sample of each agent is used. A single agent's
/// sample passes through untouched; several agents are combined into a
/// signal-weighted centroid. Pure: no I/O, deterministic for a given
/// sample set and `now_ms`.
pub fn estimate(samples: &[Sample], domain: Domain, now_ms: i64, window_ms: i64) -> LocationEstimate {
    let cutoff = now_ms - window_ms;

    let mut latest: BTreeMap<AgentId, &Sample> = BTreeMap::new();
    for sample in samples
        .iter()
        .filter(|s| s.observed_at_ms >= cutoff && s.has_finite_position())
    {
        match latest.get(&sample.agent_id) {
            Some(existing) if existing.observed_at_ms >= sample.observed_at_ms => {}
            _ => {
                latest.insert(sample.agent_id, sample);
            }
        }
    }

    let contributors: Vec<&Sample> = latest.into_values().collect();

    match contributors.as_slice() {
        [] => LocationEstimate::none(0),
        [single] => LocationEstimate::at(single.lat, single.lon, single.source, 1),
        many => {
            let mut weighted_lat = 0.0;
            let mut weighted_lon = 0.0;
            let mut total_weight = 0.0;

            for sample in many {
                let weight = domain.weight(sample.signal);
                weighted_lat += sample.lat * weight;
                weighted_lon += sample.lon * weight;
                total_weight += weight;
            }

            if total_weight <= 0.0 {
                return LocationEstimate::none(many.len());
            }

            LocationEstimate::at(
                weighted_lat / total_weight,
                weighted_lon / total_weight,
                LocationSource::Centroid,
                many.len(),
            )
        }
    }
}
