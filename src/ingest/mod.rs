// Ingestion gateway
//
// The single writer of the observation stores and entity indexes. Scan poll
// responses and push events both end up in `IngestionGateway::ingest`.

use crate::agent::{AgentId, AgentRegistry};
use crate::index::{EntityIndex, EntityKind, Sighting, SightingContext};
use crate::value;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};


/// Where a payload came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanContext {
    pub agent_id: AgentId,
    pub scan_type: String,
    pub scan_id: Option<i64>,
    /// Scan record's own timestamp, used when the payload carries none
    pub created_at: Option<Value>,
}

/// Counts of what one payload contributed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub networks: usize,
    pub clients: usize,
    pub devices: usize,
    /// Items without an address
    pub dropped: usize,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.networks + self.clients + self.devices
    }
}

pub struct IngestionGateway {
    agents: Arc<AgentRegistry>,
    wifi: Arc<EntityIndex>,
    bluetooth: Arc<EntityIndex>,
}

impl IngestionGateway {
    pub fn new(agents: Arc<AgentRegistry>, wifi: Arc<EntityIndex>, bluetooth: Arc<EntityIndex>) -> Self {
        Self {
            agents,
            wifi,
            bluetooth,
        }
    }

    pub fn wifi(&self) -> &Arc<EntityIndex> {
        &self.wifi
    }

    pub fn bluetooth(&self) -> &Arc<EntityIndex> {
        &self.bluetooth
    }

    /// Feed a normalised payload `{networks?, clients?, devices?, created_at?}`
    /// into the indexes.
    ///
    /// Re-ingesting the same payload leaves the indexes unchanged.
    pub fn ingest(&self, payload: &Value, ctx: &ScanContext, now_ms: i64) -> IngestSummary {
        let mut summary = IngestSummary::default();
        if !payload.is_object() {
            return summary;
        }

        let sighting_ctx = SightingContext {
            agent_id: ctx.agent_id,
            agent_name: self.agents.display_name(ctx.agent_id),
            scan_id: ctx.scan_id,
            scan_type: ctx.scan_type.clone(),
            scan_ts_ms: scan_timestamp(payload, ctx, now_ms),
        };
        let agent_fix = self.agents.gps_fix(ctx.agent_id);

        let mut wifi = Vec::new();
        for (key, kind) in [("networks", EntityKind::Network), ("clients", EntityKind::Client)] {
            for item in items(payload, key) {
                match Sighting::from_wifi(item, kind) {
                    Some(sighting) => wifi.push(sighting),
                    None => {
                        summary.dropped += 1;
                        debug!(agent_id = %ctx.agent_id, list = key, "Dropping wifi item without address");
                    }
                }
            }
        }

        let mut devices = Vec::new();
        for item in items(payload, "devices") {
            match Sighting::from_bluetooth(item) {
                Some(sighting) => devices.push(sighting),
                None => {
                    summary.dropped += 1;
                    debug!(agent_id = %ctx.agent_id, "Dropping bluetooth item without address");
                }
            }
        }

        let has_wifi = !wifi.is_empty();
        for sighting in dedup_last(wifi) {
            match sighting.kind {
                EntityKind::Client => summary.clients += 1,
                _ => summary.networks += 1,
            }
            self.wifi.apply(&sighting, &sighting_ctx, agent_fix, now_ms);
        }
        if has_wifi {
            self.wifi.settle_page();
        }

        let has_devices = !devices.is_empty();
        for sighting in dedup_last(devices) {
            summary.devices += 1;
            self.bluetooth.apply(&sighting, &sighting_ctx, agent_fix, now_ms);
        }
        if has_devices {
            self.bluetooth.settle_page();
        }

        if summary.total() > 0 {
            info!(
                agent_id = %ctx.agent_id,
                scan_id = ?ctx.scan_id,
                scan_type = %ctx.scan_type,
                networks = summary.networks,
                clients = summary.clients,
                devices = summary.devices,
                "Ingested scan payload"
            );
        }
        summary
    }
}

fn items<'a>(payload: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Payload `created_at`/`createdAt`, then the scan record's, then now.
fn scan_timestamp(payload: &Value, ctx: &ScanContext, now_ms: i64) -> i64 {
    value::field(payload, &["created_at", "createdAt"])
        .and_then(value::timestamp_ms)
        .or_else(|| ctx.created_at.as_ref().and_then(value::timestamp_ms))
        .unwrap_or(now_ms)
}

/// Keep the last occurrence of each address, preserving batch order.
fn dedup_last(sightings: Vec<Sighting>) -> Vec<Sighting> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Sighting> = sightings
        .into_iter()
        .rev()
        .filter(|s| seen.insert(s.address.clone()))
        .collect();
    kept.reverse();
    kept
}
