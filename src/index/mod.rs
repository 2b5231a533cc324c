// Entity index: per-address records merging location estimates with
// descriptive metadata

mod page;
mod sighting;

pub use page::{paginate, total_pages, Page, Pager};
pub use sighting::{EntityKind, Sighting, SightingContext};

use crate::agent::{AgentId, GpsFix};
use crate::observation::{estimate, Domain, LocationEstimate, LocationSource, ObservationStore, Sample};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};


/// Authoritative record of one wifi network/client or Bluetooth device.
///
/// Created on first sighting and updated in place; never deleted, so a stale
/// record keeps its last known position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub address: String,
    pub kind: EntityKind,
    pub name: String,
    pub channel: Option<String>,
    pub signal: Option<f64>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// `None` until the entity has ever had a position
    pub location_source: Option<LocationSource>,
    pub contributors: usize,

    /// Entity's own reported time, never later than `scan_observed_at`
    pub last_seen_at: DateTime<Utc>,
    pub scan_observed_at: DateTime<Utc>,

    pub agent_id: AgentId,
    pub agent_name: String,
    pub scan_id: Option<i64>,
    pub scan_type: String,
}

impl EntityRecord {
    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

fn datetime_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}

/// Entity records and observation logs for one domain.
pub struct EntityIndex {
    domain: Domain,
    records: DashMap<String, EntityRecord>,
    observations: ObservationStore,
    pager: Pager,
}

impl EntityIndex {
    pub fn new(domain: Domain, window_ms: i64, page_size: usize) -> Self {
        Self {
            domain,
            records: DashMap::new(),
            observations: ObservationStore::new(window_ms),
            pager: Pager::new(page_size),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Apply one sighting: record a sample, re-estimate, merge into the record.
    ///
    /// The device's own fix wins; otherwise the agent's fix stands in. When
    /// the new estimate has no position the previous one is kept.
    pub fn apply(
        &self,
        sighting: &Sighting,
        ctx: &SightingContext,
        agent_fix: Option<GpsFix>,
        now_ms: i64,
    ) -> EntityRecord {
        let observed_at_ms = ctx.clamp(sighting.reported_at_ms);

        let located = match (sighting.device_fix, agent_fix) {
            (Some(fix), _) => Some((fix, LocationSource::Device)),
            (None, Some(fix)) => Some((fix, LocationSource::Agent)),
            (None, None) => None,
        };

        if let Some((fix, source)) = located {
            self.observations.record(
                &sighting.address,
                Sample {
                    entity_key: sighting.address.clone(),
                    agent_id: ctx.agent_id,
                    lat: fix.lat,
                    lon: fix.lon,
                    signal: sighting.signal,
                    source,
                    observed_at_ms,
                },
                now_ms,
            );
        }

        let loc = self.estimate_for(&sighting.address, now_ms);

        let mut entry = self
            .records
            .entry(sighting.address.clone())
            .or_insert_with(|| EntityRecord {
                address: sighting.address.clone(),
                kind: sighting.kind,
                name: String::new(),
                channel: None,
                signal: None,
                lat: None,
                lon: None,
                location_source: None,
                contributors: 0,
                last_seen_at: datetime_ms(observed_at_ms),
                scan_observed_at: datetime_ms(ctx.scan_ts_ms),
                agent_id: ctx.agent_id,
                agent_name: ctx.agent_name.clone(),
                scan_id: ctx.scan_id,
                scan_type: ctx.scan_type.clone(),
            });

        let record = entry.value_mut();
        if loc.has_position {
            record.lat = loc.lat;
            record.lon = loc.lon;
            record.location_source = loc.provenance;
            record.contributors = loc.contributors;
        }

        record.kind = sighting.kind;
        record.name = sighting
            .name
            .clone()
            .unwrap_or_else(|| sighting.kind.fallback_name().to_string());
        record.channel = sighting.channel.clone();
        record.signal = sighting.signal;
        record.last_seen_at = datetime_ms(observed_at_ms);
        record.scan_observed_at = datetime_ms(ctx.scan_ts_ms);
        record.agent_id = ctx.agent_id;
        record.agent_name = ctx.agent_name.clone();
        record.scan_id = ctx.scan_id;
        record.scan_type = ctx.scan_type.clone();

        record.clone()
    }

    /// Current estimate for `address` from its observation log.
    pub fn estimate_for(&self, address: &str, now_ms: i64) -> LocationEstimate {
        let samples = self.observations.samples_for(address, now_ms);
        estimate(&samples, self.domain, now_ms, self.observations.window_ms())
    }

    /// In-window samples for `address`.
    pub fn samples_for(&self, address: &str, now_ms: i64) -> Vec<Sample> {
        self.observations.samples_for(address, now_ms)
    }

    /// Detail lookup; addresses are matched case-insensitively.
    pub fn get(&self, address: &str) -> Option<EntityRecord> {
        self.records
            .get(&address.trim().to_lowercase())
            .map(|r| r.clone())
    }

    /// All records, most recently seen first.
    pub fn list(&self) -> Vec<EntityRecord> {
        let mut records: Vec<EntityRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| {
            b.last_seen_at
                .cmp(&a.last_seen_at)
                .then_with(|| a.address.cmp(&b.address))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-apply the page reset rule after the listing changed size.
    pub fn settle_page(&self) -> usize {
        self.pager.settle(self.len())
    }

    /// Current page of the listing.
    pub fn page(&self) -> Page<EntityRecord> {
        let records = self.list();
        let number = self.pager.settle(records.len());
        paginate(&records, number, self.pager.page_size())
    }

    /// Jump to `number` (clamped) and return that page.
    pub fn goto_page(&self, number: usize) -> Page<EntityRecord> {
        let records = self.list();
        let number = self.pager.set(number, records.len());
        paginate(&records, number, self.pager.page_size())
    }

    /// Move by `delta` pages (clamped) and return the new page.
    pub fn change_page(&self, delta: i64) -> Page<EntityRecord> {
        let records = self.list();
        let number = self.pager.change(delta, records.len());
        paginate(&records, number, self.pager.page_size())
    }
}
