use crate::index::{paginate, Page};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Latest attack-scan results fetched for one agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttackResults {
    pub networks: Vec<Value>,
    pub clients: Vec<Value>,
    pub fetched_at: DateTime<Utc>,
}

impl AttackResults {
    pub fn from_payload(payload: &Value, fetched_at: DateTime<Utc>) -> Self {
        let list = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            networks: list("networks"),
            clients: list("clients"),
            fetched_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty() && self.clients.is_empty()
    }

    /// Associated clients per access point, keyed by lower-cased `apMacAddr`.
    pub fn client_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for client in &self.clients {
            let key = client
                .get("apMacAddr")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// Paged view; page numbers are clamped to the available range.
    pub fn view(&self, network_page: usize, client_page: usize, page_size: usize) -> AttackView {
        let counts = self.client_counts();
        let rows: Vec<NetworkRow> = self
            .networks
            .iter()
            .map(|network| {
                let key = network
                    .get("macAddr")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_lowercase();
                NetworkRow {
                    client_count: counts.get(&key).copied().unwrap_or(0),
                    network: network.clone(),
                }
            })
            .collect();

        AttackView {
            networks: clamped_page(&rows, network_page, page_size),
            clients: clamped_page(&self.clients, client_page, page_size),
            client_counts: counts,
            fetched_at: self.fetched_at,
        }
    }
}

fn clamped_page<T: Clone>(items: &[T], number: usize, page_size: usize) -> Page<T> {
    let max = crate::index::total_pages(items.len(), page_size);
    paginate(items, number.clamp(1, max), page_size)
}

#[derive(Clone, Debug, Serialize)]
pub struct NetworkRow {
    pub network: Value,
    /// Clients seen associated with this access point
    pub client_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AttackView {
    pub networks: Page<NetworkRow>,
    pub clients: Page<Value>,
    pub client_counts: BTreeMap<String, usize>,
    pub fetched_at: DateTime<Utc>,
}
