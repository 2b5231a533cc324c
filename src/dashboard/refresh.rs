// Periodic full refreshes and push-event handling

use super::{now_ms, Dashboard};
use crate::agent::AgentId;
use crate::client::ClientError;
use crate::event::ScanEvent;
use crate::ingest::{IngestSummary, ScanContext};
use crate::scan_state::ScanSignal;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

impl Dashboard {
    /// Reload every agent and sweep state belonging to agents that vanished.
    ///
    /// Focuses the first agent when nothing is focused. Returns the number
    /// of agents listed.
    pub async fn refresh_agents(self: &Arc<Self>) -> Result<usize, ClientError> {
        let agents = self.api.list_agents().await?;
        let listed: HashSet<AgentId> = agents.iter().map(|a| a.id).collect();

        for agent_id in self.scan_states.active_agents() {
            if !listed.contains(&agent_id) {
                info!(agent_id = %agent_id, "Active agent vanished from controller");
                self.mark_idle(agent_id, &ScanSignal::AgentRemoved);
            }
        }
        self.attack_results.retain(|id, _| listed.contains(id));

        {
            let mut focus = self.focus.lock().unwrap_or_else(|e| e.into_inner());
            if focus.map_or(false, |id| !listed.contains(&id)) {
                *focus = None;
            }
        }

        self.agents.replace_all(&agents);
        self.overlay.replace_all(&agents);
        debug!(count = agents.len(), "Agents refreshed");

        if agents.is_empty() {
            self.stop_polling();
        } else if self.focused().is_none() {
            let first = agents[0].id;
            if let Err(e) = self.focus_agent(first).await {
                warn!(agent_id = %first, error = %e, "Failed to focus agent");
            }
        }

        Ok(agents.len())
    }

    /// Reload the scan history and re-ingest every response payload.
    pub async fn refresh_scans(&self) -> Result<usize, ClientError> {
        let scans = self
            .api
            .list_scans(self.config.polling.scan_history_limit)
            .await?;

        let now = now_ms();
        for scan in &scans {
            if let Some(payload) = &scan.response_payload {
                let ctx = ScanContext {
                    agent_id: scan.agent_id,
                    scan_type: scan.scan_type.clone(),
                    scan_id: Some(scan.id),
                    created_at: scan.created_at.clone(),
                };
                self.gateway.ingest(payload, &ctx, now);
            }
        }

        let count = scans.len();
        *self.recent_scans.write().unwrap_or_else(|e| e.into_inner()) = scans;
        Ok(count)
    }

    /// Apply one decoded push event.
    pub async fn handle_scan_event(&self, event: &ScanEvent) -> IngestSummary {
        debug!(event = event.name(), agent_id = %event.body().agent_id, "Scan event");

        let summary = match event.payload() {
            Some(payload) => self.gateway.ingest(payload, &event.context(), now_ms()),
            None => IngestSummary::default(),
        };

        if event.refreshes_scans() {
            if let Err(e) = self.refresh_scans().await {
                warn!(event = event.name(), error = %e, "Scan refresh after event failed");
            }
        }
        summary
    }

    /// Spawn the repeating agent, scan and continuous-scan refreshes.
    pub fn spawn_background(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let polling = &self.config.polling;

        let agents = self.clone();
        let scans = self.clone();
        let continuous = self.clone();

        vec![
            repeat("agents", polling.agent_refresh(), move || {
                let dashboard = agents.clone();
                async move { dashboard.refresh_agents().await.map(|_| ()) }
            }),
            repeat("scans", polling.scan_refresh(), move || {
                let dashboard = scans.clone();
                async move { dashboard.refresh_scans().await.map(|_| ()) }
            }),
            repeat("continuous", polling.continuous_refresh(), move || {
                let dashboard = continuous.clone();
                async move {
                    dashboard
                        .continuous
                        .refresh(dashboard.api.as_ref())
                        .await
                        .map(|_| ())
                }
            }),
        ]
    }
}

/// Run `job` now and then every `period`, logging failures.
fn repeat<F, Fut>(name: &'static str, period: Duration, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ClientError>> + Send + 'static,
{
    info!(task = name, period_secs = period.as_secs(), "Starting refresh loop");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = job().await {
                warn!(task = name, error = %e, "Refresh failed");
            }
        }
    })
}
