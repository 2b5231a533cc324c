// Focus, status sync and the attack-scan polling loop

use super::{AgentDetail, AttackResults, Dashboard, DashboardError};
use crate::agent::AgentId;
use crate::scan_state::{classify_status, ScanSignal, ScanState};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

impl Dashboard {
    /// Move an agent to Idle and stop polling it.
    pub(crate) fn mark_idle(&self, agent_id: AgentId, signal: &ScanSignal) -> ScanState {
        let state = self.scan_states.apply(agent_id, signal);
        if self.schedule.polling() == Some(agent_id) {
            self.schedule.cancel(agent_id);
        }
        state
    }

    fn still_focused(&self, agent_id: AgentId) -> bool {
        let focused = self.focused() == Some(agent_id);
        if !focused {
            debug!(agent_id = %agent_id, "Focus moved while loading agent");
        }
        focused
    }

    /// Make `agent_id` the focused agent.
    ///
    /// Returns `Ok(None)` for agents not in the cache. Refreshes the cached
    /// metadata, results and scan state, then arms or cancels polling. Once
    /// focus has moved elsewhere the results and the schedule are left alone.
    pub async fn focus_agent(self: &Arc<Self>, agent_id: AgentId) -> Result<Option<AgentDetail>, DashboardError> {
        if !self.agents.contains(agent_id) {
            debug!(agent_id = %agent_id, "Ignoring focus on unknown agent");
            return Ok(None);
        }
        self.set_focus(Some(agent_id));

        let (agent, status) = futures::join!(
            self.api.get_agent(agent_id),
            self.api.get_agent_status(agent_id)
        );
        let agent = agent?;
        let status = status?;

        self.agents.upsert(agent.clone());
        self.overlay.refresh_agent(&agent);

        if self.scan_states.is_active(agent_id) {
            let results = self.api.get_attack_scan_results(agent_id).await;
            if self.still_focused(agent_id) {
                match results {
                    Ok(payload) => {
                        self.attack_results
                            .insert(agent_id, AttackResults::from_payload(&payload, Utc::now()));
                    }
                    Err(e) => {
                        warn!(agent_id = %agent_id, error = %e, "Attack results unavailable");
                        self.mark_idle(agent_id, &ScanSignal::NotFound);
                    }
                }
            }
        } else {
            self.attack_results.remove(&agent_id);
        }

        let scan_state = self.sync_scan_state(agent_id).await;
        if self.still_focused(agent_id) {
            if scan_state.is_active() {
                self.start_polling(agent_id);
            } else {
                self.schedule.cancel_all();
            }
        }

        Ok(Some(AgentDetail {
            monitor_map: self.overlay.monitor_map(agent_id),
            interfaces: self.overlay.interfaces(agent_id),
            agent,
            status,
            scan_state,
        }))
    }

    /// Probe every monitor alias of an agent and settle its scan state.
    ///
    /// The first alias reporting a running scan wins. When no probe answers
    /// at all the previous state is kept.
    pub async fn sync_scan_state(&self, agent_id: AgentId) -> ScanState {
        let aliases = self.overlay.aliases(agent_id);
        if aliases.is_empty() {
            return self.mark_idle(agent_id, &ScanSignal::ProbeStopped);
        }

        let mut answered = false;
        for alias in aliases {
            match self.api.get_attack_scan_status(agent_id, &alias).await {
                Ok(status) => {
                    answered = true;
                    if classify_status(&status).is_running() {
                        return self.scan_states.apply(
                            agent_id,
                            &ScanSignal::ProbeRunning {
                                monitor_alias: alias,
                            },
                        );
                    }
                }
                Err(e) => {
                    debug!(agent_id = %agent_id, alias = %alias, error = %e, "Status probe failed");
                }
            }
        }

        if answered {
            self.mark_idle(agent_id, &ScanSignal::ProbeStopped)
        } else {
            self.scan_states.get(agent_id)
        }
    }

    /// Arm the polling loop for an Active agent, cancelling any other.
    ///
    /// No-op while the agent is already being polled or is not Active.
    pub fn start_polling(self: &Arc<Self>, agent_id: AgentId) {
        if !self.scan_states.is_active(agent_id) || self.schedule.is_polling(agent_id) {
            return;
        }

        let weak = Arc::downgrade(self);
        let period = self.config.polling.attack_poll();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(dashboard) = weak.upgrade() else {
                    break;
                };
                if !dashboard.poll_tick(agent_id).await {
                    break;
                }
            }
            debug!(agent_id = %agent_id, "Polling loop finished");
        });

        info!(agent_id = %agent_id, period_secs = period.as_secs(), "Polling attack results");
        self.schedule.arm(agent_id, handle);
    }

    pub fn stop_polling(&self) {
        self.schedule.cancel_all();
    }

    /// One poll of the focused agent. Returns false once polling should end.
    ///
    /// Results and the status probe are fetched together; their effect is
    /// discarded if focus or scan state changed while they were in flight.
    pub async fn poll_tick(&self, agent_id: AgentId) -> bool {
        if !self.scan_states.is_active(agent_id) {
            return false;
        }
        if self.focused() != Some(agent_id) {
            return true;
        }

        let alias = self.scan_states.monitor_alias(agent_id);
        let probe = async {
            match alias.as_deref() {
                Some(alias) => Some(self.api.get_attack_scan_status(agent_id, alias).await),
                None => None,
            }
        };
        let (results, status) = futures::join!(self.api.get_attack_scan_results(agent_id), probe);

        if self.focused() != Some(agent_id) || !self.scan_states.is_active(agent_id) {
            debug!(agent_id = %agent_id, "Discarding stale poll results");
            return self.scan_states.is_active(agent_id);
        }

        match results {
            Ok(payload) => {
                let results = AttackResults::from_payload(&payload, Utc::now());
                debug!(
                    agent_id = %agent_id,
                    networks = results.networks.len(),
                    clients = results.clients.len(),
                    "Attack results refreshed"
                );
                self.attack_results.insert(agent_id, results);

                match status {
                    Some(Ok(status)) if !classify_status(&status).is_running() => {
                        self.mark_idle(agent_id, &ScanSignal::ProbeStopped);
                        false
                    }
                    Some(Err(e)) => {
                        debug!(agent_id = %agent_id, error = %e, "Status probe failed during poll");
                        true
                    }
                    _ => true,
                }
            }
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "Attack poll failed");
                if e.is_not_found() || !self.agents.contains(agent_id) {
                    self.mark_idle(agent_id, &ScanSignal::NotFound);
                    false
                } else {
                    true
                }
            }
        }
    }
}
