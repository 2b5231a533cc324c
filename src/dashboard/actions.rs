use super::{Dashboard, DashboardError, LaunchPlan, ScanLaunch, ValidationError};
use crate::agent::{Agent, AgentId};
use crate::client::{AgentRegistration, CaptureRequest, DeauthRequest, Scan};
use crate::scan_state::{classify_status, ProbeStatus, ScanSignal, ScanState};
use crate::value;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a scan launch.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Launched {
    Once { scan: Scan },
    Continuous { interval_seconds: u64 },
}

/// One-off reading of an interface's attack-scan status.
#[derive(Clone, Debug, Serialize)]
pub struct AttackStatus {
    pub interface: String,
    pub status: ProbeStatus,
    /// Payload as reported by the agent
    pub payload: Value,
}

const ALIAS_FIELDS: [&str; 3] = ["interface", "monitorinterface", "monitorInterface"];

fn required(interface: &str) -> Result<&str, ValidationError> {
    let interface = interface.trim();
    if interface.is_empty() {
        Err(ValidationError::MissingInterface)
    } else {
        Ok(interface)
    }
}

fn required_field<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

impl Dashboard {
    fn require_agent(&self, agent_id: AgentId) -> Result<(), ValidationError> {
        if self.agents.contains(agent_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownAgent(agent_id))
        }
    }

    async fn refresh_after_action(self: &Arc<Self>) {
        if let Err(e) = self.refresh_agents().await {
            warn!(error = %e, "Agent refresh after action failed");
        }
    }

    /// Put a managed interface into monitor mode. Returns the new alias when
    /// the controller names one.
    pub async fn start_monitor_mode(
        self: &Arc<Self>,
        agent_id: AgentId,
        managed: &str,
    ) -> Result<Option<String>, DashboardError> {
        self.require_agent(agent_id)?;
        let managed = required(managed)?;
        if self
            .overlay
            .alias_for(agent_id, managed)
            .map_or(false, |alias| !alias.is_empty())
        {
            return Err(ValidationError::AlreadyInMonitorMode(managed.to_string()).into());
        }

        let response = self.api.start_monitor_mode(agent_id, managed).await?;
        let alias = value::field(&response, &ALIAS_FIELDS).and_then(value::text);
        if let Some(alias) = &alias {
            self.overlay.apply_local(agent_id, managed, Some(alias.clone()));
        }
        info!(agent_id = %agent_id, managed = %managed, alias = ?alias, "Monitor mode started");

        self.refresh_after_action().await;
        Ok(alias)
    }

    /// Leave monitor mode. Rejected while an attack scan is running.
    pub async fn stop_monitor_mode(self: &Arc<Self>, agent_id: AgentId, managed: &str) -> Result<(), DashboardError> {
        self.require_agent(agent_id)?;
        if self.scan_states.is_active(agent_id) {
            return Err(ValidationError::ScanStillActive(agent_id).into());
        }
        let managed = required(managed)?;
        let alias = self
            .overlay
            .alias_for(agent_id, managed)
            .filter(|alias| !alias.is_empty())
            .unwrap_or_else(|| managed.to_string());

        self.api.stop_monitor_mode(agent_id, &alias).await?;
        self.overlay.apply_local(agent_id, managed, None);
        info!(agent_id = %agent_id, managed = %managed, alias = %alias, "Monitor mode stopped");

        self.refresh_after_action().await;
        Ok(())
    }

    /// Start an attack scan on a monitor interface and start polling it.
    pub async fn start_attack_scan(
        self: &Arc<Self>,
        agent_id: AgentId,
        interface: &str,
    ) -> Result<ScanState, DashboardError> {
        self.require_agent(agent_id)?;
        let interface = required(interface)?;

        self.api.start_attack_scan(agent_id, interface).await?;
        let state = self.scan_states.apply(
            agent_id,
            &ScanSignal::Started {
                monitor_alias: interface.to_string(),
            },
        );
        self.start_polling(agent_id);

        let (scans, agents) = futures::join!(self.refresh_scans(), self.refresh_agents());
        if let Err(e) = scans.and(agents) {
            warn!(agent_id = %agent_id, error = %e, "Refresh after attack scan start failed");
        }
        Ok(state)
    }

    pub async fn stop_attack_scan(
        self: &Arc<Self>,
        agent_id: AgentId,
        interface: &str,
    ) -> Result<ScanState, DashboardError> {
        self.require_agent(agent_id)?;
        let interface = required(interface)?;

        self.api.stop_attack_scan(agent_id, interface).await?;
        let state = self.mark_idle(agent_id, &ScanSignal::Stopped);

        let (scans, agents) = futures::join!(self.refresh_scans(), self.refresh_agents());
        if let Err(e) = scans.and(agents) {
            warn!(agent_id = %agent_id, error = %e, "Refresh after attack scan stop failed");
        }
        Ok(state)
    }

    /// Validate a launch form and start a one-shot or continuous scan.
    pub async fn launch_scan(&self, launch: &ScanLaunch) -> Result<Launched, DashboardError> {
        self.require_agent(launch.agent_id)?;

        match launch.plan()? {
            LaunchPlan::Once(request) => {
                let scan = self.api.start_scan(&request).await?;
                info!(agent_id = %request.agent_id, scan_id = scan.id, scan_type = %request.scan_type, "Scan launched");
                if let Err(e) = self.refresh_scans().await {
                    warn!(error = %e, "Scan refresh after launch failed");
                }
                Ok(Launched::Once { scan })
            }
            LaunchPlan::Continuous(request) => {
                self.continuous.start(self.api.as_ref(), &request).await?;
                Ok(Launched::Continuous {
                    interval_seconds: request.interval_seconds,
                })
            }
        }
    }

    pub async fn stop_continuous_scan(
        &self,
        agent_id: AgentId,
        interface: Option<String>,
        scan_type: &str,
    ) -> Result<(), DashboardError> {
        self.continuous
            .stop(self.api.as_ref(), agent_id, interface, scan_type)
            .await?;
        Ok(())
    }

    /// Read the attack-scan status of one interface without touching the
    /// reconciled scan state.
    pub async fn attack_scan_status(&self, agent_id: AgentId, interface: &str) -> Result<AttackStatus, DashboardError> {
        self.require_agent(agent_id)?;
        let interface = required(interface)?;

        let payload = self.api.get_attack_scan_status(agent_id, interface).await?;
        Ok(AttackStatus {
            interface: interface.to_string(),
            status: classify_status(&payload),
            payload,
        })
    }

    /// Deauthenticate a station, or every station when none is named, from an AP.
    pub async fn start_deauth(&self, agent_id: AgentId, request: &DeauthRequest) -> Result<Value, DashboardError> {
        self.require_agent(agent_id)?;
        let request = DeauthRequest {
            interface: required(&request.interface)?.to_string(),
            apmacaddr: required_field(&request.apmacaddr, "apmacaddr")?.to_string(),
            stationmacaddr: request.stationmacaddr.trim().to_string(),
            ..request.clone()
        };

        let response = self.api.start_deauth(agent_id, &request).await?;
        info!(
            agent_id = %agent_id,
            ap = %request.apmacaddr,
            station = %request.stationmacaddr,
            channel = request.channel,
            "Deauth started"
        );
        Ok(response)
    }

    pub async fn stop_all_deauths(&self, agent_id: AgentId, interface: &str) -> Result<Value, DashboardError> {
        self.require_agent(agent_id)?;
        let interface = required(interface)?;

        let response = self.api.stop_all_deauths(agent_id, interface).await?;
        info!(agent_id = %agent_id, interface = %interface, "All deauths stopped");
        Ok(response)
    }

    /// Start a handshake capture against one AP.
    pub async fn start_capture(&self, agent_id: AgentId, request: &CaptureRequest) -> Result<Value, DashboardError> {
        self.require_agent(agent_id)?;
        let request = CaptureRequest {
            interface: required(&request.interface)?.to_string(),
            apmacaddr: required_field(&request.apmacaddr, "apmacaddr")?.to_string(),
            ..request.clone()
        };

        let response = self.api.start_capture(agent_id, &request).await?;
        info!(agent_id = %agent_id, ap = %request.apmacaddr, ssid = %request.ssid, "Capture started");
        Ok(response)
    }

    /// Register a new agent with the controller and reload the agent list.
    pub async fn register_agent(self: &Arc<Self>, registration: &AgentRegistration) -> Result<Agent, DashboardError> {
        let registration = AgentRegistration {
            name: required_field(&registration.name, "name")?.to_string(),
            base_url: required_field(&registration.base_url, "base_url")?.to_string(),
            description: registration
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            capabilities: registration
                .capabilities
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let agent = self.api.register_agent(&registration).await?;
        info!(agent_id = %agent.id, name = %agent.name, "Agent registered");

        self.refresh_after_action().await;
        Ok(agent)
    }

    /// Remove an agent from the controller, drop its local state and reload
    /// the agent list. An agent the controller no longer knows is still
    /// removed locally.
    pub async fn delete_agent(self: &Arc<Self>, agent_id: AgentId) -> Result<(), DashboardError> {
        self.require_agent(agent_id)?;

        match self.api.delete_agent(agent_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(agent_id = %agent_id, "Controller had already dropped agent");
            }
            Err(e) => return Err(e.into()),
        }
        self.forget_agent(agent_id);
        info!(agent_id = %agent_id, "Agent removed");

        self.refresh_after_action().await;
        Ok(())
    }
}
