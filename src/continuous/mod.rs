// Continuous-scan registry: cache of the controller's repeating scan jobs

use crate::agent::AgentId;
use crate::client::{ClientError, ContinuousScan, ContinuousScanRequest, ContinuousScanStop, ControllerApi};
use std::sync::RwLock;
use tracing::{debug, info, warn};

pub struct ContinuousRegistry {
    scans: RwLock<Vec<ContinuousScan>>,
}

impl ContinuousRegistry {
    pub fn new() -> Self {
        Self {
            scans: RwLock::new(Vec::new()),
        }
    }

    pub fn list(&self) -> Vec<ContinuousScan> {
        self.scans.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn for_agent(&self, agent_id: AgentId) -> Vec<ContinuousScan> {
        self.list()
            .into_iter()
            .filter(|s| s.agent_id == agent_id)
            .collect()
    }

    pub fn replace(&self, scans: Vec<ContinuousScan>) {
        *self.scans.write().unwrap_or_else(|e| e.into_inner()) = scans;
    }

    /// Reload from the controller. On failure the previous cache is kept.
    pub async fn refresh(&self, api: &dyn ControllerApi) -> Result<usize, ClientError> {
        match api.list_continuous_scans().await {
            Ok(scans) => {
                let count = scans.len();
                self.replace(scans);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh continuous scans");
                Err(e)
            }
        }
    }

    pub async fn start(
        &self,
        api: &dyn ControllerApi,
        request: &ContinuousScanRequest,
    ) -> Result<(), ClientError> {
        api.start_continuous_scan(request).await?;
        info!(
            agent_id = %request.scan.agent_id,
            scan_type = %request.scan.scan_type,
            interval_seconds = request.interval_seconds,
            "Started continuous scan"
        );
        if let Err(e) = self.refresh(api).await {
            debug!(error = %e, "Continuous scans left stale after change");
        }
        Ok(())
    }

    pub async fn stop(
        &self,
        api: &dyn ControllerApi,
        agent_id: AgentId,
        interface: Option<String>,
        scan_type: &str,
    ) -> Result<(), ClientError> {
        let stop = ContinuousScanStop {
            agent_id,
            interface,
            scan_type: scan_type.to_string(),
        };
        api.stop_continuous_scan(&stop).await?;
        info!(agent_id = %agent_id, scan_type = %scan_type, "Stopped continuous scan");
        if let Err(e) = self.refresh(api).await {
            debug!(error = %e, "Continuous scans left stale after change");
        }
        Ok(())
    }
}

impl Default for ContinuousRegistry {
    fn default() -> Self {
        Self::new()
    }
}
