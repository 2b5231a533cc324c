use crate::agent::AgentId;
use crate::ingest::ScanContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;


/// Scan lifecycle message from the controller's push channel.
///
/// The `event` field selects the variant; unknown names fail to decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ScanEvent {
    #[serde(rename = "scan.started")]
    Started(ScanEventBody),

    /// Partial results; `update.snapshot` carries a payload to ingest
    #[serde(rename = "scan.progress")]
    Progress(ScanEventBody),

    /// Final results in `response`
    #[serde(rename = "scan.completed")]
    Completed(ScanEventBody),

    #[serde(rename = "scan.failed")]
    Failed(ScanEventBody),
}

/// Fields shared by every scan event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanEventBody {
    #[serde(alias = "agentId")]
    pub agent_id: AgentId,

    #[serde(default, alias = "scanId")]
    pub scan_id: Option<i64>,

    #[serde(default, alias = "scanType")]
    pub scan_type: Option<String>,

    #[serde(default, alias = "agentName", skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanEvent {
    pub fn body(&self) -> &ScanEventBody {
        match self {
            ScanEvent::Started(body)
            | ScanEvent::Progress(body)
            | ScanEvent::Completed(body)
            | ScanEvent::Failed(body) => body,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanEvent::Started(_) => "scan.started",
            ScanEvent::Progress(_) => "scan.progress",
            ScanEvent::Completed(_) => "scan.completed",
            ScanEvent::Failed(_) => "scan.failed",
        }
    }

    /// Payload to feed to the ingestion gateway, if this event carries one.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ScanEvent::Progress(body) => body
                .update
                .as_ref()
                .and_then(|u| u.get("snapshot"))
                .filter(|s| !s.is_null()),
            ScanEvent::Completed(body) => body.response.as_ref().filter(|r| !r.is_null()),
            ScanEvent::Started(_) | ScanEvent::Failed(_) => None,
        }
    }

    /// Whether the scan history should be reloaded after this event.
    pub fn refreshes_scans(&self) -> bool {
        !matches!(self, ScanEvent::Progress(_))
    }

    pub fn context(&self) -> ScanContext {
        let body = self.body();
        ScanContext {
            agent_id: body.agent_id,
            scan_type: body.scan_type.clone().unwrap_or_default(),
            scan_id: body.scan_id,
            created_at: None,
        }
    }
}
