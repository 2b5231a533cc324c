use crate::agent::AgentId;
use crate::client::ClientError;
use std::fmt;

/// User input rejected before any controller call.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    UnknownAgent(AgentId),
    MissingInterface,
    /// A required form field is empty
    MissingField(&'static str),
    /// Extras text is not a JSON object
    ExtrasNotObject(String),
    /// Managed interface already has a monitor alias
    AlreadyInMonitorMode(String),
    /// Monitor mode cannot stop while an attack scan runs
    ScanStillActive(AgentId),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownAgent(id) => write!(f, "unknown agent {}", id),
            ValidationError::MissingInterface => write!(f, "interface is required"),
            ValidationError::MissingField(field) => write!(f, "{} is required", field),
            ValidationError::ExtrasNotObject(e) => {
                write!(f, "extras must be a JSON object: {}", e)
            }
            ValidationError::AlreadyInMonitorMode(iface) => write!(
                f,
                "{} is already in monitor mode; stop it before starting again",
                iface
            ),
            ValidationError::ScanStillActive(id) => write!(
                f,
                "agent {} has an attack scan running; stop it before exiting monitor mode",
                id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a dashboard action.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardError {
    Invalid(ValidationError),
    Controller(ClientError),
}

impl DashboardError {
    /// Agent or controller could not be reached at all.
    pub fn is_offline(&self) -> bool {
        matches!(self, DashboardError::Controller(e) if e.is_unreachable())
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Invalid(e) => write!(f, "{}", e),
            DashboardError::Controller(e) if e.is_unreachable() => write!(
                f,
                "agent is temporarily offline or unreachable: {}",
                e
            ),
            DashboardError::Controller(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Invalid(e) => Some(e),
            DashboardError::Controller(e) => Some(e),
        }
    }
}

impl From<ValidationError> for DashboardError {
    fn from(e: ValidationError) -> Self {
        DashboardError::Invalid(e)
    }
}

impl From<ClientError> for DashboardError {
    fn from(e: ClientError) -> Self {
        DashboardError::Controller(e)
    }
}
