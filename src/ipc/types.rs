use crate::session::RoleSession;
use crate::workflow::GradingWorkflowStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything one sidecar session owns. Handlers get it by `&mut`; there is
/// no other route to the roster.
#[derive(Debug, Default)]
pub struct AppState {
    pub session: RoleSession,
    pub store: GradingWorkflowStore,
}
