use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "role": state.session.role(),
            "studentCount": state.store.roster().len(),
        }),
    )
}

fn handle_session_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "role": state.session.role() }))
}

/// The role is a caller-supplied flag; anything other than `teacher` (or no
/// value at all) means the student view.
fn handle_session_set_role(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match req.params.get("role") {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => match v.as_str() {
            Some(s) => Some(s),
            None => return err(&req.id, "bad_params", "role must be a string", None),
        },
    };
    let role = Role::parse_lenient(raw);
    state.session.set_role(role);
    tracing::info!(role = role.as_str(), "session role set");
    ok(&req.id, json!({ "role": role }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.get" => Some(handle_session_get(state, req)),
        "session.setRole" => Some(handle_session_set_role(state, req)),
        _ => None,
    }
}
