use crate::error::GradeError;
use crate::ipc::error::{err, grade_err};
use crate::ipc::types::{AppState, Request};
use crate::session::Capability;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Student ids arrive as strings or, from older snapshots, as integers.
pub fn required_id(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    match optional_index(req, key)? {
        Some(v) => Ok(v),
        None => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn optional_index(req: &Request, key: &str) -> Result<Option<usize>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                err(
                    &req.id,
                    "bad_params",
                    format!("{} must be a non-negative integer", key),
                    None,
                )
            }),
    }
}

/// Logs and converts an engine failure for the reply.
pub fn fail(req: &Request, e: GradeError) -> serde_json::Value {
    tracing::warn!(method = %req.method, code = e.code(), error = %e, "request rejected");
    grade_err(&req.id, &e)
}

pub fn require(
    state: &AppState,
    req: &Request,
    capability: Capability,
) -> Result<(), serde_json::Value> {
    state
        .session
        .require(capability, &req.method)
        .map_err(|e| fail(req, e))
}
