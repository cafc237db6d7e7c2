use crate::calc;
use crate::chart::{self, ChartKind};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fail, optional_index, require, required_id, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::session::Capability;
use serde_json::json;

fn committed_student<'a>(state: &'a AppState, req: &Request) -> Result<&'a Student, serde_json::Value> {
    let student_id = required_id(req, "studentId")?;
    state.store.roster().get(&student_id).ok_or_else(|| {
        err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        )
    })
}

/// Reads always come from the committed roster, never from an editor's
/// working copy.
fn handle_student_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require(state, req, Capability::ViewGrades) {
        return e;
    }
    let student = match committed_student(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!(calc::summarize_student(student)))
}

fn handle_charts_build(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require(state, req, Capability::ViewGrades) {
        return e;
    }
    let student = match committed_student(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let kind_raw = match required_str(req, "kind") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(kind) = ChartKind::parse(&kind_raw) else {
        return err(
            &req.id,
            "bad_params",
            "kind must be one of: distribution, comparison, trend",
            Some(json!({ "kind": kind_raw })),
        );
    };
    let subject_index = match optional_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let source = req
        .params
        .get("source")
        .and_then(|v| v.as_str())
        .unwrap_or("components");

    let built = match source {
        "components" => chart::build_chart(&student.subjects, kind, subject_index),
        "periods" => chart::build_chart(&student.periods, kind, subject_index),
        other => {
            return err(
                &req.id,
                "bad_params",
                "source must be one of: components, periods",
                Some(json!({ "source": other })),
            )
        }
    };
    match built {
        Ok(model) => ok(&req.id, json!({ "studentId": student.id, "chart": model })),
        Err(e) => fail(req, e),
    }
}

fn handle_charts_legend(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "legend": chart::tier_legend() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.studentSummary" => Some(handle_student_summary(state, req)),
        "charts.build" => Some(handle_charts_build(state, req)),
        "charts.legend" => Some(handle_charts_legend(state, req)),
        _ => None,
    }
}
