use crate::calc;
use crate::import;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fail, require, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Roster;
use crate::roster;
use crate::session::Capability;
use serde_json::json;
use std::path::PathBuf;

fn roster_students_json(roster: &Roster) -> Vec<serde_json::Value> {
    roster
        .students()
        .iter()
        .map(|s| {
            let gwa = calc::student_average(&s.subjects).ok();
            json!({
                "id": s.id,
                "name": s.name,
                "subjectCount": s.subjects.len(),
                "gwa": gwa.map(calc::round_off_2_decimal),
                "gwaDisplay": gwa.map(calc::format_2_decimal),
                "tier": gwa.map(calc::performance_tier),
            })
        })
        .collect()
}

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (loaded, source) = if let Some(snapshot) = req.params.get("snapshot") {
        (roster::parse_roster_snapshot(snapshot), "inline")
    } else if let Some(path) = req.params.get("path").and_then(|v| v.as_str()) {
        (roster::read_roster_file(&PathBuf::from(path)), "path")
    } else {
        return err(
            &req.id,
            "bad_params",
            "missing params.path or params.snapshot",
            None,
        );
    };

    let roster = match loaded {
        Ok(v) => v,
        Err(e) => return fail(req, e),
    };
    if roster.is_empty() {
        tracing::warn!(source, "roster snapshot has no students");
    }
    let student_count = roster.len();
    state.store.replace_roster(roster);
    tracing::info!(student_count, source, "roster loaded");
    ok(
        &req.id,
        json!({ "studentCount": student_count, "source": source }),
    )
}

fn handle_roster_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require(state, req, Capability::ViewGrades) {
        return e;
    }
    ok(
        &req.id,
        json!({ "students": roster_students_json(state.store.roster()) }),
    )
}

fn handle_grades_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require(state, req, Capability::ImportGrades) {
        return e;
    }
    let path = match required_str(req, "path") {
        Ok(v) => v,
        Err(e) => return e,
    };

    // Parse fully before touching the store so a bad file leaves the roster as is.
    let sheet = match import::read_spreadsheet_file(&PathBuf::from(&path)) {
        Ok(v) => v,
        Err(e) => return fail(req, e),
    };
    let roster = import::normalize_rows(&sheet.rows);
    let student_count = roster.len();
    let same_as_previous = state.store.import_roster(roster, &sheet.sha256);
    tracing::info!(
        student_count,
        sheet = %sheet.sheet_name,
        sha256 = %sheet.sha256,
        same_as_previous,
        "spreadsheet imported"
    );

    ok(
        &req.id,
        json!({
            "studentCount": student_count,
            "sheetName": sheet.sheet_name,
            "sha256": sheet.sha256,
            "sameAsPrevious": same_as_previous,
            "importedAt": chrono::Utc::now().to_rfc3339(),
            "students": roster_students_json(state.store.roster()),
        }),
    )
}

fn handle_grades_import_rows(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require(state, req, Capability::ImportGrades) {
        return e;
    }
    let Some(raw_rows) = req.params.get("rows").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "rows must be an array", None);
    };
    let rows = match import::rows_from_json(raw_rows) {
        Ok(v) => v,
        Err(e) => return fail(req, e),
    };
    let roster = import::normalize_rows(&rows);
    let student_count = roster.len();
    state.store.replace_roster(roster);
    tracing::info!(student_count, "rows imported");

    ok(
        &req.id,
        json!({
            "studentCount": student_count,
            "importedAt": chrono::Utc::now().to_rfc3339(),
            "students": roster_students_json(state.store.roster()),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.load" => Some(handle_roster_load(state, req)),
        "roster.list" => Some(handle_roster_list(state, req)),
        "grades.import" => Some(handle_grades_import(state, req)),
        "grades.importRows" => Some(handle_grades_import_rows(state, req)),
        _ => None,
    }
}
