use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fail, require, required_id, required_index, required_str};
use crate::ipc::types::{AppState, Request};
use crate::session::Capability;
use serde_json::json;

fn handle_select_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_id(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = state.store.select_student(&student_id) {
        return fail(req, e);
    }
    ok(&req.id, json!(state.store.view()))
}

fn handle_select_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_index = match required_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.select_subject(subject_index) {
        Ok(selection) => ok(&req.id, json!({ "selection": selection })),
        Err(e) => fail(req, e),
    }
}

fn handle_step_subject(state: &mut AppState, req: &Request, forward: bool) -> serde_json::Value {
    let moved = if forward {
        state.store.next_subject()
    } else {
        state.store.previous_subject()
    };
    match moved {
        Ok(selection) => ok(&req.id, json!({ "selection": selection })),
        Err(e) => fail(req, e),
    }
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.store.view()))
}

fn edited_subject_json(subject: &crate::model::SubjectScores) -> serde_json::Value {
    json!({
        "subject": subject,
        "total": calc::round_off_2_decimal(calc::subject_total(subject)),
        "totalDisplay": calc::format_2_decimal(calc::subject_total(subject)),
    })
}

fn handle_edit_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_index = match required_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field = match required_str(req, "field") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(value) = req.params.get("value") else {
        return err(&req.id, "bad_params", "missing value", None);
    };
    match state.store.edit_field(subject_index, &field, value) {
        Ok(subject) => ok(&req.id, edited_subject_json(subject)),
        Err(e) => fail(req, e),
    }
}

fn handle_edit_feedback(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_index = match required_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let value = match required_str(req, "value") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.edit_feedback(subject_index, &value) {
        Ok(subject) => ok(&req.id, edited_subject_json(subject)),
        Err(e) => fail(req, e),
    }
}

fn handle_revert_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_index = match required_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.revert_subject(subject_index) {
        Ok(subject) => ok(&req.id, edited_subject_json(subject)),
        Err(e) => fail(req, e),
    }
}

fn handle_commit_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_index = match required_index(req, "subjectIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.commit_subject(subject_index) {
        Ok(receipt) => ok(&req.id, json!(receipt)),
        Err(e) => fail(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("grading.") {
        return None;
    }
    if let Err(e) = require(state, req, Capability::EditGrades) {
        return Some(e);
    }
    match req.method.as_str() {
        "grading.selectStudent" => Some(handle_select_student(state, req)),
        "grading.selectSubject" => Some(handle_select_subject(state, req)),
        "grading.nextSubject" => Some(handle_step_subject(state, req, true)),
        "grading.previousSubject" => Some(handle_step_subject(state, req, false)),
        "grading.state" => Some(handle_state(state, req)),
        "grading.editField" => Some(handle_edit_field(state, req)),
        "grading.editFeedback" => Some(handle_edit_feedback(state, req)),
        "grading.revertSubject" => Some(handle_revert_subject(state, req)),
        "grading.commitSubject" => Some(handle_commit_subject(state, req)),
        _ => None,
    }
}
