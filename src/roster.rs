use crate::error::{GradeError, GradeResult};
use crate::model::{checked_score, PeriodScores, Roster, Student, SubjectScores};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

const PERIOD_KEYS: [&str; 4] = ["prelim", "midterm", "preFinal", "final"];

/// Single best-effort read of a roster snapshot file. No retries.
pub fn read_roster_file(path: &Path) -> GradeResult<Roster> {
    let bytes = std::fs::read(path).map_err(|e| GradeError::SourceUnavailable {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    let snapshot: Value = serde_json::from_slice(&bytes)
        .map_err(|e| GradeError::RosterFormat(format!("invalid json: {e}")))?;
    parse_roster_snapshot(&snapshot)
}

/// Parses `{ "students": [...] }`.
///
/// Students without an `id` get a fresh one here, so every later lookup goes
/// through a stable key rather than the display name.
pub fn parse_roster_snapshot(snapshot: &Value) -> GradeResult<Roster> {
    let Some(obj) = snapshot.as_object() else {
        return Err(GradeError::RosterFormat(
            "snapshot must be an object".to_string(),
        ));
    };
    let Some(raw_students) = obj.get("students") else {
        return Err(GradeError::RosterFormat("missing students".to_string()));
    };
    let Some(raw_students) = raw_students.as_array() else {
        return Err(GradeError::RosterFormat(
            "students must be an array".to_string(),
        ));
    };

    let mut seen_ids = HashSet::new();
    let mut students = Vec::with_capacity(raw_students.len());
    for (idx, raw) in raw_students.iter().enumerate() {
        let student = parse_student(idx, raw)?;
        if !seen_ids.insert(student.id.clone()) {
            return Err(GradeError::RosterFormat(format!(
                "duplicate student id {}",
                student.id
            )));
        }
        students.push(student);
    }
    Ok(Roster::new(students))
}

fn parse_student(idx: usize, raw: &Value) -> GradeResult<Student> {
    let Some(obj) = raw.as_object() else {
        return Err(GradeError::RosterFormat(format!(
            "students[{idx}] must be an object"
        )));
    };

    let id = match obj.get("id") {
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => Uuid::new_v4().to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(GradeError::RosterFormat(format!(
                "students[{idx}].id must be a string or number"
            )))
        }
    };
    let Some(name) = obj.get("name").and_then(|v| v.as_str()) else {
        return Err(GradeError::RosterFormat(format!(
            "students[{idx}].name must be a string"
        )));
    };

    let raw_subjects = match obj.get("subjects") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            return Err(GradeError::RosterFormat(format!(
                "students[{idx}].subjects must be an array"
            )))
        }
    };

    // One list may mix both shapes; entries with any period key are period rows.
    let mut subjects = Vec::new();
    let mut periods = Vec::new();
    let mut subject_codes = HashSet::new();
    let mut period_codes = HashSet::new();
    for (sidx, raw_subject) in raw_subjects.iter().enumerate() {
        let Some(s) = raw_subject.as_object() else {
            return Err(GradeError::RosterFormat(format!(
                "students[{idx}].subjects[{sidx}] must be an object"
            )));
        };
        let subject_name = text_field(s, &["subject", "subjectName"]).unwrap_or_default();
        let Some(subject_code) = text_field(s, &["code", "subjectCode"]) else {
            return Err(GradeError::RosterFormat(format!(
                "students[{idx}].subjects[{sidx}] is missing a code"
            )));
        };
        let feedback = text_field(s, &["feedback"]).unwrap_or_default();

        if PERIOD_KEYS.iter().any(|k| s.contains_key(*k)) {
            if !period_codes.insert(subject_code.clone()) {
                return Err(duplicate_code(idx, &subject_code));
            }
            periods.push(PeriodScores {
                subject_name,
                subject_code,
                prelim: snapshot_score(s, idx, sidx, "prelim")?,
                midterm: snapshot_score(s, idx, sidx, "midterm")?,
                pre_final: snapshot_score(s, idx, sidx, "preFinal")?,
                final_mark: snapshot_score(s, idx, sidx, "final")?,
                feedback,
            });
        } else {
            if !subject_codes.insert(subject_code.clone()) {
                return Err(duplicate_code(idx, &subject_code));
            }
            subjects.push(SubjectScores {
                subject_name,
                subject_code,
                assignments: snapshot_score(s, idx, sidx, "assignments")?,
                quizzes: snapshot_score(s, idx, sidx, "quizzes")?,
                projects: snapshot_score(s, idx, sidx, "projects")?,
                exams: snapshot_score(s, idx, sidx, "exams")?,
                feedback,
            });
        }
    }

    Ok(Student {
        id,
        name: name.to_string(),
        subjects,
        periods,
    })
}

fn snapshot_score(
    obj: &serde_json::Map<String, Value>,
    idx: usize,
    sidx: usize,
    key: &str,
) -> GradeResult<f64> {
    checked_score(obj.get(key)).map_err(|value| {
        GradeError::RosterFormat(format!(
            "students[{idx}].subjects[{sidx}].{key} = {value} is outside 0..=100"
        ))
    })
}

fn text_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn duplicate_code(idx: usize, code: &str) -> GradeError {
    GradeError::RosterFormat(format!("students[{idx}] repeats subject code {code}"))
}
