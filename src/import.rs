use crate::error::{GradeError, GradeResult};
use crate::model::{coerce_score, Roster, Student, SubjectScores};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;

/// The sheet format carries one subject's scores per row, so every imported
/// row lands under this fixed subject.
pub const IMPORTED_SUBJECT_NAME: &str = "Mathematics";
pub const IMPORTED_SUBJECT_CODE: &str = "MATH101";

/// One spreadsheet row keyed by its header text.
pub type ImportRow = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub sheet_name: String,
    pub rows: Vec<ImportRow>,
    pub sha256: String,
}

pub fn payload_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn read_spreadsheet_file(path: &Path) -> GradeResult<ParsedSheet> {
    let bytes = std::fs::read(path).map_err(|e| GradeError::SourceUnavailable {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    read_spreadsheet(&bytes)
}

/// Reads the first worksheet of an XLSX payload. The first row is the header;
/// fully blank rows are skipped.
pub fn read_spreadsheet(bytes: &[u8]) -> GradeResult<ParsedSheet> {
    let sha256 = payload_sha256(bytes);
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| GradeError::ImportFormat(format!("failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let Some(first_sheet) = sheet_names.first().cloned() else {
        return Err(GradeError::ImportFormat("workbook has no sheets".to_string()));
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| GradeError::ImportFormat(format!("failed to read sheet: {e}")))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<Option<String>> = match sheet_rows.next() {
        Some(cells) => cells.iter().map(header_text).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let mut row = ImportRow::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            let Some(header) = header else {
                continue;
            };
            let value = cell_value(cell);
            if value.is_null() || row.contains_key(header) {
                continue;
            }
            row.insert(header.clone(), value);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(ParsedSheet {
        sheet_name: first_sheet,
        rows,
        sha256,
    })
}

fn header_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(v) => Value::from(*v),
        Data::Float(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(v) => Value::Bool(*v),
        Data::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

/// Validates loosely typed inline rows: each must be an object.
pub fn rows_from_json(raw: &[Value]) -> GradeResult<Vec<ImportRow>> {
    raw.iter()
        .enumerate()
        .map(|(idx, v)| {
            v.as_object()
                .cloned()
                .ok_or_else(|| GradeError::ImportFormat(format!("rows[{idx}] must be an object")))
        })
        .collect()
}

fn column<'a>(row: &'a ImportRow, name: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

fn column_text(row: &ImportRow, name: &str) -> String {
    match column(row, name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Turns sheet rows into a fresh roster: one student per row, one subject per
/// student, ids assigned by 1-based row position. Bad cells coerce to zero
/// instead of failing the import.
pub fn normalize_rows(rows: &[ImportRow]) -> Roster {
    let students = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| Student {
            id: (idx + 1).to_string(),
            name: column_text(row, "Name"),
            subjects: vec![SubjectScores {
                subject_name: IMPORTED_SUBJECT_NAME.to_string(),
                subject_code: IMPORTED_SUBJECT_CODE.to_string(),
                assignments: coerce_score(column(row, "Assignments")),
                quizzes: coerce_score(column(row, "Quizzes")),
                projects: coerce_score(column(row, "Projects")),
                exams: coerce_score(column(row, "Exams")),
                feedback: column_text(row, "Feedback"),
            }],
            periods: Vec::new(),
        })
        .collect();
    Roster::new(students)
}
