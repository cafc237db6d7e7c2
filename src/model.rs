use serde::{Deserialize, Serialize};

/// Field names accepted by `grading.editField`, in display order.
pub const EDITABLE_FIELDS: [&str; 5] = ["assignments", "quizzes", "projects", "exams", "feedback"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreField {
    Assignments,
    Quizzes,
    Projects,
    Exams,
}

impl ScoreField {
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Assignments,
        ScoreField::Quizzes,
        ScoreField::Projects,
        ScoreField::Exams,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreField::Assignments => "assignments",
            ScoreField::Quizzes => "quizzes",
            ScoreField::Projects => "projects",
            ScoreField::Exams => "exams",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreField::Assignments => "Assignments",
            ScoreField::Quizzes => "Quizzes",
            ScoreField::Projects => "Projects",
            ScoreField::Exams => "Exams",
        }
    }
}

/// A field an editor may touch on a subject entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Score(ScoreField),
    Feedback,
}

impl EditableField {
    /// Case-insensitive lookup; `None` for anything outside [`EDITABLE_FIELDS`].
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        match key.as_str() {
            "feedback" => Some(EditableField::Feedback),
            _ => ScoreField::ALL
                .into_iter()
                .find(|f| f.as_str() == key)
                .map(EditableField::Score),
        }
    }
}

/// Every score component lives on a closed 0 to 100 scale.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

pub fn score_in_range(value: f64) -> bool {
    (SCORE_MIN..=SCORE_MAX).contains(&value)
}

/// Reads a raw cell or parameter as a number.
///
/// Finite numbers pass through, numeric text is parsed after trimming, and
/// everything else (blank, missing, words, booleans, NaN/inf) becomes `0`.
pub fn parse_score(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => parse_score_text(s),
        _ => 0.0,
    }
}

fn parse_score_text(raw: &str) -> f64 {
    let t = raw.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Lenient coercion for bulk spreadsheet import: a number outside the score
/// scale is treated like any other unusable cell and becomes `0`, so a partly
/// bad sheet still imports.
pub fn coerce_score(value: Option<&serde_json::Value>) -> f64 {
    let v = parse_score(value);
    if score_in_range(v) {
        v
    } else {
        0.0
    }
}

/// Range-checked read for the editor and roster snapshots. Unparseable input
/// still reads as `0`; a number off the scale comes back as `Err(value)`.
pub fn checked_score(value: Option<&serde_json::Value>) -> Result<f64, f64> {
    let v = parse_score(value);
    if score_in_range(v) {
        Ok(v)
    } else {
        Err(v)
    }
}

/// One subject's four assessment components for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScores {
    pub subject_name: String,
    pub subject_code: String,
    pub assignments: f64,
    pub quizzes: f64,
    pub projects: f64,
    pub exams: f64,
    #[serde(default)]
    pub feedback: String,
}

impl SubjectScores {
    pub fn score(&self, field: ScoreField) -> f64 {
        match field {
            ScoreField::Assignments => self.assignments,
            ScoreField::Quizzes => self.quizzes,
            ScoreField::Projects => self.projects,
            ScoreField::Exams => self.exams,
        }
    }

    pub fn set_score(&mut self, field: ScoreField, value: f64) {
        match field {
            ScoreField::Assignments => self.assignments = value,
            ScoreField::Quizzes => self.quizzes = value,
            ScoreField::Projects => self.projects = value,
            ScoreField::Exams => self.exams = value,
        }
    }
}

/// Dashboard variant: one subject's four period marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScores {
    pub subject_name: String,
    pub subject_code: String,
    pub prelim: f64,
    pub midterm: f64,
    pub pre_final: f64,
    #[serde(rename = "final")]
    pub final_mark: f64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub subjects: Vec<SubjectScores>,
    #[serde(default)]
    pub periods: Vec<PeriodScores>,
}

/// Every student in the current session, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_score_defaults_to_zero() {
        assert_eq!(coerce_score(Some(&json!("90"))), 90.0);
        assert_eq!(coerce_score(Some(&json!(" 72.5 "))), 72.5);
        assert_eq!(coerce_score(Some(&json!(88))), 88.0);
        assert_eq!(coerce_score(Some(&json!(""))), 0.0);
        assert_eq!(coerce_score(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_score(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_score(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_score(Some(&json!(true))), 0.0);
        assert_eq!(coerce_score(Some(&serde_json::Value::Null)), 0.0);
        assert_eq!(coerce_score(None), 0.0);
    }

    #[test]
    fn off_scale_scores_are_zero_on_import_and_rejected_when_checked() {
        assert_eq!(coerce_score(Some(&json!(101))), 0.0);
        assert_eq!(coerce_score(Some(&json!(-1))), 0.0);
        assert_eq!(coerce_score(Some(&json!("150"))), 0.0);
        assert_eq!(coerce_score(Some(&json!(100))), 100.0);
        assert_eq!(coerce_score(Some(&json!(0))), 0.0);

        assert_eq!(checked_score(Some(&json!(101))), Err(101.0));
        assert_eq!(checked_score(Some(&json!(-1))), Err(-1.0));
        assert_eq!(checked_score(Some(&json!("150"))), Err(150.0));
        assert_eq!(checked_score(Some(&json!("100"))), Ok(100.0));
        assert_eq!(checked_score(Some(&json!("abc"))), Ok(0.0));
    }

    #[test]
    fn editable_field_parse_is_case_insensitive() {
        assert_eq!(
            EditableField::parse("Quizzes"),
            Some(EditableField::Score(ScoreField::Quizzes))
        );
        assert_eq!(EditableField::parse(" FEEDBACK "), Some(EditableField::Feedback));
        assert_eq!(EditableField::parse("grade"), None);
        assert_eq!(EditableField::parse("id"), None);
    }

    #[test]
    fn period_scores_use_final_on_the_wire() {
        let p = PeriodScores {
            subject_name: "Physics".into(),
            subject_code: "PHY101".into(),
            prelim: 80.0,
            midterm: 82.0,
            pre_final: 85.0,
            final_mark: 88.0,
            feedback: String::new(),
        };
        let v = serde_json::to_value(&p).expect("serialize");
        assert_eq!(v["final"], 88.0);
        assert_eq!(v["preFinal"], 85.0);
    }
}
