use crate::calc::{self, StudentSummary};
use crate::error::{GradeError, GradeResult};
use crate::model::{checked_score, EditableField, Roster, Student, SubjectScores, SCORE_MAX, SCORE_MIN};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub student_id: String,
    pub subject_index: usize,
}

/// Returned by a successful single-subject commit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub student_id: String,
    pub student_name: String,
    pub subject_index: usize,
    pub subject_name: String,
    pub subject_code: String,
    pub message: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingView {
    pub selection: Option<Selection>,
    pub student: Option<Student>,
    pub summary: Option<StudentSummary>,
    pub dirty_subjects: Vec<usize>,
}

/// Owns the session roster and the editor state over it.
///
/// Edits land on a working copy of the selected student. Only
/// [`GradingWorkflowStore::commit_subject`] writes back into the roster, and
/// only for the one subject it names.
#[derive(Debug, Default)]
pub struct GradingWorkflowStore {
    roster: Roster,
    selection: Option<Selection>,
    working: Option<Student>,
    last_import_sha256: Option<String>,
}

impl GradingWorkflowStore {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Swaps in a whole new roster and drops the selection along with any
    /// uncommitted edits. Never merges.
    pub fn replace_roster(&mut self, roster: Roster) {
        if let Some(dirty) = self.working.as_ref().map(|_| self.dirty_subjects().len()) {
            if dirty > 0 {
                tracing::warn!(dirty, "roster replaced with uncommitted edits");
            }
        }
        self.roster = roster;
        self.selection = None;
        self.working = None;
        self.last_import_sha256 = None;
    }

    /// Replaces the roster with an imported one and reports whether the
    /// payload fingerprint matches the import that produced the current roster.
    pub fn import_roster(&mut self, roster: Roster, sha256: &str) -> bool {
        let same = self.last_import_sha256.as_deref() == Some(sha256);
        self.replace_roster(roster);
        self.last_import_sha256 = Some(sha256.to_string());
        same
    }

    pub fn select_student(&mut self, student_id: &str) -> GradeResult<&Student> {
        let Some(student) = self.roster.get(student_id) else {
            return Err(GradeError::InvalidSelection(format!(
                "unknown student {student_id}"
            )));
        };

        let same_student = self
            .selection
            .as_ref()
            .map(|s| s.student_id == student_id)
            .unwrap_or(false);
        if !same_student || self.working.is_none() {
            let dirty = self.dirty_subjects().len();
            if dirty > 0 {
                tracing::warn!(dirty, "discarding uncommitted edits on reselect");
            }
            self.working = Some(student.clone());
        }

        let subject_count = student.subjects.len();
        let previous = self.selection.as_ref().map(|s| s.subject_index).unwrap_or(0);
        let subject_index = if previous < subject_count { previous } else { 0 };
        self.selection = Some(Selection {
            student_id: student_id.to_string(),
            subject_index,
        });

        self.working
            .as_ref()
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))
    }

    pub fn select_subject(&mut self, subject_index: usize) -> GradeResult<&Selection> {
        self.check_index(subject_index)?;
        let selection = self.selection_mut()?;
        selection.subject_index = subject_index;
        Ok(&*selection)
    }

    /// Moves the subject cursor forward, wrapping past the last subject.
    pub fn next_subject(&mut self) -> GradeResult<&Selection> {
        let count = self.subject_count()?;
        let selection = self.selection_mut()?;
        selection.subject_index = (selection.subject_index + 1) % count;
        Ok(&*selection)
    }

    pub fn previous_subject(&mut self) -> GradeResult<&Selection> {
        let count = self.subject_count()?;
        let selection = self.selection_mut()?;
        selection.subject_index = if selection.subject_index == 0 {
            count - 1
        } else {
            selection.subject_index - 1
        };
        Ok(&*selection)
    }

    pub fn edit_field(
        &mut self,
        subject_index: usize,
        field: &str,
        value: &Value,
    ) -> GradeResult<&SubjectScores> {
        let Some(field) = EditableField::parse(field) else {
            return Err(GradeError::InvalidField(field.to_string()));
        };
        // Check the value before touching the working copy.
        let score = match field {
            EditableField::Score(score) => {
                let v = checked_score(Some(value)).map_err(|v| GradeError::ScoreOutOfRange {
                    field: score.as_str(),
                    value: v,
                    min: SCORE_MIN,
                    max: SCORE_MAX,
                })?;
                Some((score, v))
            }
            EditableField::Feedback => None,
        };
        let subject = self.working_subject_mut(subject_index)?;
        match score {
            Some((score, v)) => subject.set_score(score, v),
            None => subject.feedback = feedback_text(value),
        }
        Ok(&*subject)
    }

    pub fn edit_feedback(&mut self, subject_index: usize, value: &str) -> GradeResult<&SubjectScores> {
        let subject = self.working_subject_mut(subject_index)?;
        subject.feedback = value.to_string();
        Ok(&*subject)
    }

    /// Throws away uncommitted edits for one subject.
    pub fn revert_subject(&mut self, subject_index: usize) -> GradeResult<&SubjectScores> {
        let committed = self.committed_subject(subject_index)?.clone();
        let subject = self.working_subject_mut(subject_index)?;
        *subject = committed;
        Ok(&*subject)
    }

    /// Writes one subject of the working copy into the roster. Other subjects
    /// and other students are not touched, so commits of different subjects
    /// commute.
    pub fn commit_subject(&mut self, subject_index: usize) -> GradeResult<CommitReceipt> {
        // Validate both sides before writing anything.
        self.committed_subject(subject_index)?;
        let edited = self.working_subject(subject_index)?.clone();
        let student_id = self.selected_student_id()?.to_string();

        let Some(student) = self.roster.get_mut(&student_id) else {
            return Err(GradeError::InvalidSelection(format!(
                "student {student_id} is no longer in the roster"
            )));
        };
        student.subjects[subject_index] = edited;
        let subject = &student.subjects[subject_index];

        let receipt = CommitReceipt {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            subject_index,
            subject_name: subject.subject_name.clone(),
            subject_code: subject.subject_code.clone(),
            message: format!(
                "Grades saved for {} - {}",
                student.name, subject.subject_name
            ),
            saved_at: chrono::Utc::now().to_rfc3339(),
        };
        tracing::info!(
            student_id = %receipt.student_id,
            subject_code = %receipt.subject_code,
            "subject committed"
        );
        Ok(receipt)
    }

    /// Indexes of subjects whose working copy differs from the roster.
    pub fn dirty_subjects(&self) -> Vec<usize> {
        let (Some(working), Some(selection)) = (self.working.as_ref(), self.selection.as_ref())
        else {
            return Vec::new();
        };
        let Some(committed) = self.roster.get(&selection.student_id) else {
            return Vec::new();
        };
        working
            .subjects
            .iter()
            .zip(committed.subjects.iter())
            .enumerate()
            .filter(|(_, (w, c))| w != c)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Snapshot of the editor; totals are computed from the working copy on
    /// every call.
    pub fn view(&self) -> GradingView {
        GradingView {
            selection: self.selection().cloned(),
            student: self.working.clone(),
            summary: self.working.as_ref().map(calc::summarize_student),
            dirty_subjects: self.dirty_subjects(),
        }
    }

    fn selected_student_id(&self) -> GradeResult<&str> {
        self.selection
            .as_ref()
            .map(|s| s.student_id.as_str())
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))
    }

    fn selection_mut(&mut self) -> GradeResult<&mut Selection> {
        self.selection
            .as_mut()
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))
    }

    fn subject_count(&self) -> GradeResult<usize> {
        let working = self
            .working
            .as_ref()
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))?;
        if working.subjects.is_empty() {
            return Err(GradeError::InvalidSelection(format!(
                "{} has no subjects",
                working.name
            )));
        }
        Ok(working.subjects.len())
    }

    fn check_index(&self, subject_index: usize) -> GradeResult<()> {
        let count = self
            .working
            .as_ref()
            .map(|w| w.subjects.len())
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))?;
        if subject_index >= count {
            return Err(GradeError::InvalidSelection(format!(
                "subject index {subject_index} out of range (0..{count})"
            )));
        }
        Ok(())
    }

    fn working_subject(&self, subject_index: usize) -> GradeResult<&SubjectScores> {
        self.check_index(subject_index)?;
        self.working
            .as_ref()
            .and_then(|w| w.subjects.get(subject_index))
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))
    }

    fn working_subject_mut(&mut self, subject_index: usize) -> GradeResult<&mut SubjectScores> {
        self.check_index(subject_index)?;
        self.working
            .as_mut()
            .and_then(|w| w.subjects.get_mut(subject_index))
            .ok_or_else(|| GradeError::InvalidSelection("no student selected".to_string()))
    }

    fn committed_subject(&self, subject_index: usize) -> GradeResult<&SubjectScores> {
        let student_id = self.selected_student_id()?;
        self.roster
            .get(student_id)
            .and_then(|s| s.subjects.get(subject_index))
            .ok_or_else(|| {
                GradeError::InvalidSelection(format!(
                    "subject index {subject_index} out of range for student {student_id}"
                ))
            })
    }
}

fn feedback_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
