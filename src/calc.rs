use crate::error::{GradeError, GradeResult};
use crate::model::{PeriodScores, ScoreField, Student, SubjectScores};
use serde::Serialize;

/// Display rounding for totals and averages: `Int(100*x + 0.5) / 100`.
pub fn round_off_2_decimal(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Two-decimal text for the presentation layer.
pub fn format_2_decimal(x: f64) -> String {
    format!("{:.2}", round_off_2_decimal(x))
}

/// A scored entry with four parts that averages to a single total.
pub trait Assessed {
    fn label(&self) -> &str;
    /// The four parts in display order.
    fn components(&self) -> [(&'static str, f64); 4];

    fn total(&self) -> f64 {
        let parts = self.components();
        parts.iter().map(|(_, v)| v).sum::<f64>() / parts.len() as f64
    }
}

impl Assessed for SubjectScores {
    fn label(&self) -> &str {
        &self.subject_name
    }

    fn components(&self) -> [(&'static str, f64); 4] {
        ScoreField::ALL.map(|f| (f.label(), self.score(f)))
    }
}

impl Assessed for PeriodScores {
    fn label(&self) -> &str {
        &self.subject_name
    }

    fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("Prelim", self.prelim),
            ("Midterm", self.midterm),
            ("Pre-Final", self.pre_final),
            ("Final", self.final_mark),
        ]
    }
}

pub fn subject_total(entry: &SubjectScores) -> f64 {
    entry.total()
}

pub fn period_total(entry: &PeriodScores) -> f64 {
    entry.total()
}

/// GWA: equal weight per subject, not per raw score.
pub fn student_average<T: Assessed>(entries: &[T]) -> GradeResult<f64> {
    if entries.is_empty() {
        return Err(GradeError::EmptyInput {
            what: "student average",
        });
    }
    let sum: f64 = entries.iter().map(Assessed::total).sum();
    Ok(sum / entries.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Excellent,
    VeryGood,
    Good,
    NeedsImprovement,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Excellent,
        Tier::VeryGood,
        Tier::Good,
        Tier::NeedsImprovement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::VeryGood => "Very Good",
            Tier::Good => "Good",
            Tier::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn legend_label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent (90+)",
            Tier::VeryGood => "Very Good (85-89)",
            Tier::Good => "Good (80-84)",
            Tier::NeedsImprovement => "Needs Improvement (<80)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Tier::Excellent => "rgba(75, 192, 75, 0.8)",
            Tier::VeryGood => "rgba(54, 162, 235, 0.8)",
            Tier::Good => "rgba(255, 159, 64, 0.8)",
            Tier::NeedsImprovement => "rgba(255, 99, 132, 0.8)",
        }
    }
}

/// Bands are closed on the lower bound. Out-of-range values are not clamped:
/// anything above 100 is still Excellent, anything below 0 (or NaN) lands in
/// NeedsImprovement.
pub fn performance_tier(value: f64) -> Tier {
    if value >= 90.0 {
        Tier::Excellent
    } else if value >= 85.0 {
        Tier::VeryGood
    } else if value >= 80.0 {
        Tier::Good
    } else {
        Tier::NeedsImprovement
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Improving,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: TrendDirection,
    pub symbol: &'static str,
    pub color: &'static str,
}

/// Trajectory, not magnitude: compares the final period against prelim only.
pub fn trend_classification(entry: &PeriodScores) -> Trend {
    if entry.final_mark >= entry.prelim {
        Trend {
            direction: TrendDirection::Improving,
            symbol: "📈",
            color: "green",
        }
    } else {
        Trend {
            direction: TrendDirection::Declining,
            symbol: "📉",
            color: "red",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject_name: String,
    pub subject_code: String,
    pub assignments: f64,
    pub quizzes: f64,
    pub projects: f64,
    pub exams: f64,
    pub total: f64,
    pub total_display: String,
    pub tier: Tier,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub subject_name: String,
    pub subject_code: String,
    pub prelim: f64,
    pub midterm: f64,
    pub pre_final: f64,
    #[serde(rename = "final")]
    pub final_mark: f64,
    pub total: f64,
    pub total_display: String,
    pub trend: Trend,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageSummary {
    pub value: f64,
    pub display: String,
    pub tier: Tier,
    pub tier_label: &'static str,
}

impl AverageSummary {
    fn from_value(value: f64) -> Self {
        let tier = performance_tier(value);
        Self {
            value: round_off_2_decimal(value),
            display: format_2_decimal(value),
            tier,
            tier_label: tier.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub name: String,
    pub subjects: Vec<SubjectRow>,
    /// `None` when the student has no subjects.
    pub gwa: Option<AverageSummary>,
    pub periods: Vec<PeriodRow>,
    pub period_gwa: Option<AverageSummary>,
}

pub fn subject_row(entry: &SubjectScores) -> SubjectRow {
    let total = subject_total(entry);
    SubjectRow {
        subject_name: entry.subject_name.clone(),
        subject_code: entry.subject_code.clone(),
        assignments: entry.assignments,
        quizzes: entry.quizzes,
        projects: entry.projects,
        exams: entry.exams,
        total: round_off_2_decimal(total),
        total_display: format_2_decimal(total),
        tier: performance_tier(total),
        feedback: entry.feedback.clone(),
    }
}

pub fn period_row(entry: &PeriodScores) -> PeriodRow {
    let total = period_total(entry);
    PeriodRow {
        subject_name: entry.subject_name.clone(),
        subject_code: entry.subject_code.clone(),
        prelim: entry.prelim,
        midterm: entry.midterm,
        pre_final: entry.pre_final,
        final_mark: entry.final_mark,
        total: round_off_2_decimal(total),
        total_display: format_2_decimal(total),
        trend: trend_classification(entry),
        feedback: entry.feedback.clone(),
    }
}

/// Everything a grade page shows for one student, recomputed from raw scores.
pub fn summarize_student(student: &Student) -> StudentSummary {
    let gwa = student_average(&student.subjects)
        .ok()
        .map(AverageSummary::from_value);
    let period_gwa = student_average(&student.periods)
        .ok()
        .map(AverageSummary::from_value);
    StudentSummary {
        student_id: student.id.clone(),
        name: student.name.clone(),
        subjects: student.subjects.iter().map(subject_row).collect(),
        gwa,
        periods: student.periods.iter().map(period_row).collect(),
        period_gwa,
    }
}
