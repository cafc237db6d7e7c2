use crate::calc::{performance_tier, round_off_2_decimal, Assessed, Tier};
use crate::error::{GradeError, GradeResult};
use serde::Serialize;

/// Slice colors for the four parts of a single-subject breakdown.
pub const COMPONENT_COLORS: [&str; 4] = ["#42a5f5", "#66bb6a", "#ffa726", "#ef5350"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Distribution,
    Comparison,
    Trend,
}

impl ChartKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "distribution" => Some(ChartKind::Distribution),
            "comparison" => Some(ChartKind::Comparison),
            "trend" => Some(ChartKind::Trend),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Distribution => "Grade Component Distribution",
            ChartKind::Comparison => "Average Grades by Subject",
            ChartKind::Trend => "Grades Over Subjects",
        }
    }
}

/// Renderer-agnostic chart data. `colors`, when present, has one entry per
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub kind: ChartKind,
    pub title: &'static str,
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<Tier>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub tier: Tier,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn tier_legend() -> Vec<LegendEntry> {
    Tier::ALL
        .iter()
        .map(|t| LegendEntry {
            tier: *t,
            label: t.legend_label(),
            color: t.color(),
        })
        .collect()
}

/// Builds the series for `kind`.
///
/// `subject_index` only matters for `Distribution`, which breaks down the
/// first entry unless told otherwise and fails on an empty list. The
/// cross-subject kinds return an empty series for an empty list.
pub fn build_chart<T: Assessed>(
    entries: &[T],
    kind: ChartKind,
    subject_index: Option<usize>,
) -> GradeResult<ChartModel> {
    match kind {
        ChartKind::Distribution => distribution(entries, subject_index.unwrap_or(0)),
        ChartKind::Comparison => Ok(cross_subject(entries, kind, false)),
        ChartKind::Trend => Ok(cross_subject(entries, kind, true)),
    }
}

fn distribution<T: Assessed>(entries: &[T], subject_index: usize) -> GradeResult<ChartModel> {
    if entries.is_empty() {
        return Err(GradeError::EmptyInput {
            what: "distribution chart",
        });
    }
    let Some(entry) = entries.get(subject_index) else {
        return Err(GradeError::InvalidSelection(format!(
            "subject index {subject_index} out of range (0..{})",
            entries.len()
        )));
    };
    let parts = entry.components();
    Ok(ChartModel {
        kind: ChartKind::Distribution,
        title: ChartKind::Distribution.title(),
        series_label: entry.label().to_string(),
        labels: parts.iter().map(|(label, _)| label.to_string()).collect(),
        values: parts.iter().map(|(_, v)| *v).collect(),
        colors: Some(COMPONENT_COLORS.to_vec()),
        tiers: None,
    })
}

fn cross_subject<T: Assessed>(entries: &[T], kind: ChartKind, banded: bool) -> ChartModel {
    let labels = entries.iter().map(|e| e.label().to_string()).collect();
    let values: Vec<f64> = entries
        .iter()
        .map(|e| round_off_2_decimal(e.total()))
        .collect();
    // Bands come from the unrounded total, same as the summary rows.
    let tiers: Option<Vec<Tier>> =
        banded.then(|| entries.iter().map(|e| performance_tier(e.total())).collect());
    let colors = tiers
        .as_ref()
        .map(|ts| ts.iter().map(|t| t.color()).collect());

    ChartModel {
        kind,
        title: kind.title(),
        series_label: "Average Grades".to_string(),
        labels,
        values,
        colors,
        tiers,
    }
}
