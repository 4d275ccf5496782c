// View domain model - User selections and the rendering they resolve to
use super::resample::Granularity;
use super::river::DatasetKind;
use super::table::Table;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_TEXT: &str = "Click 'Display Data' to show the results.";
pub const MISSING_PARAMETER_TEXT: &str = "Select a parameter to display.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    #[default]
    Table,
    Histogram,
    Trend,
}

impl Visualization {
    pub const ALL: [Visualization; 3] = [
        Visualization::Table,
        Visualization::Histogram,
        Visualization::Trend,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Visualization::Table => "table",
            Visualization::Histogram => "histogram",
            Visualization::Trend => "trend",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Visualization::Table => "Show Data Table",
            Visualization::Histogram => "Variable Distribution (Histogram)",
            Visualization::Trend => "Trend Analysis (Daily/Weekly/Monthly)",
        }
    }
}

/// State of all selectors at the moment of a request
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub river: String,
    pub dataset: DatasetKind,
    pub visualization: Visualization,
    pub parameter: Option<String>,
    pub granularity: Granularity,
}

/// Dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins between min and max, bin count by Sturges' rule.
/// Non-finite values are ignored.
pub fn histogram_bins(values: &[f64]) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_count = ((finite.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / bin_count as f64;
    // a single bin when the range is empty or too wide to split
    if min == max || !width.is_finite() {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for value in finite {
        // the last bin is closed on the right
        let i = (((value - min) / width) as usize).min(bin_count - 1);
        bins[i].count += 1;
    }
    bins
}

/// What the output region shows
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Nothing has been requested yet
    Placeholder,
    /// A message in place of a table or chart
    Notice(String),
    Table {
        river: String,
        dataset: DatasetKind,
        table: Table,
    },
    Histogram {
        river: String,
        dataset: DatasetKind,
        parameter: String,
        bins: Vec<HistogramBin>,
    },
    Trend {
        river: String,
        parameter: String,
        granularity: Granularity,
        points: Vec<(NaiveDate, Option<f64>)>,
    },
}
