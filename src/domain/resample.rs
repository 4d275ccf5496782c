// Resampling - Mean aggregation over calendar buckets
use super::table::{Column, Table};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn value(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    /// Label of the bucket holding `date`: the day itself, the Sunday that
    /// ends its week, or the last day of its month. `None` past the end of
    /// the calendar.
    pub fn bucket_of(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Daily => Some(date),
            Granularity::Weekly => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_days(Days::new(to_sunday as u64))
            }
            Granularity::Monthly => month_end(date.year(), date.month()),
        }
    }

    /// Label of the bucket following `label`
    fn next_bucket(&self, label: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Daily => label.checked_add_days(Days::new(1)),
            Granularity::Weekly => label.checked_add_days(Days::new(7)),
            Granularity::Monthly => {
                let first_of_next = label.checked_add_days(Days::new(1))?;
                month_end(first_of_next.year(), first_of_next.month())
            }
        }
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

/// Mean per column per bucket, indexed by bucket label
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledTable {
    pub granularity: Granularity,
    pub index: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl ResampledTable {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// (bucket, mean) pairs of one column
    pub fn series(&self, name: &str) -> Option<Vec<(NaiveDate, Option<f64>)>> {
        let column = self.column(name)?;
        Some(self.index.iter().copied().zip(column.values.iter().copied()).collect())
    }
}

/// Rows without a timestamp are skipped. Buckets run contiguously from the
/// first to the last bucket touched, so gaps show up as all-missing rows.
pub fn resample(table: &Table, granularity: Granularity) -> ResampledTable {
    let labels: Vec<Option<NaiveDate>> = table
        .timestamps()
        .iter()
        .map(|ts| ts.and_then(|t| granularity.bucket_of(t.date())))
        .collect();

    let (first, last) = match (labels.iter().flatten().min(), labels.iter().flatten().max()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return ResampledTable {
                granularity,
                index: Vec::new(),
                columns: table
                    .columns()
                    .iter()
                    .map(|c| Column::new(c.name.clone(), Vec::new()))
                    .collect(),
            };
        }
    };

    let mut index = Vec::new();
    let mut label = Some(first);
    while let Some(current) = label.filter(|l| *l <= last) {
        index.push(current);
        label = granularity.next_bucket(current);
    }
    let position: HashMap<NaiveDate, usize> =
        index.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let mut sums = vec![0.0; index.len()];
            let mut counts = vec![0usize; index.len()];
            for (label, value) in labels.iter().zip(column.values.iter()) {
                if let (Some(label), Some(value)) = (label, value) {
                    let i = position[label];
                    sums[i] += value;
                    counts[i] += 1;
                }
            }
            let means = sums
                .into_iter()
                .zip(counts)
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect();
            Column::new(column.name.clone(), means)
        })
        .collect();

    let resampled = ResampledTable {
        granularity,
        index,
        columns,
    };
    tracing::debug!(
        "Resampled {} rows into {} {} buckets",
        table.row_count(),
        resampled.row_count(),
        resampled.granularity.value()
    );
    resampled
}
