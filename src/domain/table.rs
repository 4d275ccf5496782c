// Table domain model - Time-indexed sensor readings
use super::river::TIMESTAMP_COLUMN;
use chrono::NaiveDateTime;

/// One numeric column; `None` marks a missing or unparseable reading
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Readings that are present, in row order
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }
}

/// Sensor readings indexed by timestamp. Rows keep file order and are never
/// dropped, so a row may carry a missing timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    timestamps: Vec<Option<NaiveDateTime>>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(timestamps: Vec<Option<NaiveDateTime>>, columns: Vec<Column>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == timestamps.len()));
        Self {
            timestamps,
            columns,
        }
    }

    /// A table with the given numeric columns and no rows
    pub fn empty<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            timestamps: Vec::new(),
            columns: names
                .iter()
                .map(|n| Column::new(n.as_ref(), Vec::new()))
                .collect(),
        }
    }

    pub fn timestamps(&self) -> &[Option<NaiveDateTime>] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Header of the table, timestamp first
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(TIMESTAMP_COLUMN.to_string())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<(Option<NaiveDateTime>, Vec<Option<f64>>)> {
        let timestamp = *self.timestamps.get(index)?;
        let values = self.columns.iter().map(|c| c.values[index]).collect();
        Some((timestamp, values))
    }
}
