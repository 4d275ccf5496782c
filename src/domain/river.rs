// River domain model - Schema profiles and the catalog of monitored rivers
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Which of the two CSV files of a river is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[default]
    Raw,
    Cleaned,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Raw, DatasetKind::Cleaned];

    pub fn value(&self) -> &'static str {
        match self {
            DatasetKind::Raw => "raw",
            DatasetKind::Cleaned => "cleaned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Raw => "Raw Data",
            DatasetKind::Cleaned => "Cleaned Data",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("river catalog is empty")]
    Empty,
    #[error("river '{0}' is declared more than once")]
    DuplicateRiver(String),
    #[error("{river}/{kind} schema declares no columns")]
    NoColumns { river: String, kind: DatasetKind },
    #[error("{river}/{kind} schema must start with a time column, found '{found}'")]
    MissingTimeColumn {
        river: String,
        kind: DatasetKind,
        found: String,
    },
    #[error("{river}/{kind} schema has a second time-like column '{column}'")]
    ExtraTimeColumn {
        river: String,
        kind: DatasetKind,
        column: String,
    },
    #[error("{river}/{kind} schema declares '{column}' twice")]
    DuplicateColumn {
        river: String,
        kind: DatasetKind,
        column: String,
    },
}

/// Maps any column whose name contains "time" (case-insensitive) to the
/// canonical timestamp name.
pub fn canonical_column_name(name: &str) -> &str {
    if is_time_like(name) {
        TIMESTAMP_COLUMN
    } else {
        name
    }
}

pub fn is_time_like(name: &str) -> bool {
    name.to_lowercase().contains("time")
}

/// Declared CSV columns of one river, as written in the source files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverProfile {
    pub id: String,
    pub raw: Vec<String>,
    pub cleaned: Vec<String>,
}

impl RiverProfile {
    pub fn new(id: impl Into<String>, raw: &[&str], cleaned: &[&str]) -> Self {
        Self {
            id: id.into(),
            raw: raw.iter().map(|c| c.to_string()).collect(),
            cleaned: cleaned.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Column names exactly as they appear in the CSV header
    pub fn source_columns(&self, kind: DatasetKind) -> &[String] {
        match kind {
            DatasetKind::Raw => &self.raw,
            DatasetKind::Cleaned => &self.cleaned,
        }
    }

    /// Column names after renaming the time column
    pub fn columns(&self, kind: DatasetKind) -> Vec<String> {
        self.source_columns(kind)
            .iter()
            .map(|c| canonical_column_name(c).to_string())
            .collect()
    }

    /// Selectable parameters: every declared column except the time column
    pub fn parameters(&self, kind: DatasetKind) -> Vec<String> {
        self.source_columns(kind).iter().skip(1).cloned().collect()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for kind in DatasetKind::ALL {
            let columns = self.source_columns(kind);
            let Some(first) = columns.first() else {
                return Err(CatalogError::NoColumns {
                    river: self.id.clone(),
                    kind,
                });
            };
            if !is_time_like(first) {
                return Err(CatalogError::MissingTimeColumn {
                    river: self.id.clone(),
                    kind,
                    found: first.clone(),
                });
            }
            if let Some(extra) = columns.iter().skip(1).find(|c| is_time_like(c)) {
                return Err(CatalogError::ExtraTimeColumn {
                    river: self.id.clone(),
                    kind,
                    column: extra.clone(),
                });
            }
            let mut seen = HashSet::new();
            for column in columns {
                if !seen.insert(column.as_str()) {
                    return Err(CatalogError::DuplicateColumn {
                        river: self.id.clone(),
                        kind,
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Ordered set of river profiles; declaration order is dropdown order
#[derive(Debug, Clone)]
pub struct RiverCatalog {
    rivers: Vec<RiverProfile>,
}

impl RiverCatalog {
    pub fn new(rivers: Vec<RiverProfile>) -> Result<Self, CatalogError> {
        if rivers.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut ids = HashSet::new();
        for river in &rivers {
            if !ids.insert(river.id.as_str()) {
                return Err(CatalogError::DuplicateRiver(river.id.clone()));
            }
            river.validate()?;
        }
        Ok(Self { rivers })
    }

    /// The three monitored rivers with their recorded schemas
    pub fn builtin() -> Self {
        Self {
            rivers: vec![
                RiverProfile::new(
                    "KualaSG",
                    &[
                        "time", "PH_Sensor", "ORP_Sensor", "TR_Sensor", "CT_Sensor", "TDS_Sensor",
                        "NH_SEnsor", "DO_Sensor", "COD_Sensor", "BOD_Sensor",
                    ],
                    &["Timestamp", "PH_Sensor", "ORP_Sensor", "TR_Sensor", "CT_Sensor", "DO_Sensor"],
                ),
                RiverProfile::new(
                    "Bilut",
                    &[
                        "time", "PH_Sensor", "ORP_Sensor", "CT_Sensor", "TDS_Sensor", "NH_sensor",
                        "COD_Sensor", "DO_Sensor", "BOD_Sensor", "TR_Sensor",
                    ],
                    &[
                        "Timestamp", "PH_Sensor", "ORP_Sensor", "CT_Sensor", "TDS_Sensor",
                        "NH_sensor", "TR_Sensor",
                    ],
                ),
                RiverProfile::new(
                    "Kechau",
                    &[
                        "time", "Ph_Sensor", "ORP_Sensor", "CT_Sensor", "TDS_Sensor", "NH_Sensor",
                        "DO_Sensor", "TR_Sensor", "BOD_Sensor", "COD_Sensor",
                    ],
                    &["Timestamp", "ORP_Sensor", "CT_Sensor", "TDS_Sensor", "NH_Sensor"],
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&RiverProfile> {
        self.rivers.iter().find(|r| r.id == id)
    }

    pub fn rivers(&self) -> &[RiverProfile] {
        &self.rivers
    }

    pub fn default_river(&self) -> &RiverProfile {
        &self.rivers[0]
    }

    /// Parameter list for a (river, dataset) pair, `None` for an unknown river
    pub fn parameter_options(&self, river: &str, kind: DatasetKind) -> Option<Vec<String>> {
        self.get(river).map(|profile| profile.parameters(kind))
    }
}
