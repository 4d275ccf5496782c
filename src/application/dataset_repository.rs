// Repository trait for sensor dataset access
use crate::domain::river::{DatasetKind, RiverProfile};
use crate::domain::table::Table;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{} lacks declared columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },
}

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Load one dataset of a river, restricted to its declared columns.
    /// The time column comes back renamed and parsed, the rest coerced to numbers.
    async fn load_table(&self, profile: &RiverProfile, kind: DatasetKind) -> Result<Table, LoadError>;
}
