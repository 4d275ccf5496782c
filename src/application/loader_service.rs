// Data loader service - Fresh per-request loading and resampling of a river's datasets
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::resample::{resample, Granularity, ResampledTable};
use crate::domain::river::{DatasetKind, RiverProfile};
use crate::domain::table::Table;
use std::sync::Arc;

/// A dataset together with its three resampled views
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub table: Table,
    pub daily: ResampledTable,
    pub weekly: ResampledTable,
    pub monthly: ResampledTable,
}

impl LoadedDataset {
    pub fn from_table(table: Table) -> Self {
        let daily = resample(&table, Granularity::Daily);
        let weekly = resample(&table, Granularity::Weekly);
        let monthly = resample(&table, Granularity::Monthly);
        Self {
            table,
            daily,
            weekly,
            monthly,
        }
    }

    pub fn resampled(&self, granularity: Granularity) -> &ResampledTable {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Weekly => &self.weekly,
            Granularity::Monthly => &self.monthly,
        }
    }
}

/// The eight tables of one river; a dataset whose file failed to load is absent
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub river: String,
    pub raw: Option<LoadedDataset>,
    pub cleaned: Option<LoadedDataset>,
}

impl DatasetBundle {
    pub fn dataset(&self, kind: DatasetKind) -> Option<&LoadedDataset> {
        match kind {
            DatasetKind::Raw => self.raw.as_ref(),
            DatasetKind::Cleaned => self.cleaned.as_ref(),
        }
    }

    pub fn into_dataset(self, kind: DatasetKind) -> Option<LoadedDataset> {
        match kind {
            DatasetKind::Raw => self.raw,
            DatasetKind::Cleaned => self.cleaned,
        }
    }
}

#[derive(Clone)]
pub struct DataLoader {
    repository: Arc<dyn DatasetRepository>,
}

impl DataLoader {
    pub fn new(repository: Arc<dyn DatasetRepository>) -> Self {
        Self { repository }
    }

    /// Never fails: each dataset loads independently and a failure only
    /// leaves that dataset absent.
    pub async fn load(&self, profile: &RiverProfile) -> DatasetBundle {
        let raw = self.load_dataset(profile, DatasetKind::Raw).await;
        let cleaned = self.load_dataset(profile, DatasetKind::Cleaned).await;
        DatasetBundle {
            river: profile.id.clone(),
            raw,
            cleaned,
        }
    }

    async fn load_dataset(&self, profile: &RiverProfile, kind: DatasetKind) -> Option<LoadedDataset> {
        match self.repository.load_table(profile, kind).await {
            Ok(table) => {
                tracing::debug!(
                    "Loaded {} {} dataset: {} rows, {} columns",
                    profile.id,
                    kind,
                    table.row_count(),
                    table.columns().len() + 1
                );
                Some(LoadedDataset::from_table(table))
            }
            Err(e) => {
                tracing::error!("Error loading {} {} dataset: {}", profile.id, kind, e);
                tracing::error!("Ensure CSV files are available in the data directory");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::dataset_repository::LoadError;
    use crate::domain::river::RiverCatalog;
    use crate::domain::table::Column;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// In-memory repository keyed by (river, kind); absent entries behave like missing files
    #[derive(Default)]
    pub(crate) struct MemoryRepository {
        pub tables: HashMap<(String, DatasetKind), Table>,
    }

    impl MemoryRepository {
        pub fn with(mut self, river: &str, kind: DatasetKind, table: Table) -> Self {
            self.tables.insert((river.to_string(), kind), table);
            self
        }
    }

    #[async_trait]
    impl DatasetRepository for MemoryRepository {
        async fn load_table(&self, profile: &RiverProfile, kind: DatasetKind) -> Result<Table, LoadError> {
            self.tables
                .get(&(profile.id.clone(), kind))
                .cloned()
                .ok_or_else(|| LoadError::NotFound(PathBuf::from(format!("{}_{}.csv", profile.id, kind))))
        }
    }

    pub(crate) fn two_day_table(names: &[&str]) -> Table {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).and_then(|d| d.and_hms_opt(8, 0, 0));
        Table::new(
            vec![day(1), day(1), day(2)],
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let base = i as f64;
                    Column::new(*n, vec![Some(base), Some(base + 2.0), None])
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_load_produces_eight_tables() {
        let repository = MemoryRepository::default()
            .with("Bilut", DatasetKind::Raw, two_day_table(&["PH_Sensor"]))
            .with("Bilut", DatasetKind::Cleaned, two_day_table(&["PH_Sensor"]));
        let loader = DataLoader::new(Arc::new(repository));
        let catalog = RiverCatalog::builtin();

        let bundle = loader.load(catalog.get("Bilut").unwrap()).await;
        for kind in DatasetKind::ALL {
            let dataset = bundle.dataset(kind).unwrap();
            assert_eq!(dataset.table.row_count(), 3);
            assert_eq!(dataset.daily.row_count(), 2);
            assert_eq!(dataset.weekly.row_count(), 1);
            assert_eq!(dataset.monthly.row_count(), 1);
            assert_eq!(
                dataset.resampled(Granularity::Daily).column("PH_Sensor").unwrap().values,
                vec![Some(1.0), None]
            );
        }
    }

    #[tokio::test]
    async fn test_missing_cleaned_file_keeps_raw() {
        let repository = MemoryRepository::default().with(
            "Kechau",
            DatasetKind::Raw,
            two_day_table(&["ORP_Sensor"]),
        );
        let loader = DataLoader::new(Arc::new(repository));
        let catalog = RiverCatalog::builtin();

        let bundle = loader.load(catalog.get("Kechau").unwrap()).await;
        assert!(bundle.raw.is_some());
        assert!(bundle.cleaned.is_none());
        assert_eq!(bundle.river, "Kechau");
    }
}
