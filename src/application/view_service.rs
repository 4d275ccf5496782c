// View controller - Parameter derivation and display resolution
use crate::application::loader_service::DataLoader;
use crate::domain::river::{DatasetKind, RiverCatalog, RiverProfile};
use crate::domain::table::Table;
use crate::domain::view::{
    histogram_bins, Selection, SelectOption, View, Visualization, MISSING_PARAMETER_TEXT,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ViewController {
    catalog: Arc<RiverCatalog>,
    loader: DataLoader,
}

impl ViewController {
    pub fn new(catalog: Arc<RiverCatalog>, loader: DataLoader) -> Self {
        Self { catalog, loader }
    }

    pub fn catalog(&self) -> &RiverCatalog {
        &self.catalog
    }

    pub fn river_options(&self) -> Vec<SelectOption> {
        self.catalog
            .rivers()
            .iter()
            .map(|r| SelectOption::same(r.id.clone()))
            .collect()
    }

    /// Options of the parameter dropdown for a (river, dataset) pair.
    /// `None` when the river is unknown.
    pub fn parameter_options(&self, river: &str, dataset: DatasetKind) -> Option<Vec<SelectOption>> {
        self.catalog
            .parameter_options(river, dataset)
            .map(|params| params.into_iter().map(SelectOption::same).collect())
    }

    /// Keeps the requested parameter only if the current pair still offers it
    pub fn resolve_parameter(
        &self,
        river: &str,
        dataset: DatasetKind,
        requested: Option<&str>,
    ) -> Option<String> {
        let requested = requested.filter(|p| !p.is_empty())?;
        let offered = self.catalog.parameter_options(river, dataset)?;
        if offered.iter().any(|p| p == requested) {
            Some(requested.to_string())
        } else {
            tracing::warn!(
                "Dropping parameter {} not offered for {}/{}",
                requested,
                river,
                dataset
            );
            None
        }
    }

    /// Resolve the output region. Data is loaded only once the trigger has
    /// been activated, and freshly on every activation.
    pub async fn display(&self, selection: &Selection, n_clicks: u32) -> View {
        if n_clicks == 0 {
            return View::Placeholder;
        }

        let Some(profile) = self.catalog.get(&selection.river) else {
            return View::Notice(format!("Unknown river '{}'.", selection.river));
        };

        let parameter = self.resolve_parameter(
            &selection.river,
            selection.dataset,
            selection.parameter.as_deref(),
        );

        match selection.visualization {
            Visualization::Table => self.table_view(profile, selection.dataset).await,
            Visualization::Histogram => match parameter {
                Some(parameter) => self.histogram_view(profile, selection.dataset, parameter).await,
                None => View::Notice(MISSING_PARAMETER_TEXT.to_string()),
            },
            Visualization::Trend => match parameter {
                Some(parameter) => self.trend_view(profile, selection, parameter).await,
                None => View::Notice(MISSING_PARAMETER_TEXT.to_string()),
            },
        }
    }

    async fn table_view(&self, profile: &RiverProfile, dataset: DatasetKind) -> View {
        let table = self
            .loader
            .load(profile)
            .await
            .into_dataset(dataset)
            .map(|d| d.table)
            .unwrap_or_else(|| Table::empty(&profile.columns(dataset)[1..]));

        View::Table {
            river: profile.id.clone(),
            dataset,
            table,
        }
    }

    async fn histogram_view(&self, profile: &RiverProfile, dataset: DatasetKind, parameter: String) -> View {
        let bundle = self.loader.load(profile).await;
        let values: Vec<f64> = bundle
            .dataset(dataset)
            .and_then(|d| d.table.column(&parameter))
            .map(|c| c.present().collect())
            .unwrap_or_default();

        View::Histogram {
            river: bundle.river,
            dataset,
            bins: histogram_bins(&values),
            parameter,
        }
    }

    /// Trend charts always read the raw resampled series, whatever dataset is selected
    async fn trend_view(&self, profile: &RiverProfile, selection: &Selection, parameter: String) -> View {
        if !profile.parameters(DatasetKind::Raw).contains(&parameter) {
            return View::Notice(format!(
                "{} is not recorded in the raw {} dataset.",
                parameter, profile.id
            ));
        }

        let bundle = self.loader.load(profile).await;
        let points = bundle
            .dataset(DatasetKind::Raw)
            .and_then(|d| d.resampled(selection.granularity).series(&parameter))
            .unwrap_or_default();

        View::Trend {
            river: bundle.river,
            parameter,
            granularity: selection.granularity,
            points,
        }
    }
}
