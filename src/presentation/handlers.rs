// HTTP request handlers
use crate::domain::resample::Granularity;
use crate::domain::river::DatasetKind;
use crate::domain::view::{SelectOption, Selection, Visualization};
use crate::infrastructure::html_page::{render_page, PageModel};
use crate::infrastructure::http_response::html_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Selector values as submitted by the dashboard form
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub river: Option<String>,
    #[serde(default)]
    pub dataset: DatasetKind,
    #[serde(default)]
    pub visualization: Visualization,
    pub parameter: Option<String>,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub n_clicks: u32,
}

#[derive(Debug, Deserialize)]
pub struct ParameterQuery {
    pub river: String,
    #[serde(default)]
    pub dataset: DatasetKind,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// River dropdown options
pub async fn list_rivers(State(state): State<Arc<AppState>>) -> Json<Vec<SelectOption>> {
    Json(state.view_controller.river_options())
}

/// Parameter dropdown options for the current river and dataset
pub async fn parameter_options(
    Query(query): Query<ParameterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SelectOption>>, StatusCode> {
    state
        .view_controller
        .parameter_options(&query.river, query.dataset)
        .map(Json)
        .ok_or_else(|| {
            tracing::warn!("Parameter options requested for unknown river {}", query.river);
            StatusCode::NOT_FOUND
        })
}

/// Dashboard page; the output region is only computed once the display
/// button has been pressed
pub async fn dashboard_page(
    Query(query): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let controller = &state.view_controller;
    let river = query
        .river
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| controller.catalog().default_river().id.clone());
    let parameter = controller.resolve_parameter(&river, query.dataset, query.parameter.as_deref());

    let selection = Selection {
        river,
        dataset: query.dataset,
        visualization: query.visualization,
        parameter,
        granularity: query.granularity,
    };

    let view = controller.display(&selection, query.n_clicks).await;
    let rivers = controller.river_options();
    let parameters = controller
        .parameter_options(&selection.river, selection.dataset)
        .unwrap_or_default();

    let page = render_page(
        &PageModel {
            rivers: &rivers,
            parameters: &parameters,
            selection: &selection,
            n_clicks: query.n_clicks,
        },
        &view,
    );

    match html_response(StatusCode::OK, page) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loader_service::DataLoader;
    use crate::application::view_service::ViewController;
    use crate::domain::river::RiverCatalog;
    use crate::infrastructure::csv_repository::CsvRepository;
    use crate::presentation::router::build_router;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    const KUALASG_RAW: &str = "\
time,PH_Sensor,ORP_Sensor,TR_Sensor,CT_Sensor,TDS_Sensor,NH_SEnsor,DO_Sensor,COD_Sensor,BOD_Sensor
2024-03-01 00:00:00,7.1,210,25.3,120,60,0.4,6.8,12,3
2024-03-01 01:00:00,7.2,212,25.1,121,61,0.5,6.7,11,2
2024-03-02 00:00:00,n/a,208,25.0,119,59,0.4,6.9,12,3
";

    const BILUT_RAW: &str = "\
time,PH_Sensor,ORP_Sensor,CT_Sensor,TDS_Sensor,NH_sensor,COD_Sensor,DO_Sensor,BOD_Sensor,TR_Sensor
2024-03-01 00:00:00,7.0,-150,100,50,0.2,10,6.0,2,20
2024-03-01 06:00:00,7.1,-120,101,51,0.3,11,6.1,2,21
2024-03-08 00:00:00,7.2,90,102,52,0.2,10,6.2,3,22
";

    fn app(dir: &Path) -> Router {
        let repository = CsvRepository::new(
            dir.to_path_buf(),
            "${river}_Raw.csv".to_string(),
            "${river}_Cleaned.csv".to_string(),
        );
        let controller = ViewController::new(
            Arc::new(RiverCatalog::builtin()),
            DataLoader::new(Arc::new(repository)),
        );
        build_router(Arc::new(AppState {
            view_controller: controller,
        }))
    }

    fn data_dir() -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("KualaSG_Raw.csv"), KUALASG_RAW).unwrap();
        fs::write(dir.path().join("Bilut_Raw.csv"), BILUT_RAW).unwrap();
        dir
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = data_dir();
        let (status, body) = get(app(dir.path()), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_placeholder_until_display_pressed() {
        let dir = data_dir();
        let (status, body) = get(
            app(dir.path()),
            "/?river=KualaSG&dataset=raw&visualization=histogram&parameter=PH_Sensor",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Click &#39;Display Data&#39; to show the results."));
        assert!(!body.contains("<svg"));
        assert!(body.contains(r#"name="n_clicks" value="1""#));
    }

    #[tokio::test]
    async fn test_kualasg_raw_table() {
        let dir = data_dir();
        let (status, body) = get(
            app(dir.path()),
            "/?river=KualaSG&dataset=raw&visualization=table&n_clicks=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let header: String = [
            "Timestamp", "PH_Sensor", "ORP_Sensor", "TR_Sensor", "CT_Sensor", "TDS_Sensor",
            "NH_SEnsor", "DO_Sensor", "COD_Sensor", "BOD_Sensor",
        ]
        .iter()
        .map(|c| format!("<th>{}</th>", c))
        .collect();
        assert!(body.contains(&header));
        // header row plus one row per record
        assert_eq!(body.matches("<tr>").count(), 4);
        assert!(body.contains("<tr><td>2024-03-02 00:00:00</td><td></td><td>208</td>"));
        assert!(body.contains(r#"name="n_clicks" value="2""#));
    }

    #[tokio::test]
    async fn test_bilut_histogram() {
        let dir = data_dir();
        let (status, body) = get(
            app(dir.path()),
            "/?river=Bilut&dataset=raw&visualization=histogram&parameter=ORP_Sensor&n_clicks=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<svg"));
        assert!(body.contains("Bilut Raw Data - ORP_Sensor"));
    }

    #[tokio::test]
    async fn test_missing_cleaned_file_renders_empty_table() {
        let dir = data_dir();
        let (status, body) = get(
            app(dir.path()),
            "/?river=KualaSG&dataset=cleaned&visualization=table&n_clicks=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<th>Timestamp</th><th>PH_Sensor</th>"));
        assert_eq!(body.matches("<tr>").count(), 1);
    }

    #[tokio::test]
    async fn test_trend_without_parameter_is_notice() {
        let dir = data_dir();
        let (_, body) = get(
            app(dir.path()),
            "/?river=Bilut&visualization=trend&granularity=weekly&n_clicks=2",
        )
        .await;
        assert!(body.contains("Select a parameter to display."));
    }

    #[tokio::test]
    async fn test_weekly_trend_chart() {
        let dir = data_dir();
        let (_, body) = get(
            app(dir.path()),
            "/?river=Bilut&dataset=cleaned&visualization=trend&parameter=TR_Sensor&granularity=weekly&n_clicks=1",
        )
        .await;
        assert!(body.contains("<svg"));
        assert!(body.contains("Bilut Weekly trend - TR_Sensor"));
    }

    #[tokio::test]
    async fn test_parameter_options_endpoint() {
        let dir = data_dir();
        let (status, body) = get(app(dir.path()), "/parameters?river=Kechau&dataset=cleaned").await;
        assert_eq!(status, StatusCode::OK);
        let options: Vec<SelectOption> = serde_json::from_str(&body).unwrap();
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["ORP_Sensor", "CT_Sensor", "TDS_Sensor", "NH_Sensor"]);

        let (status, _) = get(app(dir.path()), "/parameters?river=Danube&dataset=raw").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rivers_endpoint_keeps_declared_order() {
        let dir = data_dir();
        let (_, body) = get(app(dir.path()), "/rivers").await;
        let options: Vec<SelectOption> = serde_json::from_str(&body).unwrap();
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["KualaSG", "Bilut", "Kechau"]);
    }

    #[tokio::test]
    async fn test_stale_parameter_not_selected_after_dataset_change() {
        let dir = data_dir();
        let (_, body) = get(
            app(dir.path()),
            "/?river=KualaSG&dataset=cleaned&visualization=histogram&parameter=BOD_Sensor&n_clicks=1",
        )
        .await;
        assert!(!body.contains("BOD_Sensor"));
        assert!(body.contains(r#"<option value="" selected>Select parameter</option>"#));
        assert!(body.contains("Select a parameter to display."));
    }

    #[tokio::test]
    async fn test_invalid_visualization_is_rejected() {
        let dir = data_dir();
        let (status, _) = get(app(dir.path()), "/?visualization=pie").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
