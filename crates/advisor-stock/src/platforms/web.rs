//! Web dashboard
//!
//! Routes:
//! - `GET /` landing page
//! - `GET /analyze?q=...` analysis page
//! - `GET /report?ticker=...` PDF of the last analysis shown for a ticker (feature `pdf`)
//! - `GET /healthz`

use crate::cache::StockCache;
use crate::engine::{Advisor, Analysis};
use crate::error::StockError;
use crate::report::DashboardRenderer;
use crate::ticker::Ticker;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// How long a shown analysis stays downloadable as a PDF
const REPORT_LIFESPAN: Duration = Duration::from_secs(30 * 60);

/// Shared dashboard state
#[derive(Clone)]
pub struct AppState {
    /// Locked for the whole run so pipeline runs never overlap
    advisor: Arc<Mutex<Advisor>>,
    renderer: Arc<DashboardRenderer>,
    /// Latest successful analysis per ticker, exported by `/report`
    reports: StockCache<Ticker, Analysis>,
}

impl AppState {
    pub fn new(advisor: Advisor, renderer: DashboardRenderer) -> Self {
        Self {
            advisor: Arc::new(Mutex::new(advisor)),
            renderer: Arc::new(renderer),
            reports: StockCache::new(REPORT_LIFESPAN),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    q: Option<String>,
}

impl AnalyzeParams {
    fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[cfg(feature = "pdf")]
#[derive(Debug, Deserialize)]
struct ReportParams {
    ticker: Option<String>,
}

/// Build the dashboard router
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/analyze", get(analyze))
        .route("/healthz", get(healthz));

    #[cfg(feature = "pdf")]
    let router = router.route("/report", get(report));

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the dashboard until Ctrl-C
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Response {
    page(state.renderer.index())
}

async fn analyze(State(state): State<AppState>, Query(params): Query<AnalyzeParams>) -> Response {
    let Some(query) = params.query() else {
        return page(state.renderer.index());
    };

    let outcome = state.advisor.lock().await.analyze(query).await;
    match outcome {
        Ok(analysis) => {
            let rendered = state.renderer.analysis(&analysis);
            state.reports.insert(analysis.ticker.clone(), analysis).await;
            page(rendered)
        }
        Err(err) => {
            warn!(query, stage = err.stage(), error = %err, "analysis failed");
            let status = status_for(&err);
            (status, page(state.renderer.error(query, &err))).into_response()
        }
    }
}

#[cfg(feature = "pdf")]
async fn report(State(state): State<AppState>, Query(params): Query<ReportParams>) -> Response {
    use axum::http::header;

    let Some(ticker) = params.ticker.as_deref().map(str::trim).and_then(Ticker::parse) else {
        return (StatusCode::BAD_REQUEST, "missing or invalid ticker parameter").into_response();
    };

    let Some(analysis) = state.reports.get(&ticker).await else {
        return (
            StatusCode::NOT_FOUND,
            format!("No recent analysis for {ticker}. Analyze it on the dashboard first."),
        )
            .into_response();
    };

    match crate::report::pdf::render_pdf(&analysis) {
        Ok(bytes) => {
            let name = crate::report::pdf::report_file_name(
                &analysis.ticker,
                analysis.recommendation.generated_at.date_naive(),
            );
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{name}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            warn!(ticker = %analysis.ticker, error = %err, "PDF report unavailable");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

fn page(rendered: crate::error::Result<String>) -> Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

fn status_for(err: &StockError) -> StatusCode {
    match err {
        StockError::ResolutionFailure { .. } | StockError::DataUnavailable { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        e if e.is_rate_limited() => StatusCode::SERVICE_UNAVAILABLE,
        StockError::ProviderError(_) | StockError::Llm { .. } => StatusCode::BAD_GATEWAY,
        StockError::ConfigurationError(_) | StockError::RenderFailure(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MarketDataProvider;
    use crate::config::StockConfig;
    use crate::test_support::{ScriptedProvider, info};
    #[cfg(feature = "pdf")]
    use crate::test_support::{MockLlm, reply};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(provider: Arc<ScriptedProvider>) -> Router {
        let advisor = Advisor::demo(provider as Arc<dyn MarketDataProvider>, &StockConfig::default());
        router(AppState::new(advisor, DashboardRenderer::new().unwrap()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn nvda_provider() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new(info(Some(100.0), Some(130.0))))
    }

    #[tokio::test]
    async fn test_healthz() {
        let (status, body) = get(app(nvda_provider()), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_index_page() {
        let (status, body) = get(app(nvda_provider()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Quick tickers"));
    }

    #[tokio::test]
    async fn test_analyze_renders_recommendation() {
        let (status, body) = get(app(nvda_provider()), "/analyze?q=NVDA").await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("RECOMMENDATION: BUY"));
    }

    #[tokio::test]
    async fn test_analyze_without_query_shows_landing_page() {
        let (status, body) = get(app(nvda_provider()), "/analyze?q=%20").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Quick tickers"));
    }

    #[tokio::test]
    async fn test_analyze_failure_names_stage() {
        let provider = Arc::new(ScriptedProvider::new(info(Some(10.0), None)));
        let (status, body) = get(app(provider), "/analyze?q=XYZ").await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Analysis failed during market data."));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_report_download_after_analysis() {
        let app = app(nvda_provider());
        let (status, _) = get(app.clone(), "/analyze?q=NVDA").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app, "/report?ticker=NVDA").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"%PDF"));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_report_requires_prior_analysis() {
        let provider = nvda_provider();
        let app = app(Arc::clone(&provider));

        let (status, _) = get(app.clone(), "/report?ticker=NVDA").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(provider.info_calls(), 0);

        let (status, _) = get(app, "/report?ticker=nvda!").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_report_exports_shown_analysis_without_new_model_call() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .times(1)
            .returning(|_| Ok(reply("BUY, analysts see 30% upside.")));
        llm.expect_name().return_const("mock".to_string());

        let provider = nvda_provider();
        let advisor = Advisor::model_backed(
            Arc::new(llm),
            Arc::clone(&provider) as Arc<dyn MarketDataProvider>,
            &StockConfig::default(),
        );
        let app = router(AppState::new(advisor, DashboardRenderer::new().unwrap()));

        let (status, body) = get(app.clone(), "/analyze?q=NVDA").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/report?ticker=NVDA"));

        let (status, body) = get(app, "/report?ticker=NVDA").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"%PDF"));
        assert_eq!(provider.info_calls(), 1);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&StockError::ProviderError("Too Many Requests".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&StockError::ProviderError("timeout".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&StockError::ResolutionFailure {
                input: "Acme".to_string()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
