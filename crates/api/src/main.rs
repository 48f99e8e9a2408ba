use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hypewatch_core::aggregate::{Engine, Providers};
use hypewatch_core::cache::clock::SystemClock;
use hypewatch_core::config::Settings;
use hypewatch_core::domain::prediction::{CorrelationMatrix, PredictionResult};
use hypewatch_core::domain::ticker::Ticker;
use hypewatch_core::error::RegistryError;
use hypewatch_core::ingest::provider::HttpJsonProvider;
use hypewatch_core::registry::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let engine = match HttpJsonProvider::from_settings(&settings) {
        Ok(provider) => Some(Arc::new(Engine::new(
            Registry::with_default_watchlist(),
            Providers::from_single(Arc::new(provider)),
            settings.engine.clone(),
            Arc::new(SystemClock),
        ))),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "market data provider unavailable; starting API in degraded mode");
            None
        }
    };

    let app = router(AppState { engine });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/tickers", get(list_tickers))
        .route("/add-stock", post(add_stock))
        .route("/hype", get(hype_all))
        .route("/hype/:ticker", get(hype_ticker))
        .route("/correlations", get(correlations))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "hypewatch live"
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    engine: Option<Arc<Engine>>,
}

impl AppState {
    fn engine(&self) -> Result<&Engine, ApiError> {
        self.engine.as_deref().ok_or_else(|| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                error_body("market data provider is not configured"),
            )
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_body(msg: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody { error: msg.into() })
}

fn bad_request(err: RegistryError) -> ApiError {
    (StatusCode::BAD_REQUEST, error_body(err.to_string()))
}

async fn list_tickers(State(state): State<AppState>) -> Result<Json<Vec<Ticker>>, ApiError> {
    Ok(Json(state.engine()?.tickers()))
}

#[derive(Debug, Deserialize)]
struct AddStockRequest {
    ticker: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AddStockResponse {
    message: String,
    ticker: Ticker,
}

async fn add_stock(
    State(state): State<AppState>,
    Json(req): Json<AddStockRequest>,
) -> Result<Json<AddStockResponse>, ApiError> {
    let engine = state.engine()?;
    let ticker = engine.add_ticker(&req.ticker, &req.aliases).map_err(|e| {
        tracing::warn!(ticker = %req.ticker, error = %e, "add-stock rejected");
        bad_request(e)
    })?;

    Ok(Json(AddStockResponse {
        message: format!("Added {} successfully.", ticker.id),
        ticker,
    }))
}

async fn hype_all(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, PredictionResult>>, ApiError> {
    Ok(Json(state.engine()?.aggregate_all().await))
}

async fn hype_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PredictionResult>, ApiError> {
    let result = state
        .engine()?
        .aggregate(&ticker)
        .await
        .map_err(bad_request)?;
    Ok(Json(result))
}

async fn correlations(State(state): State<AppState>) -> Result<Json<CorrelationMatrix>, ApiError> {
    Ok(Json(state.engine()?.correlations().await))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hypewatch_core::config::EngineConfig;
    use hypewatch_core::domain::market::{PriceBar, TextItem};
    use hypewatch_core::ingest::provider::{
        NewsTextProvider, PriceHistoryProvider, SocialTextProvider,
    };
    use hypewatch_core::ingest::types::SearchFilters;

    struct QuietMarket;

    #[async_trait::async_trait]
    impl PriceHistoryProvider for QuietMarket {
        async fn history(&self, _: &str, _: NaiveDate, _: NaiveDate) -> anyhow::Result<Vec<PriceBar>> {
            Ok(Vec::new())
        }
    }

    #[async_trait::async_trait]
    impl SocialTextProvider for QuietMarket {
        async fn recent_posts(&self, _: &[String], _: usize) -> anyhow::Result<Vec<TextItem>> {
            Ok(Vec::new())
        }

        async fn search(&self, _: &str, _: &SearchFilters) -> anyhow::Result<Vec<TextItem>> {
            Ok(Vec::new())
        }
    }

    #[async_trait::async_trait]
    impl NewsTextProvider for QuietMarket {
        async fn search(
            &self,
            _: &str,
            _: NaiveDate,
            _: NaiveDate,
            _: usize,
        ) -> anyhow::Result<Vec<TextItem>> {
            Ok(Vec::new())
        }
    }

    fn state() -> AppState {
        AppState {
            engine: Some(Arc::new(Engine::new(
                Registry::with_default_watchlist(),
                Providers::from_single(Arc::new(QuietMarket)),
                EngineConfig::default(),
                Arc::new(SystemClock),
            ))),
        }
    }

    #[tokio::test]
    async fn add_stock_validates_and_registers() {
        let state = state();

        let ok = add_stock(
            State(state.clone()),
            Json(AddStockRequest {
                ticker: "$ARM".to_string(),
                aliases: vec!["Arm Holdings".to_string()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(ok.0.message, "Added $ARM successfully.");
        assert_eq!(ok.0.ticker.aliases, vec!["ARM", "Arm Holdings"]);

        let (status, body) = add_stock(
            State(state.clone()),
            Json(AddStockRequest {
                ticker: "$ARM".to_string(),
                aliases: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0.error.contains("already exists"));

        let (status, _) = add_stock(
            State(state),
            Json(AddStockRequest {
                ticker: "arm".to_string(),
                aliases: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn hype_ticker_canonicalizes_path_and_rejects_bad_ids() {
        let state = state();

        let r = hype_ticker(State(state.clone()), Path("tsla".to_string()))
            .await
            .unwrap();
        assert_eq!(r.0.ticker, "$TSLA");

        let (status, _) = hype_ticker(State(state), Path("NOT-A-TICKER".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn degraded_mode_reports_unavailable() {
        let state = AppState { engine: None };
        let (status, _) = list_tickers(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
