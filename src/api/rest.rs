// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only GETs. Each handler
// parses its query, then runs the service call on the blocking pool (the
// calculators are CPU-bound) and serializes the result. Failures come back as
// `{"error": "..."}` with the status from `ServiceError::status_code`.
//
// CORS origins come from `ServiceConfig::allowed_origins`; `"*"` allows any.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Json, Path, Query, State},
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::error::{Result, ServiceError};
use crate::service::{
    self, IndicatorParams, IndicatorRequest, DEFAULT_EMA_PERIOD, DEFAULT_MACD_FAST,
    DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW, DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIOD,
    DEFAULT_TIMEFRAME, DEFAULT_VOLATILITY_PERIOD,
};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/api/v1/health", get(health))
        // ── Symbols ─────────────────────────────────────────────────
        .route("/api/v1/stocks", get(stocks))
        .route("/api/v1/stocks/count", get(stocks_count))
        .route("/api/v1/stocks/date-range", get(stocks_date_range))
        .route("/api/v1/stocks/:symbol/details", get(stock_details))
        // ── Bars & indicators ───────────────────────────────────────
        .route("/api/v1/data/:symbol", get(price_history))
        .route("/api/v1/indicators/:symbol/:indicator", get(indicator))
        .route("/api/v1/watchlist", get(watchlist))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

// =============================================================================
// Helpers
// =============================================================================

/// Run a service call on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("worker task failed: {e}")))?
}

type QueryResult<T> = std::result::Result<Query<T>, QueryRejection>;

/// Unwrap a query extraction, turning a malformed query string into the
/// usual JSON error body instead of axum's plain-text rejection.
fn query_params<T>(query: QueryResult<T>) -> Result<T> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ServiceError::InvalidParameter(rejection.body_text()))
}

/// Serialize a service result, logging failures.
fn respond<T: Serialize>(route: &str, result: Result<T>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            warn!(route, status = e.status_code().as_u16(), error = %e, "request failed");
            e.into_response()
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    symbols: usize,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        symbols: service::symbol_count(state.store.as_ref()),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Symbols
// =============================================================================

async fn stocks(State(state): State<Arc<AppState>>) -> Response {
    let result = run_blocking(move || Ok(service::list_symbols(state.store.as_ref()))).await;
    respond("stocks", result)
}

async fn stocks_count(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = service::symbol_count(state.store.as_ref());
    Json(serde_json::json!({ "count": count }))
}

#[derive(Debug, Deserialize)]
struct DateRangeQuery {
    symbol: Option<String>,
}

async fn stocks_date_range(
    State(state): State<Arc<AppState>>,
    query: QueryResult<DateRangeQuery>,
) -> Response {
    let q = match query_params(query) {
        Ok(q) => q,
        Err(e) => return respond::<()>("stocks/date-range", Err(e)),
    };
    let symbol = q.symbol.filter(|s| !s.trim().is_empty());
    respond(
        "stocks/date-range",
        service::date_range(state.store.as_ref(), symbol.as_deref()),
    )
}

#[derive(Debug, Deserialize)]
struct AsOfQuery {
    simulated_date: Option<String>,
}

async fn stock_details(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    query: QueryResult<AsOfQuery>,
) -> Response {
    let q = match query_params(query) {
        Ok(q) => q,
        Err(e) => return respond::<()>("stocks/details", Err(e)),
    };
    let result = run_blocking(move || {
        service::stock_details(state.store.as_ref(), &symbol, q.simulated_date.as_deref())
    })
    .await;
    respond("stocks/details", result)
}

// =============================================================================
// Price history
// =============================================================================

#[derive(Debug, Deserialize)]
struct WindowQuery {
    simulated_date: Option<String>,
    timeframe: Option<String>,
}

async fn price_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    query: QueryResult<WindowQuery>,
) -> Response {
    let q = match query_params(query) {
        Ok(q) => q,
        Err(e) => return respond::<()>("data", Err(e)),
    };
    let result = run_blocking(move || {
        let timeframe = q.timeframe.as_deref().unwrap_or(DEFAULT_TIMEFRAME);
        service::price_history(
            state.store.as_ref(),
            &symbol,
            q.simulated_date.as_deref(),
            timeframe,
        )
    })
    .await;
    respond("data", result)
}

// =============================================================================
// Indicators
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct IndicatorQuery {
    period: Option<usize>,
    fast_period: Option<usize>,
    slow_period: Option<usize>,
    signal_period: Option<usize>,
    simulated_date: Option<String>,
    timeframe: Option<String>,
    #[serde(default)]
    scaled: bool,
}

/// Map a path segment onto calculator parameters, filling defaults.
fn params_for(indicator: &str, q: &IndicatorQuery) -> Result<IndicatorParams> {
    let params = match indicator.to_ascii_lowercase().as_str() {
        "ema" => IndicatorParams::Ema {
            period: q.period.unwrap_or(DEFAULT_EMA_PERIOD),
        },
        "sma" => IndicatorParams::Sma {
            period: q.period.unwrap_or(DEFAULT_SMA_PERIOD),
        },
        "rsi" => IndicatorParams::Rsi {
            period: q.period.unwrap_or(DEFAULT_RSI_PERIOD),
        },
        "vix" | "volatility" => IndicatorParams::Volatility {
            period: q.period.unwrap_or(DEFAULT_VOLATILITY_PERIOD),
        },
        "obv" => IndicatorParams::Obv,
        "vpt" => IndicatorParams::Vpt,
        "macd" => IndicatorParams::Macd {
            fast_period: q.fast_period.unwrap_or(DEFAULT_MACD_FAST),
            slow_period: q.slow_period.unwrap_or(DEFAULT_MACD_SLOW),
            signal_period: q.signal_period.unwrap_or(DEFAULT_MACD_SIGNAL),
        },
        other => {
            return Err(ServiceError::InvalidParameter(format!(
                "unknown indicator {other:?}"
            )))
        }
    };
    Ok(params)
}

async fn indicator(
    State(state): State<Arc<AppState>>,
    Path((symbol, indicator)): Path<(String, String)>,
    query: QueryResult<IndicatorQuery>,
) -> Response {
    let q = match query_params(query) {
        Ok(q) => q,
        Err(e) => return respond::<()>("indicators", Err(e)),
    };
    let limits = state.limits();
    let timeframe = q
        .timeframe
        .clone()
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());

    if indicator.eq_ignore_ascii_case("all") {
        let ema_period = q.period.unwrap_or(DEFAULT_EMA_PERIOD);
        let result = run_blocking(move || {
            service::combined(
                state.store.as_ref(),
                &symbol,
                q.simulated_date.as_deref(),
                &timeframe,
                ema_period,
                &limits,
            )
        })
        .await;
        return respond("indicators/all", result);
    }

    let params = match params_for(&indicator, &q) {
        Ok(p) => p,
        Err(e) => return respond::<()>("indicators", Err(e)),
    };
    debug!(symbol = %symbol, ?params, "indicator request");

    let request = IndicatorRequest {
        symbol,
        simulated_date: q.simulated_date,
        timeframe,
        params,
        scaled: q.scaled,
    };
    let result = run_blocking(move || service::compute(state.store.as_ref(), &request, &limits)).await;
    respond("indicators", result)
}

// =============================================================================
// Watchlist
// =============================================================================

#[derive(Debug, Deserialize)]
struct WatchlistQuery {
    #[serde(default)]
    symbols: String,
    simulated_date: Option<String>,
}

async fn watchlist(
    State(state): State<Arc<AppState>>,
    query: QueryResult<WatchlistQuery>,
) -> Response {
    let q = match query_params(query) {
        Ok(q) => q,
        Err(e) => return respond::<()>("watchlist", Err(e)),
    };
    let limits = state.limits();
    let symbols = service::parse_symbol_list(&q.symbols);
    let result = run_blocking(move || {
        service::watchlist(
            state.store.as_ref(),
            &symbols,
            q.simulated_date.as_deref(),
            &limits,
        )
    })
    .await;
    respond("watchlist", result)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::series::tests::bar;
    use crate::store::MemoryBarStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, NaiveDate};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut store = MemoryBarStore::new();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        store.insert_bars(
            "AAPL",
            (0..120).map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 5.0;
                bar(start + Duration::days(i), close, 1_000 + i as u64)
            }),
        );
        store.insert_bars(
            "MSFT",
            (0..5).map(|i| bar(start + Duration::days(i), 200.0 + i as f64, 10)),
        );
        store.set_name("AAPL", "Apple Inc.");
        let state = AppState::new(ServiceConfig::default(), Arc::new(store));
        router(Arc::new(state))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_symbols() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["symbols"], 2);
    }

    #[tokio::test]
    async fn ema_with_defaults() {
        let (status, body) = get_json("/api/v1/indicators/aapl/ema").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "AAPL");
        assert_eq!(body["simulated_date"], "2020-04-29");
        assert_eq!(body["timeframe"], "1Y");
        assert_eq!(body["params"]["indicator"], "ema");
        assert_eq!(body["params"]["period"], 20);
        assert_eq!(body["data"].as_array().unwrap().len(), 120 - 19);
        assert!(body["data"][0].get("scaled").is_none());
    }

    #[tokio::test]
    async fn vix_maps_to_volatility() {
        let (status, body) =
            get_json("/api/v1/indicators/AAPL/vix?period=10&simulated_date=2020-03-01&timeframe=1M")
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["params"]["indicator"], "volatility");
        // 31 bars, first defined value at index 10.
        assert_eq!(body["data"].as_array().unwrap().len(), 21);
    }

    #[tokio::test]
    async fn macd_and_combined() {
        let (status, body) = get_json("/api/v1/indicators/AAPL/macd?timeframe=3M").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"][0]["signal"].is_null());
        assert!(body["data"][0]["macd"].is_number());

        let (status, body) = get_json("/api/v1/indicators/AAPL/all?period=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ema_period"], 10);
        assert!(!body["indicators"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scaled_rsi_overlay() {
        let (status, body) = get_json("/api/v1/indicators/AAPL/rsi?scaled=true").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"][0]["scaled"].is_number());
    }

    #[tokio::test]
    async fn errors_are_json() {
        let (status, body) =
            get_json("/api/v1/indicators/AAPL/sma?simulated_date=03-01-2020").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid date format. Use YYYY-MM-DD");

        let (status, body) = get_json("/api/v1/indicators/TSLA/sma").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No data found for symbol TSLA");

        let (status, body) =
            get_json("/api/v1/indicators/AAPL/obv?simulated_date=2019-01-01&timeframe=1W").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No data found for AAPL in timeframe 1W");

        let (status, _) = get_json("/api/v1/indicators/AAPL/adx").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json("/api/v1/indicators/AAPL/rsi?period=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_query_values_are_json_errors() {
        for uri in [
            "/api/v1/indicators/AAPL/ema?period=abc",
            "/api/v1/indicators/AAPL/ema?period=-3",
            "/api/v1/indicators/AAPL/rsi?scaled=maybe",
            "/api/v1/indicators/AAPL/all?period=1.5",
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let msg = body["error"].as_str().unwrap_or_default();
            assert!(msg.starts_with("Invalid parameter:"), "{uri}: {msg}");
        }
    }

    #[tokio::test]
    async fn symbol_endpoints() {
        let (_, body) = get_json("/api/v1/stocks").await;
        assert_eq!(body[0]["symbol"], "AAPL");
        assert_eq!(body[0]["name"], "Apple Inc.");

        let (_, body) = get_json("/api/v1/stocks/count").await;
        assert_eq!(body["count"], 2);

        let (_, body) = get_json("/api/v1/stocks/date-range?symbol=msft").await;
        assert_eq!(body["start_date"], "2020-01-01");
        assert_eq!(body["end_date"], "2020-01-05");

        let (_, body) = get_json("/api/v1/stocks/date-range").await;
        assert_eq!(body["end_date"], "2020-04-29");
    }

    #[tokio::test]
    async fn details_and_history() {
        let (status, body) =
            get_json("/api/v1/stocks/MSFT/details?simulated_date=2020-01-03").await;
        assert_eq!(status, StatusCode::OK);
        let price: rust_decimal::Decimal = body["current_price"].as_str().unwrap().parse().unwrap();
        let change: rust_decimal::Decimal = body["change"].as_str().unwrap().parse().unwrap();
        assert_eq!(price, rust_decimal::Decimal::from(202));
        assert_eq!(change, rust_decimal::Decimal::ONE);

        let (status, body) =
            get_json("/api/v1/data/msft?simulated_date=2020-01-03&timeframe=1W").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn watchlist_endpoint() {
        let (status, body) =
            get_json("/api/v1/watchlist?symbols=msft,nope,aapl&simulated_date=2020-01-04").await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["symbol"], "MSFT");
        assert_eq!(items[1]["symbol"], "AAPL");

        let (status, _) = get_json("/api/v1/watchlist").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }
}
