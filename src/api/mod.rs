pub mod error;
pub mod forecasts;
pub mod health;
pub mod plants;
pub mod positions;
pub mod response;

use std::time::Duration;

use axum::{
    http::{header, HeaderMap, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{config::Config, service::AppState};

/// Half-open query window passed by forecast and position reads.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
}

pub fn router(state: AppState, cfg: &Config) -> Router {
    let api = Router::new()
        .route(
            "/forecasts/:plant_id",
            put(forecasts::create_or_update_forecasts).get(forecasts::get_forecasts),
        )
        .route("/company/:company_id/position", get(positions::get_company_position))
        .route("/power-plants", get(plants::list_plants))
        .route("/power-plants/:plant_id", get(plants::get_plant));

    let mut router = Router::new()
        .nest("/api", api)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    if cfg.server.enable_cors {
        use tower_http::cors::{AllowOrigin, CorsLayer};
        let origins: Vec<HeaderValue> = cfg
            .server
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::PUT])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs,
                ))),
        )
        .layer(TraceLayer::new_for_http())
}

/// Correlation id from the `x-correlation-id` header, generated when absent.
pub(crate) fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get("x-correlation-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
