use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{error::ApiError, response::ApiResponse, RangeQuery},
    domain::{ForecastPoint, StoredForecast},
    service::AppState,
};

/// Request to create or update forecasts for a power plant
#[derive(Debug, Deserialize)]
pub struct CreateOrUpdateForecastRequest {
    pub forecasts: Vec<ForecastPoint>,
}

/// Response from creating or updating forecasts
#[derive(Debug, Serialize)]
pub struct UpsertForecastResponse {
    plant_id: Uuid,
    inserted_count: usize,
    updated_count: usize,
    unchanged_count: usize,
    total_processed: usize,
    has_changes: bool,
}

/// Response containing stored forecasts for a power plant
#[derive(Debug, Serialize)]
pub struct GetForecastResponse {
    plant_id: Uuid,
    from_utc: DateTime<Utc>,
    to_utc: DateTime<Utc>,
    forecasts: Vec<StoredForecast>,
}

/// PUT /api/forecasts/:plant_id - Create or update forecasts for a plant
pub async fn create_or_update_forecasts(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateOrUpdateForecastRequest>,
) -> Result<Json<ApiResponse<UpsertForecastResponse>>, ApiError> {
    let correlation_id = super::correlation_id(&headers);
    let outcome = state
        .forecasts
        .create_or_update_forecasts(plant_id, &request.forecasts, Some(correlation_id))
        .await?;

    Ok(Json(ApiResponse::success(UpsertForecastResponse {
        plant_id,
        inserted_count: outcome.inserted_count,
        updated_count: outcome.updated_count,
        unchanged_count: outcome.unchanged_count,
        total_processed: outcome.total_processed(),
        has_changes: outcome.has_changes(),
    })))
}

/// GET /api/forecasts/:plant_id?from=..&to=.. - Stored forecasts in range
pub async fn get_forecasts(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<GetForecastResponse>>, ApiError> {
    let forecasts = state.forecasts.get_forecasts(plant_id, range.from, range.to).await?;

    Ok(Json(ApiResponse::success(GetForecastResponse {
        plant_id,
        from_utc: range.from.with_timezone(&Utc),
        to_utc: range.to.with_timezone(&Utc),
        forecasts,
    })))
}
