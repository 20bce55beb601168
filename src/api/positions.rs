use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{error::ApiError, response::ApiResponse, RangeQuery},
    domain::HourlyPosition,
    service::AppState,
};

/// Aggregated company position response
#[derive(Debug, Serialize)]
pub struct CompanyPositionResponse {
    company_id: Uuid,
    company_name: String,
    total_mwh: Decimal,
    positions: Vec<HourlyPosition>,
}

/// GET /api/company/:company_id/position?from=..&to=.. - Aggregated position
pub async fn get_company_position(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<CompanyPositionResponse>>, ApiError> {
    let position = state
        .positions
        .get_company_position(company_id, range.from, range.to)
        .await?;

    Ok(Json(ApiResponse::success(CompanyPositionResponse {
        company_id: position.company_id,
        company_name: position.company_name.clone(),
        total_mwh: position.total_mwh(),
        positions: position.positions,
    })))
}
