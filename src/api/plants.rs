use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    domain::PowerPlantInfo,
    service::AppState,
};

/// Plant list response
#[derive(Debug, Serialize)]
pub struct PlantListResponse {
    plants: Vec<PowerPlantInfo>,
    total: usize,
}

/// GET /api/power-plants - List all active power plants
pub async fn list_plants(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PlantListResponse>>, ApiError> {
    let plants = state.plants.list_active_plants().await?;
    let total = plants.len();

    Ok(Json(ApiResponse::success(PlantListResponse { plants, total })))
}

/// GET /api/power-plants/:plant_id - Get a power plant by id
pub async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PowerPlantInfo>>, ApiError> {
    let plant = state.plants.get_plant(plant_id).await?;
    Ok(Json(ApiResponse::success(plant)))
}
