use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::PowerPlantInfo;
use crate::error::DomainError;
use crate::repo::PlantDirectory;

/// Read-only access to the plant directory for the API surface.
pub struct PlantService {
    directory: Arc<dyn PlantDirectory>,
}

impl PlantService {
    pub fn new(directory: Arc<dyn PlantDirectory>) -> Self {
        Self { directory }
    }

    pub async fn list_active_plants(&self) -> Result<Vec<PowerPlantInfo>, DomainError> {
        let plants = self.directory.active_plants().await.map_err(DomainError::Storage)?;
        info!(count = plants.len(), "retrieved active power plants");
        Ok(plants)
    }

    pub async fn get_plant(&self, plant_id: Uuid) -> Result<PowerPlantInfo, DomainError> {
        self.directory
            .plant(plant_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::PlantNotFound(plant_id))
    }
}
