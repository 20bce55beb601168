use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Basic information about a power plant.
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlantInfo {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub country: String,
    pub capacity_mwh: Decimal,
    pub is_active: bool,
}

/// Company owning one or more plants.
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}
