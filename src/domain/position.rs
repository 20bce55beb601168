use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Aggregated generation for one hour across a company's plants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPosition {
    pub hour_utc: DateTime<Utc>,
    pub total_mwh: Decimal,
    pub plant_count: usize,
}

/// A company's aggregated position, ordered by ascending hour. Hours with no
/// stored forecasts are absent rather than zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPosition {
    pub company_id: Uuid,
    pub company_name: String,
    pub positions: Vec<HourlyPosition>,
}

impl CompanyPosition {
    pub fn total_mwh(&self) -> Decimal {
        self.positions.iter().map(|p| p.total_mwh).sum()
    }
}
