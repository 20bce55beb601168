use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single submitted forecast value for one hour.
///
/// Keeps the offset it was submitted with; the validator rejects anything
/// that is not explicitly UTC before the value reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour_utc: DateTime<FixedOffset>,
    pub mwh: Decimal,
}

/// Persistent forecast record. At most one exists per (plant_id, hour_utc);
/// `updated_at` moves only when the stored value actually changes.
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForecast {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub hour_utc: DateTime<Utc>,
    pub mwh: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-category counts from merging one batch of points for a plant.
/// The three counts always sum to the number of distinct hours submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub inserted_count: usize,
    pub updated_count: usize,
    pub unchanged_count: usize,
}

impl UpsertOutcome {
    pub fn total_changed(&self) -> usize {
        self.inserted_count + self.updated_count
    }

    pub fn has_changes(&self) -> bool {
        self.total_changed() > 0
    }

    pub fn total_processed(&self) -> usize {
        self.inserted_count + self.updated_count + self.unchanged_count
    }
}
