//! Storage abstraction. The in-memory backend is always available; the
//! Postgres backend sits behind the `db` feature.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{CompanyInfo, PowerPlantInfo, StoredForecast};

pub mod memory;
#[cfg(feature = "db")]
pub mod pg;

/// Which branch an atomic conditional upsert took for one (plant, hour) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertBranch {
    Inserted,
    Updated,
    Unchanged,
}

/// Hour-keyed value ready to be written: validated, deduplicated, UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyValue {
    pub hour_utc: DateTime<Utc>,
    pub mwh: Decimal,
}

/// Forecast storage keyed by (plant_id, hour_utc) with a uniqueness
/// constraint on that pair. Range reads are half-open: `[from, to)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Apply a batch of hour-keyed values for one plant as a single atomic
    /// unit. Per key: insert if absent, compare-and-set if the stored value
    /// differs, true no-op otherwise (no write, no timestamp change). The
    /// branch decision and the write happen as one conditional operation,
    /// never as a read followed by a separate write. Returns the branch
    /// taken per value, in input order.
    async fn upsert_batch(
        &self,
        plant_id: Uuid,
        values: &[HourlyValue],
    ) -> Result<Vec<UpsertBranch>>;

    /// Stored forecasts for one plant with `hour_utc` in `[from, to)`,
    /// ascending by hour.
    async fn find_range(
        &self,
        plant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>>;

    /// Stored forecasts across all *active* plants of a company with
    /// `hour_utc` in `[from, to)`.
    async fn find_company_range(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<()>;
}

/// Lookup of plants and companies. Activity filtering is left to callers so
/// that "absent" and "inactive" can be reported the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantDirectory: Send + Sync {
    async fn plant(&self, plant_id: Uuid) -> Result<Option<PowerPlantInfo>>;

    /// All active plants, ordered by name.
    async fn active_plants(&self) -> Result<Vec<PowerPlantInfo>>;

    async fn company(&self, company_id: Uuid) -> Result<Option<CompanyInfo>>;
}
