use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use itertools::{Itertools, MinMaxResult};
use tracing::info;
use uuid::Uuid;

use crate::domain::{ForecastPoint, StoredForecast, UpsertOutcome};
use crate::error::DomainError;
use crate::events::{EventDispatcher, PositionChangedEvent};
use crate::repo::{ForecastStore, HourlyValue, PlantDirectory, UpsertBranch};
use crate::validate::{validate_point, validate_range};

/// Merges submitted forecast batches into stored per-plant-per-hour state
/// and announces position changes downstream.
pub struct ForecastService {
    store: Arc<dyn ForecastStore>,
    directory: Arc<dyn PlantDirectory>,
    dispatcher: EventDispatcher,
    max_query_range_days: i64,
}

impl ForecastService {
    pub fn new(
        store: Arc<dyn ForecastStore>,
        directory: Arc<dyn PlantDirectory>,
        dispatcher: EventDispatcher,
        max_query_range_days: i64,
    ) -> Self {
        Self { store, directory, dispatcher, max_query_range_days }
    }

    /// Validate and merge a batch of forecast points for one plant.
    ///
    /// Every point is checked before anything is written; a single bad point
    /// rejects the whole batch. Within the batch the last point for a given
    /// hour wins, and classification runs once per distinct hour against the
    /// batch's end state.
    pub async fn create_or_update_forecasts(
        &self,
        plant_id: Uuid,
        points: &[ForecastPoint],
        correlation_id: Option<String>,
    ) -> Result<UpsertOutcome, DomainError> {
        let plant = self
            .directory
            .plant(plant_id)
            .await
            .map_err(DomainError::Storage)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::PlantNotFound(plant_id))?;

        if points.is_empty() {
            return Err(DomainError::NoDataPoints);
        }
        for point in points {
            validate_point(point)?;
        }

        let mut deduped: BTreeMap<DateTime<Utc>, HourlyValue> = BTreeMap::new();
        for point in points {
            let hour_utc = point.hour_utc.with_timezone(&Utc);
            deduped.insert(hour_utc, HourlyValue { hour_utc, mwh: point.mwh });
        }
        let values: Vec<HourlyValue> = deduped.into_values().collect();

        let branches = self
            .store
            .upsert_batch(plant_id, &values)
            .await
            .map_err(DomainError::Storage)?;

        let mut outcome = UpsertOutcome::default();
        for branch in branches {
            match branch {
                UpsertBranch::Inserted => outcome.inserted_count += 1,
                UpsertBranch::Updated => outcome.updated_count += 1,
                UpsertBranch::Unchanged => outcome.unchanged_count += 1,
            }
        }

        info!(
            %plant_id,
            inserted = outcome.inserted_count,
            updated = outcome.updated_count,
            unchanged = outcome.unchanged_count,
            "forecast batch upserted"
        );

        if outcome.has_changes() {
            // The event span covers the batch as submitted, before dedup.
            let hours = points.iter().map(|p| p.hour_utc.with_timezone(&Utc));
            let (from_hour, to_hour) = match hours.minmax() {
                MinMaxResult::MinMax(min, max) => (min, max),
                MinMaxResult::OneElement(hour) => (hour, hour),
                MinMaxResult::NoElements => return Ok(outcome),
            };
            self.dispatcher.dispatch(PositionChangedEvent {
                event_id: Uuid::new_v4(),
                company_id: plant.company_id,
                plant_id,
                from_hour_utc: from_hour,
                to_hour_utc: to_hour,
                occurred_at: Utc::now(),
                correlation_id: correlation_id.unwrap_or_default(),
                inserted_count: outcome.inserted_count,
                updated_count: outcome.updated_count,
            });
        }

        Ok(outcome)
    }

    /// Stored forecasts for one plant in `[from, to)`, ascending by hour.
    pub async fn get_forecasts(
        &self,
        plant_id: Uuid,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<StoredForecast>, DomainError> {
        let exists = self
            .directory
            .plant(plant_id)
            .await
            .map_err(DomainError::Storage)?
            .is_some_and(|p| p.is_active);
        if !exists {
            return Err(DomainError::PlantNotFound(plant_id));
        }

        validate_range(from, to, self.max_query_range_days)?;

        let rows = self
            .store
            .find_range(plant_id, from.with_timezone(&Utc), to.with_timezone(&Utc))
            .await
            .map_err(DomainError::Storage)?;

        info!(%plant_id, count = rows.len(), "retrieved forecasts");
        Ok(rows)
    }
}
