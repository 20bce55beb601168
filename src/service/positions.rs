use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::domain::{CompanyPosition, HourlyPosition, StoredForecast};
use crate::error::DomainError;
use crate::repo::{ForecastStore, PlantDirectory};
use crate::validate::validate_range;

/// Read-only aggregation of stored forecasts into company-level positions.
pub struct PositionService {
    store: Arc<dyn ForecastStore>,
    directory: Arc<dyn PlantDirectory>,
    max_query_range_days: i64,
}

impl PositionService {
    pub fn new(
        store: Arc<dyn ForecastStore>,
        directory: Arc<dyn PlantDirectory>,
        max_query_range_days: i64,
    ) -> Self {
        Self { store, directory, max_query_range_days }
    }

    /// Hourly totals across all active plants of a company in `[from, to)`.
    /// Hours without stored forecasts are absent; an empty result is valid.
    pub async fn get_company_position(
        &self,
        company_id: Uuid,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<CompanyPosition, DomainError> {
        let company = self
            .directory
            .company(company_id)
            .await
            .map_err(DomainError::Storage)?
            .filter(|c| c.is_active)
            .ok_or(DomainError::CompanyNotFound(company_id))?;

        validate_range(from, to, self.max_query_range_days)?;

        let rows = self
            .store
            .find_company_range(company_id, from.with_timezone(&Utc), to.with_timezone(&Utc))
            .await
            .map_err(DomainError::Storage)?;

        let positions = aggregate_hourly(&rows);

        info!(
            %company_id,
            company_name = %company.name,
            hours = positions.len(),
            "retrieved company position"
        );

        Ok(CompanyPosition { company_id, company_name: company.name, positions })
    }
}

/// Group stored rows into ascending hourly totals with distinct plant
/// counts.
fn aggregate_hourly(rows: &[StoredForecast]) -> Vec<HourlyPosition> {
    let mut hours: BTreeMap<DateTime<Utc>, (Decimal, HashSet<Uuid>)> = BTreeMap::new();
    for row in rows {
        let slot = hours.entry(row.hour_utc).or_default();
        slot.0 += row.mwh;
        slot.1.insert(row.plant_id);
    }
    hours
        .into_iter()
        .map(|(hour_utc, (total_mwh, plants))| HourlyPosition {
            hour_utc,
            total_mwh,
            plant_count: plants.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, 0, 0).unwrap()
    }

    fn row(plant_id: Uuid, h: u32, mwh: i64) -> StoredForecast {
        StoredForecast {
            id: Uuid::new_v4(),
            plant_id,
            hour_utc: hour(h),
            mwh: Decimal::from(mwh),
            created_at: hour(0),
            updated_at: hour(0),
        }
    }

    #[test]
    fn sums_per_hour_and_counts_distinct_plants() {
        let plant_a = Uuid::new_v4();
        let plant_b = Uuid::new_v4();
        let rows = vec![row(plant_a, 6, 100), row(plant_b, 6, 50), row(plant_a, 7, 150)];

        let positions = aggregate_hourly(&rows);

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].hour_utc, hour(6));
        assert_eq!(positions[0].total_mwh, Decimal::from(150));
        assert_eq!(positions[0].plant_count, 2);
        assert_eq!(positions[1].hour_utc, hour(7));
        assert_eq!(positions[1].total_mwh, Decimal::from(150));
        assert_eq!(positions[1].plant_count, 1);
    }

    #[test]
    fn orders_hours_ascending_regardless_of_input_order() {
        let plant = Uuid::new_v4();
        let rows = vec![row(plant, 9, 1), row(plant, 6, 2), row(plant, 7, 3)];

        let hours: Vec<DateTime<Utc>> =
            aggregate_hourly(&rows).into_iter().map(|p| p.hour_utc).collect();
        assert_eq!(hours, vec![hour(6), hour(7), hour(9)]);
    }

    #[test]
    fn empty_rows_aggregate_to_empty_positions() {
        assert!(aggregate_hourly(&[]).is_empty());
    }
}
