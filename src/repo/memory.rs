//! In-memory repository. Default backend when no database is configured and
//! the storage double for the test suites.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{ForecastStore, HourlyValue, PlantDirectory, UpsertBranch};
use crate::domain::{CompanyInfo, PowerPlantInfo, StoredForecast};

#[derive(Default)]
struct Inner {
    companies: HashMap<Uuid, CompanyInfo>,
    plants: HashMap<Uuid, PowerPlantInfo>,
    forecasts: HashMap<(Uuid, DateTime<Utc>), StoredForecast>,
}

/// Shared in-memory repository implementing both the store and the
/// directory.
#[derive(Clone, Default)]
pub struct InMemoryRepo {
    inner: Arc<RwLock<Inner>>,
}

/// Identifiers created by [`InMemoryRepo::seed_demo`].
#[derive(Debug, Clone)]
pub struct DemoData {
    pub company_id: Uuid,
    pub plant_ids: Vec<Uuid>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_company(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().companies.insert(
            id,
            CompanyInfo { id, name: name.to_string(), is_active: true },
        );
        id
    }

    pub fn add_plant(
        &self,
        company_id: Uuid,
        name: &str,
        country: &str,
        capacity_mwh: Decimal,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().plants.insert(
            id,
            PowerPlantInfo {
                id,
                company_id,
                name: name.to_string(),
                country: country.to_string(),
                capacity_mwh,
                is_active: true,
            },
        );
        id
    }

    pub fn deactivate_plant(&self, plant_id: Uuid) {
        if let Some(plant) = self.inner.write().plants.get_mut(&plant_id) {
            plant.is_active = false;
        }
    }

    pub fn deactivate_company(&self, company_id: Uuid) {
        if let Some(company) = self.inner.write().companies.get_mut(&company_id) {
            company.is_active = false;
        }
    }

    /// Seed a small demo fleet so a fresh in-memory instance answers
    /// requests out of the box.
    pub fn seed_demo(&self) -> DemoData {
        let company_id = self.add_company("Nordlys Energi");
        let plant_ids = vec![
            self.add_plant(company_id, "Vindpark Nord", "NO", Decimal::from(120)),
            self.add_plant(company_id, "Fjellkraft", "NO", Decimal::from(80)),
        ];
        DemoData { company_id, plant_ids }
    }
}

#[async_trait]
impl ForecastStore for InMemoryRepo {
    async fn upsert_batch(
        &self,
        plant_id: Uuid,
        values: &[HourlyValue],
    ) -> Result<Vec<UpsertBranch>> {
        let now = Utc::now();
        // One write guard across the batch keeps classification and writes
        // on a single consistent snapshot.
        let mut inner = self.inner.write();
        let mut branches = Vec::with_capacity(values.len());
        for value in values {
            let branch = match inner.forecasts.entry((plant_id, value.hour_utc)) {
                Entry::Vacant(slot) => {
                    slot.insert(StoredForecast {
                        id: Uuid::new_v4(),
                        plant_id,
                        hour_utc: value.hour_utc,
                        mwh: value.mwh,
                        created_at: now,
                        updated_at: now,
                    });
                    UpsertBranch::Inserted
                }
                Entry::Occupied(mut slot) => {
                    let stored = slot.get_mut();
                    if stored.mwh == value.mwh {
                        UpsertBranch::Unchanged
                    } else {
                        stored.mwh = value.mwh;
                        stored.updated_at = now;
                        UpsertBranch::Updated
                    }
                }
            };
            branches.push(branch);
        }
        Ok(branches)
    }

    async fn find_range(
        &self,
        plant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>> {
        let inner = self.inner.read();
        let mut rows: Vec<StoredForecast> = inner
            .forecasts
            .values()
            .filter(|f| f.plant_id == plant_id && f.hour_utc >= from && f.hour_utc < to)
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.hour_utc);
        Ok(rows)
    }

    async fn find_company_range(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>> {
        let inner = self.inner.read();
        let mut rows: Vec<StoredForecast> = inner
            .forecasts
            .values()
            .filter(|f| {
                inner
                    .plants
                    .get(&f.plant_id)
                    .is_some_and(|p| p.company_id == company_id && p.is_active)
            })
            .filter(|f| f.hour_utc >= from && f.hour_utc < to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.hour_utc.cmp(&b.hour_utc).then(a.plant_id.cmp(&b.plant_id)));
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PlantDirectory for InMemoryRepo {
    async fn plant(&self, plant_id: Uuid) -> Result<Option<PowerPlantInfo>> {
        Ok(self.inner.read().plants.get(&plant_id).cloned())
    }

    async fn active_plants(&self) -> Result<Vec<PowerPlantInfo>> {
        let mut plants: Vec<PowerPlantInfo> = self
            .inner
            .read()
            .plants
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        plants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plants)
    }

    async fn company(&self, company_id: Uuid) -> Result<Option<CompanyInfo>> {
        Ok(self.inner.read().companies.get(&company_id).cloned())
    }
}
