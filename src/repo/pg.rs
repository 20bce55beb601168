#![cfg(feature = "db")]

//! Postgres repository. The (plant_id, hour_utc) uniqueness constraint is
//! the schema contract the batch upsert leans on.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{ForecastStore, HourlyValue, PlantDirectory, UpsertBranch};
use crate::domain::{CompanyInfo, PowerPlantInfo, StoredForecast};

pub struct PgRepo {
    pub pool: PgPool,
}

impl PgRepo {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// One statement performs the insert-or-compare-and-update per key; rows the
/// conditional update leaves untouched are not returned and classify as
/// unchanged. `xmax = 0` distinguishes freshly inserted rows from updates.
const UPSERT_SQL: &str = r#"
    INSERT INTO forecasts (id, plant_id, hour_utc, mwh, created_at, updated_at)
    SELECT gen_random_uuid(), $1, input.hour_utc, input.mwh, $4, $4
    FROM unnest($2::timestamptz[], $3::numeric[]) AS input(hour_utc, mwh)
    ON CONFLICT (plant_id, hour_utc)
    DO UPDATE SET mwh = EXCLUDED.mwh, updated_at = EXCLUDED.updated_at
    WHERE forecasts.mwh IS DISTINCT FROM EXCLUDED.mwh
    RETURNING hour_utc, (xmax::text::int = 0) AS was_inserted
"#;

#[async_trait]
impl ForecastStore for PgRepo {
    async fn upsert_batch(
        &self,
        plant_id: Uuid,
        values: &[HourlyValue],
    ) -> Result<Vec<UpsertBranch>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let hours: Vec<DateTime<Utc>> = values.iter().map(|v| v.hour_utc).collect();
        let mwhs: Vec<Decimal> = values.iter().map(|v| v.mwh).collect();
        let now = Utc::now();

        let rows = sqlx::query(UPSERT_SQL)
            .bind(plant_id)
            .bind(&hours)
            .bind(&mwhs)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        let mut written: HashMap<DateTime<Utc>, UpsertBranch> =
            HashMap::with_capacity(rows.len());
        for row in rows {
            let hour: DateTime<Utc> = row.try_get("hour_utc")?;
            let inserted = row
                .try_get::<Option<bool>, _>("was_inserted")?
                .unwrap_or(false);
            written.insert(
                hour,
                if inserted { UpsertBranch::Inserted } else { UpsertBranch::Updated },
            );
        }

        Ok(values
            .iter()
            .map(|v| written.get(&v.hour_utc).copied().unwrap_or(UpsertBranch::Unchanged))
            .collect())
    }

    async fn find_range(
        &self,
        plant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>> {
        let rows = sqlx::query_as::<_, StoredForecast>(
            r#"
            SELECT id, plant_id, hour_utc, mwh, created_at, updated_at
            FROM forecasts
            WHERE plant_id = $1 AND hour_utc >= $2 AND hour_utc < $3
            ORDER BY hour_utc ASC
            "#,
        )
        .bind(plant_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_company_range(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredForecast>> {
        let rows = sqlx::query_as::<_, StoredForecast>(
            r#"
            SELECT f.id, f.plant_id, f.hour_utc, f.mwh, f.created_at, f.updated_at
            FROM forecasts f
            JOIN power_plants p ON p.id = f.plant_id
            WHERE p.company_id = $1 AND p.is_active
              AND f.hour_utc >= $2 AND f.hour_utc < $3
            ORDER BY f.hour_utc ASC, f.plant_id ASC
            "#,
        )
        .bind(company_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PlantDirectory for PgRepo {
    async fn plant(&self, plant_id: Uuid) -> Result<Option<PowerPlantInfo>> {
        let plant = sqlx::query_as::<_, PowerPlantInfo>(
            r#"
            SELECT id, company_id, name, country, capacity_mwh, is_active
            FROM power_plants
            WHERE id = $1
            "#,
        )
        .bind(plant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plant)
    }

    async fn active_plants(&self) -> Result<Vec<PowerPlantInfo>> {
        let plants = sqlx::query_as::<_, PowerPlantInfo>(
            r#"
            SELECT id, company_id, name, country, capacity_mwh, is_active
            FROM power_plants
            WHERE is_active
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plants)
    }

    async fn company(&self, company_id: Uuid) -> Result<Option<CompanyInfo>> {
        let company = sqlx::query_as::<_, CompanyInfo>(
            r#"
            SELECT id, name, is_active
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }
}
