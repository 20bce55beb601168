pub mod forecasts;
pub mod plants;
pub mod positions;

pub use forecasts::ForecastService;
pub use plants::PlantService;
pub use positions::PositionService;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::events::{spawn_dispatcher, EventPublisher, InMemoryEventPublisher, NullEventPublisher};
use crate::repo::memory::InMemoryRepo;
use crate::repo::{ForecastStore, PlantDirectory};

/// Shared application state handed to the API layer.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: Arc<dyn ForecastStore>,
    pub forecasts: Arc<ForecastService>,
    pub positions: Arc<PositionService>,
    pub plants: Arc<PlantService>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let (store, directory) = build_backend(&cfg).await?;

        let publisher: Arc<dyn EventPublisher> = if cfg.events.enabled {
            Arc::new(InMemoryEventPublisher::new())
        } else {
            Arc::new(NullEventPublisher)
        };
        let (dispatcher, _worker) = spawn_dispatcher(publisher);

        let max_days = cfg.forecast.max_query_range_days;
        let forecasts = Arc::new(ForecastService::new(
            store.clone(),
            directory.clone(),
            dispatcher,
            max_days,
        ));
        let positions = Arc::new(PositionService::new(store.clone(), directory.clone(), max_days));
        let plants = Arc::new(PlantService::new(directory));

        Ok(Self { cfg, store, forecasts, positions, plants })
    }
}

async fn build_backend(
    cfg: &Config,
) -> Result<(Arc<dyn ForecastStore>, Arc<dyn PlantDirectory>)> {
    #[cfg(feature = "db")]
    {
        if let Some(url) = cfg.database.url.as_deref() {
            let repo = Arc::new(
                crate::repo::pg::PgRepo::connect(url, cfg.database.max_connections).await?,
            );
            info!("using postgres storage backend");
            let store: Arc<dyn ForecastStore> = repo.clone();
            let directory: Arc<dyn PlantDirectory> = repo;
            return Ok((store, directory));
        }
    }

    let repo = Arc::new(InMemoryRepo::new());
    if cfg.forecast.seed_demo_data {
        let demo = repo.seed_demo();
        info!(
            company_id = %demo.company_id,
            plant_ids = ?demo.plant_ids,
            "seeded demo company and plants"
        );
    }
    warn!("using in-memory storage backend, data will not survive restarts");
    let store: Arc<dyn ForecastStore> = repo.clone();
    let directory: Arc<dyn PlantDirectory> = repo;
    Ok((store, directory))
}
