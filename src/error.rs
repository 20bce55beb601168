use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationError;

/// Domain error taxonomy shared by all services.
///
/// Not-found and validation failures are caller faults and map to distinct
/// transport outcomes; storage failures propagate as-is so a failed write is
/// never mistaken for a no-op.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("power plant '{0}' was not found or is inactive")]
    PlantNotFound(Uuid),

    #[error("company '{0}' was not found or is inactive")]
    CompanyNotFound(Uuid),

    #[error("at least one forecast data point is required")]
    NoDataPoints,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
