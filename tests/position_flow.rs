//! End-to-end exercises of company position aggregation against the
//! in-memory backend: grouping, the half-open window and range validation.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use power_forecast_service::error::DomainError;
use power_forecast_service::repo::memory::InMemoryRepo;
use power_forecast_service::repo::{ForecastStore, HourlyValue};
use power_forecast_service::service::PositionService;
use power_forecast_service::validate::ValidationError;

fn hour(h: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2026, 3, 10, h, 0, 0).unwrap().fixed_offset()
}

fn value(h: u32, mwh: i64) -> HourlyValue {
    HourlyValue { hour_utc: hour(h).with_timezone(&Utc), mwh: Decimal::from(mwh) }
}

struct Harness {
    repo: Arc<InMemoryRepo>,
    service: PositionService,
    company_id: Uuid,
    plant_a: Uuid,
    plant_b: Uuid,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryRepo::new());
    let company_id = repo.add_company("Norsk Kraft");
    let plant_a = repo.add_plant(company_id, "Vindpark Nord", "NO", Decimal::from(120));
    let plant_b = repo.add_plant(company_id, "Fjellkraft", "NO", Decimal::from(80));
    let service = PositionService::new(repo.clone(), repo.clone(), 7);
    Harness { repo, service, company_id, plant_a, plant_b }
}

#[tokio::test]
async fn aggregates_hours_across_plants() {
    let h = harness();
    h.repo.upsert_batch(h.plant_a, &[value(6, 100), value(7, 150)]).await.unwrap();
    h.repo.upsert_batch(h.plant_b, &[value(6, 50)]).await.unwrap();

    let position = h
        .service
        .get_company_position(h.company_id, hour(6), hour(8))
        .await
        .unwrap();

    assert_eq!(position.company_name, "Norsk Kraft");
    assert_eq!(position.positions.len(), 2);

    assert_eq!(position.positions[0].hour_utc, hour(6).with_timezone(&Utc));
    assert_eq!(position.positions[0].total_mwh, Decimal::from(150));
    assert_eq!(position.positions[0].plant_count, 2);

    assert_eq!(position.positions[1].hour_utc, hour(7).with_timezone(&Utc));
    assert_eq!(position.positions[1].total_mwh, Decimal::from(150));
    assert_eq!(position.positions[1].plant_count, 1);

    assert_eq!(position.total_mwh(), Decimal::from(300));
}

#[tokio::test]
async fn range_end_is_exclusive() {
    let h = harness();
    h.repo.upsert_batch(h.plant_a, &[value(6, 100), value(12, 40)]).await.unwrap();

    let position = h
        .service
        .get_company_position(h.company_id, hour(6), hour(12))
        .await
        .unwrap();
    assert_eq!(position.positions.len(), 1);
    assert_eq!(position.positions[0].hour_utc, hour(6).with_timezone(&Utc));

    let position = h
        .service
        .get_company_position(h.company_id, hour(6), hour(13))
        .await
        .unwrap();
    assert_eq!(position.positions.len(), 2);
}

#[tokio::test]
async fn hours_without_data_are_absent() {
    let h = harness();
    h.repo.upsert_batch(h.plant_a, &[value(6, 10), value(9, 20)]).await.unwrap();

    let position = h
        .service
        .get_company_position(h.company_id, hour(0), hour(23))
        .await
        .unwrap();

    let hours: Vec<DateTime<Utc>> =
        position.positions.iter().map(|p| p.hour_utc).collect();
    assert_eq!(hours, vec![hour(6).with_timezone(&Utc), hour(9).with_timezone(&Utc)]);
}

#[tokio::test]
async fn inactive_plants_do_not_contribute() {
    let h = harness();
    h.repo.upsert_batch(h.plant_a, &[value(6, 100)]).await.unwrap();
    h.repo.upsert_batch(h.plant_b, &[value(6, 50)]).await.unwrap();
    h.repo.deactivate_plant(h.plant_b);

    let position = h
        .service
        .get_company_position(h.company_id, hour(6), hour(7))
        .await
        .unwrap();

    assert_eq!(position.positions[0].total_mwh, Decimal::from(100));
    assert_eq!(position.positions[0].plant_count, 1);
}

#[tokio::test]
async fn empty_window_is_a_valid_result() {
    let h = harness();

    let position = h
        .service
        .get_company_position(h.company_id, hour(0), hour(23))
        .await
        .unwrap();

    assert!(position.positions.is_empty());
    assert_eq!(position.total_mwh(), Decimal::ZERO);
}

#[tokio::test]
async fn unknown_company_is_not_found() {
    let h = harness();

    let err = h
        .service
        .get_company_position(Uuid::new_v4(), hour(6), hour(8))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CompanyNotFound(_)));
}

#[tokio::test]
async fn inactive_company_is_not_found() {
    let h = harness();
    h.repo.deactivate_company(h.company_id);

    let err = h
        .service
        .get_company_position(h.company_id, hour(6), hour(8))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CompanyNotFound(_)));
}

#[tokio::test]
async fn misaligned_bound_is_rejected() {
    let h = harness();

    let err = h
        .service
        .get_company_position(h.company_id, hour(6) + Duration::minutes(30), hour(8))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidHourAlignment)
    ));
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let h = harness();

    let err = h
        .service
        .get_company_position(h.company_id, hour(8), hour(6))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationError::InvalidTimeRange)));
}

#[tokio::test]
async fn window_ceiling_is_inclusive_of_the_maximum() {
    let h = harness();
    let from = hour(0);

    let exactly_max = h
        .service
        .get_company_position(h.company_id, from, from + Duration::days(7))
        .await;
    assert!(exactly_max.is_ok());

    let err = h
        .service
        .get_company_position(h.company_id, from, from + Duration::days(7) + Duration::hours(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::TimeRangeTooLarge { max_days: 7 })
    ));
}
