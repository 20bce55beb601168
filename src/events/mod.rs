//! Position-change events and their best-effort delivery.
//!
//! Delivery is detached from the upsert request: the service hands events to
//! an [`EventDispatcher`], a background worker drains them into the selected
//! [`EventPublisher`], and publisher failures are logged, never re-raised.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Published when a plant's forecast upsert changed its company's position.
/// The hour span covers the submitted batch as received, before any
/// within-batch deduplication.
#[derive(Debug, Clone, Serialize)]
pub struct PositionChangedEvent {
    pub event_id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub from_hour_utc: DateTime<Utc>,
    pub to_hour_utc: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
    pub correlation_id: String,
    pub inserted_count: usize,
    pub updated_count: usize,
}

impl PositionChangedEvent {
    /// JSON wire payload as handed to an event-bus transport.
    pub fn payload(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Capability interface for announcing position changes. Implementations are
/// selected at construction time by configuration.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_position_changed(&self, event: PositionChangedEvent) -> anyhow::Result<()>;
}

/// No-op publisher used when event publishing is disabled.
pub struct NullEventPublisher;

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish_position_changed(&self, event: PositionChangedEvent) -> anyhow::Result<()> {
        debug!(event_id = %event.event_id, "event publishing disabled, dropping event");
        Ok(())
    }
}

/// Publisher that records events in memory. Stands in for a transport in
/// local runs and lets tests assert on delivery.
#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<PositionChangedEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PositionChangedEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish_position_changed(&self, event: PositionChangedEvent) -> anyhow::Result<()> {
        debug!(
            event_id = %event.event_id,
            company_id = %event.company_id,
            "recording position changed event"
        );
        self.events.lock().push(event);
        Ok(())
    }
}

/// Non-blocking handle for submitting events to the dispatch worker.
#[derive(Clone)]
pub struct EventDispatcher {
    tx: mpsc::UnboundedSender<PositionChangedEvent>,
}

impl EventDispatcher {
    /// Queue an event for delivery. Never blocks and never fails the caller;
    /// a stopped worker means the event is dropped and logged.
    pub fn dispatch(&self, event: PositionChangedEvent) {
        if self.tx.send(event).is_err() {
            warn!("event worker stopped, dropping position changed event");
        }
    }
}

/// Spawn the worker that drains dispatched events into `publisher`. The
/// worker exits once every dispatcher handle has been dropped and the queue
/// is drained.
pub fn spawn_dispatcher(publisher: Arc<dyn EventPublisher>) -> (EventDispatcher, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<PositionChangedEvent>();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let event_id = event.event_id;
            let plant_id = event.plant_id;
            if let Err(e) = publisher.publish_position_changed(event).await {
                error!(%event_id, %plant_id, error = %e, "failed to publish position changed event");
            }
        }
    });
    (EventDispatcher { tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> PositionChangedEvent {
        let hour = Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap();
        PositionChangedEvent {
            event_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            plant_id: Uuid::new_v4(),
            from_hour_utc: hour,
            to_hour_utc: hour,
            occurred_at: Utc::now(),
            correlation_id: "test".to_string(),
            inserted_count: 1,
            updated_count: 0,
        }
    }

    #[tokio::test]
    async fn dispatched_events_reach_the_publisher() {
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let (dispatcher, worker) = spawn_dispatcher(publisher.clone());

        dispatcher.dispatch(event());
        dispatcher.dispatch(event());
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(publisher.events().len(), 2);
    }

    #[tokio::test]
    async fn dispatch_after_worker_stop_is_silent() {
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let (dispatcher, worker) = spawn_dispatcher(publisher.clone());
        worker.abort();
        let _ = worker.await;

        dispatcher.dispatch(event());
    }

    #[test]
    fn payload_carries_the_event_fields() {
        let event = event();
        let payload = event.payload().unwrap();
        assert!(payload.contains(&event.event_id.to_string()));
        assert!(payload.contains("from_hour_utc"));
        assert!(payload.contains("inserted_count"));
    }

    #[tokio::test]
    async fn null_publisher_accepts_events() {
        let publisher = NullEventPublisher;
        publisher.publish_position_changed(event()).await.unwrap();
    }

    struct FailingPublisher {
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish_position_changed(
            &self,
            _event: PositionChangedEvent,
        ) -> anyhow::Result<()> {
            *self.attempts.lock() += 1;
            anyhow::bail!("transport unavailable")
        }
    }

    #[tokio::test]
    async fn publisher_failures_are_swallowed_and_do_not_stop_the_worker() {
        let publisher = Arc::new(FailingPublisher { attempts: Mutex::new(0) });
        let (dispatcher, worker) = spawn_dispatcher(publisher.clone());

        dispatcher.dispatch(event());
        dispatcher.dispatch(event());
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(*publisher.attempts.lock(), 2);
    }
}
