//! Startup wiring of the achievement engine.

use std::sync::Arc;

use catchlog_achievements::catalog::seed_if_empty;
use catchlog_achievements::notifier::EventBusNotifier;
use catchlog_achievements::postgres::{PgAchievementStore, PgAwardLock};
use catchlog_achievements::{AchievementConfig, AwardCoordinator, EventIntake};
use catchlog_core::predicates::PredicateRegistry;
use catchlog_db::DbPool;
use catchlog_events::EventBus;
use tokio::task::JoinHandle;

/// Build the Postgres-backed engine over `pool`.
///
/// Award notifications are published back onto `event_bus` as
/// `badge.awarded` events.
pub fn build_intake(
    pool: &DbPool,
    event_bus: &Arc<EventBus>,
    config: &AchievementConfig,
) -> EventIntake {
    let store = Arc::new(PgAchievementStore::new(pool.clone()));
    let coordinator = Arc::new(AwardCoordinator::new(
        store.clone(),
        store.clone(),
        Arc::new(PgAwardLock::new(pool.clone())),
        config.lock_ttl,
    ));

    EventIntake::new(
        store,
        coordinator,
        Arc::new(PredicateRegistry::with_defaults()),
        Arc::new(EventBusNotifier::new(event_bus)),
    )
}

/// Seed the badge catalog and start consuming domain events.
///
/// A seeding failure is logged and does not prevent startup; awards for
/// missing catalog entries fail as not-found until a later start seeds.
pub async fn start(
    pool: &DbPool,
    event_bus: &Arc<EventBus>,
    config: &AchievementConfig,
) -> JoinHandle<()> {
    let store = PgAchievementStore::new(pool.clone());
    match seed_if_empty(&store).await {
        Ok(inserted) => tracing::info!(inserted, "Badge catalog ready"),
        Err(e) => tracing::error!(error = %e, "Failed to seed badge catalog"),
    }

    let receiver = event_bus.subscribe();
    let intake = build_intake(pool, event_bus, config);
    tracing::info!(
        lock_ttl_secs = config.lock_ttl.as_secs(),
        "Badge engine started"
    );
    tokio::spawn(intake.run(receiver))
}
