//! End-to-end properties of the award engine over the in-memory seams.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catchlog_achievements::catalog::seed_if_empty;
use catchlog_achievements::ledger::{AwardRecord, BadgeLedger, CatalogBadge};
use catchlog_achievements::lock::{award_lock_key, AwardLock};
use catchlog_achievements::memory::{InMemoryAwardLock, InMemoryStore, RecordingSink};
use catchlog_achievements::{
    AwardCoordinator, AwardOutcome, CandidateStatus, EventIntake, StoreError,
};
use catchlog_core::badges::{BadgeDefinition, BadgeKind};
use catchlog_core::domain_events::DomainEvent;
use catchlog_core::predicates::PredicateRegistry;
use catchlog_core::types::{DbId, Timestamp};
use catchlog_events::{EventBus, PlatformEvent};
use tokio::task::JoinSet;

const TTL: Duration = Duration::from_secs(10);

struct Engine {
    store: Arc<InMemoryStore>,
    lock: Arc<InMemoryAwardLock>,
    sink: Arc<RecordingSink>,
    coordinator: Arc<AwardCoordinator>,
    intake: EventIntake,
}

async fn engine(store: InMemoryStore) -> Engine {
    let store = Arc::new(store);
    seed_if_empty(store.as_ref()).await.unwrap();
    store.add_user(1, "ana");
    store.add_user(2, "ben");

    let lock = Arc::new(InMemoryAwardLock::new());
    let coordinator = Arc::new(AwardCoordinator::new(
        store.clone(),
        store.clone(),
        lock.clone(),
        TTL,
    ));
    let sink = Arc::new(RecordingSink::new());
    let intake = EventIntake::new(
        store.clone(),
        coordinator.clone(),
        Arc::new(PredicateRegistry::with_defaults()),
        sink.clone(),
    );

    Engine {
        store,
        lock,
        sink,
        coordinator,
        intake,
    }
}

/// A store whose only protection against duplicates is the award lock.
fn lock_only_store() -> InMemoryStore {
    InMemoryStore::new()
        .without_unique_constraint()
        .with_write_delay(Duration::from_millis(25))
}

fn post_created(post_id: DbId, author_id: DbId, fish_size_cm: Option<f64>) -> DomainEvent {
    DomainEvent::PostCreated {
        post_id,
        author_id,
        fish_size_cm,
    }
}

// ---------------------------------------------------------------------------
// Exactly-once under concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_awards_for_one_pair_grant_once() {
    let e = engine(lock_only_store()).await;

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let coordinator = e.coordinator.clone();
        tasks.spawn(async move { coordinator.award(1, "FIRST_POST").await.unwrap() });
    }

    let mut granted = 0;
    while let Some(outcome) = tasks.join_next().await {
        match outcome.unwrap() {
            AwardOutcome::Granted(_) => granted += 1,
            AwardOutcome::SkippedLocked | AwardOutcome::SkippedAlreadyAwarded => {}
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(e.store.award_count(1, "FIRST_POST"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_big_fish_posts_grant_once() {
    let e = engine(lock_only_store()).await;
    e.store.record_post(1);
    e.store.record_post(1);
    e.store.record_post(1);

    let mut tasks = JoinSet::new();
    for post_id in [10, 11] {
        let intake = e.intake.clone();
        tasks.spawn(async move { intake.process(&post_created(post_id, 1, Some(150.0))).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    assert_eq!(e.store.award_count(1, "BIG_FISH_CATCHER"), 1);
    assert_eq!(e.store.award_count(1, "TROPHY_HUNTER"), 0);

    let notifications = e.sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].badge_code, "BIG_FISH_CATCHER");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_lock_is_left_behind() {
    let e = engine(lock_only_store()).await;
    e.store.record_post(1);

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let intake = e.intake.clone();
        tasks.spawn(async move { intake.process(&post_created(1, 1, Some(250.0))).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    assert_eq!(e.lock.stored_leases(), 0);
    assert_eq!(e.lock.acquisitions(), e.lock.releases());
}

// ---------------------------------------------------------------------------
// Redelivery and ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn redelivered_event_grants_nothing_new() {
    let e = engine(InMemoryStore::new()).await;
    e.store.record_post(1);
    let event = post_created(1, 1, None);

    let first = e.intake.process(&event).await;
    assert!(matches!(first[0].status, CandidateStatus::Granted(_)));

    let second = e.intake.process(&event).await;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].status, CandidateStatus::SkippedAlreadyAwarded);

    assert_eq!(e.store.award_count(1, "FIRST_POST"), 1);
    assert_eq!(e.sink.notifications().len(), 1);
}

#[tokio::test]
async fn first_post_scenario() {
    let e = engine(InMemoryStore::new()).await;
    e.store.record_post(1);

    let reports = e.intake.process(&post_created(1, 1, Some(40.0))).await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].badge, BadgeKind::FirstPost);

    let notification = &e.sink.notifications()[0];
    assert_eq!(notification.user_id, 1);
    assert_eq!(notification.badge_code, "FIRST_POST");
    assert_eq!(notification.badge_image_ref, "/static/badges/first_post.png");

    // Second post: nothing left to propose.
    e.store.record_post(1);
    assert!(e.intake.process(&post_created(2, 1, None)).await.is_empty());
}

#[tokio::test]
async fn tenth_post_grants_prolific_angler() {
    let e = engine(InMemoryStore::new()).await;
    for post_id in 1..=10 {
        e.store.record_post(1);
        e.intake.process(&post_created(post_id, 1, None)).await;
    }

    let codes: Vec<String> = e
        .sink
        .notifications()
        .into_iter()
        .map(|n| n.badge_code)
        .collect();
    assert_eq!(codes, vec!["FIRST_POST", "PROLIFIC_ANGLER"]);
}

#[tokio::test]
async fn prolific_angler_survives_a_failed_attempt() {
    let e = engine(InMemoryStore::new()).await;
    for _ in 0..10 {
        e.store.record_post(1);
    }
    let tenth = post_created(10, 1, None);

    e.store.set_unavailable(true);
    assert!(e.intake.process(&tenth).await.is_empty());
    e.store.set_unavailable(false);

    // The user posts again before the tenth event is redelivered.
    e.store.record_post(1);

    let redelivered = e.intake.process(&tenth).await;
    assert_eq!(redelivered.len(), 1);
    assert_eq!(redelivered[0].badge, BadgeKind::ProlificAngler);
    assert!(matches!(redelivered[0].status, CandidateStatus::Granted(_)));

    let eleventh = e.intake.process(&post_created(11, 1, None)).await;
    assert_eq!(eleventh.len(), 1);
    assert_eq!(eleventh[0].status, CandidateStatus::SkippedAlreadyAwarded);

    assert_eq!(e.store.award_count(1, "PROLIFIC_ANGLER"), 1);
    assert_eq!(e.sink.notifications().len(), 1);
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pairs_are_independent() {
    let e = engine(InMemoryStore::new()).await;
    e.store.record_post(1);
    e.store.record_post(2);

    let _held = e
        .lock
        .try_acquire(&award_lock_key(1, "FIRST_POST"), TTL)
        .await
        .unwrap()
        .unwrap();

    let blocked = e.intake.process(&post_created(1, 1, None)).await;
    assert_eq!(blocked[0].status, CandidateStatus::SkippedLocked);

    let other_user = e.intake.process(&post_created(2, 2, None)).await;
    assert!(matches!(other_user[0].status, CandidateStatus::Granted(_)));

    let other_badge = e.coordinator.award(1, "BIG_FISH_CATCHER").await.unwrap();
    assert!(matches!(other_badge, AwardOutcome::Granted(_)));
}

/// Ledger that panics while looking up one badge code.
struct PanickingLedger {
    inner: Arc<InMemoryStore>,
    poisoned_code: &'static str,
}

#[async_trait]
impl BadgeLedger for PanickingLedger {
    async fn count_badges(&self) -> Result<i64, StoreError> {
        self.inner.count_badges().await
    }

    async fn insert_badge(&self, definition: &BadgeDefinition) -> Result<bool, StoreError> {
        self.inner.insert_badge(definition).await
    }

    async fn find_badge_by_code(&self, code: &str) -> Result<Option<CatalogBadge>, StoreError> {
        if code == self.poisoned_code {
            panic!("ledger exploded on {code}");
        }
        self.inner.find_badge_by_code(code).await
    }

    async fn exists_award(&self, user_id: DbId, badge_code: &str) -> Result<bool, StoreError> {
        self.inner.exists_award(user_id, badge_code).await
    }

    async fn insert_award(
        &self,
        user_id: DbId,
        badge: &CatalogBadge,
        achieved_at: Timestamp,
    ) -> Result<Option<AwardRecord>, StoreError> {
        self.inner.insert_award(user_id, badge, achieved_at).await
    }
}

#[tokio::test]
async fn panicking_candidate_does_not_stop_siblings() {
    let store = Arc::new(InMemoryStore::new());
    seed_if_empty(store.as_ref()).await.unwrap();
    store.add_user(1, "ana");
    store.record_post(1);

    let ledger = Arc::new(PanickingLedger {
        inner: store.clone(),
        poisoned_code: "TROPHY_HUNTER",
    });
    let sink = Arc::new(RecordingSink::new());
    let intake = EventIntake::new(
        store.clone(),
        Arc::new(AwardCoordinator::new(
            store.clone(),
            ledger,
            Arc::new(InMemoryAwardLock::new()),
            TTL,
        )),
        Arc::new(PredicateRegistry::with_defaults()),
        sink.clone(),
    );

    let reports = intake.process(&post_created(1, 1, Some(240.0))).await;
    let badges: Vec<BadgeKind> = reports.iter().map(|r| r.badge).collect();
    assert_eq!(badges, vec![BadgeKind::FirstPost, BadgeKind::BigFishCatcher]);

    assert_eq!(store.award_count(1, "FIRST_POST"), 1);
    assert_eq!(store.award_count(1, "BIG_FISH_CATCHER"), 1);
    assert_eq!(store.award_count(1, "TROPHY_HUNTER"), 0);
    assert_eq!(sink.notifications().len(), 2);
}

// ---------------------------------------------------------------------------
// Bus wiring
// ---------------------------------------------------------------------------

#[tokio::test]
async fn intake_consumes_the_bus_until_closed() {
    let e = engine(InMemoryStore::new()).await;
    e.store.record_comment(2);

    let bus = Arc::new(EventBus::default());
    let handle = tokio::spawn(e.intake.clone().run(bus.subscribe()));

    bus.publish(PlatformEvent::from_domain(&DomainEvent::CommentCreated {
        comment_id: 1,
        post_id: 1,
        author_id: 2,
    }));

    let grant = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if !e.sink.notifications().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(grant.is_ok(), "award was never granted");
    assert_eq!(e.sink.notifications()[0].badge_code, "FIRST_COMMENT");

    drop(bus);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("intake stops when the bus closes")
        .unwrap();
}
