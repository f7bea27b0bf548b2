//! The award protocol over the Postgres store and the `badge_locks` lease table.

use std::sync::Arc;
use std::time::Duration;

use catchlog_achievements::catalog::seed_if_empty;
use catchlog_achievements::postgres::{PgAchievementStore, PgAwardLock};
use catchlog_achievements::{AwardCoordinator, AwardOutcome};
use catchlog_db::models::user::CreateUser;
use catchlog_db::repositories::{UserBadgeRepo, UserRepo};
use sqlx::PgPool;
use tokio::task::JoinSet;

async fn pg_coordinator(pool: &PgPool) -> Arc<AwardCoordinator> {
    let store = Arc::new(PgAchievementStore::new(pool.clone()));
    seed_if_empty(store.as_ref()).await.unwrap();
    Arc::new(AwardCoordinator::new(
        store.clone(),
        store,
        Arc::new(PgAwardLock::new(pool.clone())),
        Duration::from_secs(10),
    ))
}

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            display_name: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn lock_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM badge_locks")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_awards_grant_once(pool: PgPool) {
    let coordinator = pg_coordinator(&pool).await;
    let user_id = new_user(&pool, "ana").await;

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let coordinator = Arc::clone(&coordinator);
        tasks.spawn(async move { coordinator.award(user_id, "BIG_FISH_CATCHER").await });
    }

    let mut granted = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            AwardOutcome::Granted(notification) => {
                assert_eq!(notification.user_id, user_id);
                assert_eq!(notification.badge_code, "BIG_FISH_CATCHER");
                granted += 1;
            }
            AwardOutcome::SkippedLocked | AwardOutcome::SkippedAlreadyAwarded => {}
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(UserBadgeRepo::count_for_user(&pool, user_id).await.unwrap(), 1);
    assert_eq!(lock_rows(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_user_releases_the_lease(pool: PgPool) {
    let coordinator = pg_coordinator(&pool).await;

    let result = coordinator.award(999_999, "FIRST_POST").await;
    assert!(result.unwrap_err().is_not_found());
    assert_eq!(lock_rows(&pool).await, 0);
}
