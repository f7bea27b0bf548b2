//! End-to-end badge tests: producer endpoints, the running engine, and the
//! badge status query.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use catchlog_achievements::AchievementConfig;
use catchlog_api::background::badge_engine;
use catchlog_events::{EventBus, EVENT_BADGE_AWARDED};
use common::{body_json, create_post, create_user, get};
use sqlx::PgPool;

/// Start the engine on a fresh bus and build the app around it.
async fn app_with_engine(pool: PgPool) -> (Router, Arc<EventBus>) {
    let bus = Arc::new(EventBus::default());
    badge_engine::start(&pool, &bus, &AchievementConfig::default()).await;
    (common::build_app(pool, Arc::clone(&bus)), bus)
}

async fn badge_status(app: &Router, user_id: i64) -> Vec<serde_json::Value> {
    let response = get(app.clone(), &format!("/api/v1/users/{user_id}/badges")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].as_array().unwrap().clone()
}

fn achieved_codes(badges: &[serde_json::Value]) -> Vec<String> {
    badges
        .iter()
        .filter(|b| b["achieved"] == true)
        .map(|b| b["code"].as_str().unwrap().to_string())
        .collect()
}

/// Poll the badge endpoint until `codes` are all achieved.
async fn wait_for_badges(app: &Router, user_id: i64, codes: &[&str]) -> Vec<serde_json::Value> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let badges = badge_status(app, user_id).await;
            let achieved = achieved_codes(&badges);
            if codes.iter().all(|c| achieved.iter().any(|a| a == c)) {
                return badges;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("badges were not awarded in time")
}

// ---------------------------------------------------------------------------
// Status query
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_user_sees_full_catalog_unachieved(pool: PgPool) {
    let (app, _bus) = app_with_engine(pool).await;
    let user_id = create_user(&app, "ana").await;

    let badges = badge_status(&app, user_id).await;
    assert_eq!(badges.len(), 7);
    assert!(badges.iter().all(|b| b["achieved"] == false));
    assert!(badges.iter().all(|b| b["achieved_at"].is_null()));
    assert_eq!(badges[0]["code"], "FIRST_POST");
    assert_eq!(badges[0]["image_ref"], "/static/badges/first_post.png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn badges_for_unknown_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/users/999999/badges").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Awards through the running engine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_big_catch_awards_two_badges(pool: PgPool) {
    let (app, bus) = app_with_engine(pool.clone()).await;
    let mut rx = bus.subscribe();

    let user_id = create_user(&app, "ana").await;
    create_post(&app, user_id, Some(150.0)).await;

    let badges = wait_for_badges(&app, user_id, &["FIRST_POST", "BIG_FISH_CATCHER"]).await;
    assert_eq!(
        achieved_codes(&badges),
        vec!["FIRST_POST".to_string(), "BIG_FISH_CATCHER".to_string()]
    );
    assert!(badges
        .iter()
        .filter(|b| b["achieved"] == true)
        .all(|b| b["achieved_at"].is_string()));

    let mut awarded = Vec::new();
    while awarded.len() < 2 {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("badge.awarded event")
            .unwrap();
        if event.event_type == EVENT_BADGE_AWARDED {
            assert_eq!(event.actor_user_id, Some(user_id));
            awarded.push(event.payload["badge_code"].as_str().unwrap().to_string());
        }
    }
    awarded.sort();
    assert_eq!(awarded, vec!["BIG_FISH_CATCHER", "FIRST_POST"]);

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_post_awards_nothing_new(pool: PgPool) {
    let (app, _bus) = app_with_engine(pool.clone()).await;

    let user_id = create_user(&app, "ana").await;
    create_post(&app, user_id, None).await;
    wait_for_badges(&app, user_id, &["FIRST_POST"]).await;

    create_post(&app, user_id, None).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 1);

    let locks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM badge_locks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(locks, 0);
}
