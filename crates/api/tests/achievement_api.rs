//! Integration tests for the achievement engine and the badge surface.
//!
//! Engine tests drive the [`Evaluator`] directly instead of going through
//! the bus listener, so evaluation timing is deterministic.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{body_json, get_auth, post_auth, post_json, post_json_auth};
use sqlx::PgPool;
use stride_api::auth::password::{generate_salt, hash_password};
use stride_api::engine::Evaluator;
use stride_core::badge::ConditionKind;
use stride_core::types::{DbId, SubjectKind};
use stride_db::models::badge::CreateBadge;
use stride_db::models::behavior::CreateBehaviorRecord;
use stride_db::models::user::{CreateUser, User};
use stride_db::repositories::{AchievementRepo, BadgeRepo, BehaviorRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "test-password-1";

async fn create_test_user(pool: &PgPool, username: &str, kind: SubjectKind) -> User {
    let salt = generate_salt();
    let input = CreateUser {
        username: username.to_string(),
        password_hash: hash_password(PASSWORD, &salt),
        salt: Some(salt),
        kind,
        nickname: None,
        email: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

async fn create_badge(
    pool: &PgPool,
    name: &str,
    kind: ConditionKind,
    threshold: i64,
    reward_points: i64,
) -> DbId {
    let badge = BadgeRepo::create(
        pool,
        &CreateBadge {
            name: name.to_string(),
            description: None,
            icon_url: None,
            condition_kind: kind,
            threshold,
            reward_points,
        },
    )
    .await
    .expect("badge creation should succeed");
    badge.id
}

async fn record_minutes(pool: &PgPool, user_id: DbId, minutes: i64) {
    BehaviorRepo::create(
        pool,
        user_id,
        &CreateBehaviorRecord {
            activity: "running".to_string(),
            duration_minutes: minutes,
            record_date: Some(Utc::now().date_naive()),
        },
    )
    .await
    .expect("behavior insert should succeed");
}

async fn login_token(app: axum::Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Engine: progress and grants
// ---------------------------------------------------------------------------

/// Progress tracks the cumulative-duration metric, floored, and the grant
/// fires exactly when the threshold is crossed.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_duration_badge_progress_then_grant(pool: PgPool) {
    let user = create_test_user(&pool, "runner", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "5 Hours", ConditionKind::CumulativeDuration, 300, 50).await;
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 150).await;
    record_minutes(&pool, user.id, 100).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .expect("progress row should exist");
    // 250 of 300 minutes -> floor(83.33) = 83, not yet achieved.
    assert_eq!(row.progress, 83);
    assert!(row.achieved_at.is_none());
    assert_eq!(UserRepo::points(&pool, user.id).await.unwrap(), Some(0));

    record_minutes(&pool, user.id, 80).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.progress, 100);
    assert!(row.achieved_at.is_some());
    assert_eq!(UserRepo::points(&pool, user.id).await.unwrap(), Some(50));
}

/// Duplicate event delivery neither double-credits points nor moves
/// `achieved_at`; further activity after the grant leaves the row terminal.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_grant_is_at_most_once_under_duplicate_delivery(pool: PgPool) {
    let user = create_test_user(&pool, "dupes", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "First Hour", ConditionKind::CumulativeDuration, 60, 25).await;
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 90).await;
    engine.on_behavior_recorded(user.id).await.unwrap();
    let first = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    let achieved_at = first.achieved_at.expect("should be granted");

    // Same event re-delivered, plus more activity afterwards.
    engine.on_behavior_recorded(user.id).await.unwrap();
    record_minutes(&pool, user.id, 500).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.progress, 100);
    assert_eq!(row.achieved_at, Some(achieved_at), "grant timestamp is final");
    assert_eq!(
        UserRepo::points(&pool, user.id).await.unwrap(),
        Some(25),
        "points credited exactly once"
    );
}

/// The first qualifying event may jump straight from no row to granted.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_grant_without_prior_progress_row(pool: PgPool) {
    let user = create_test_user(&pool, "jumper", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Ten Minutes", ConditionKind::CumulativeDuration, 10, 5).await;
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 45).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.achieved_at.is_some());
    assert_eq!(UserRepo::points(&pool, user.id).await.unwrap(), Some(5));
}

/// Record-count badges count rows, not minutes.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_record_count_badge(pool: PgPool) {
    let user = create_test_user(&pool, "counter", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Three Sessions", ConditionKind::RecordCount, 3, 10).await;
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 1).await;
    record_minutes(&pool, user.id, 1).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.progress, 66);
    assert!(row.achieved_at.is_none());

    record_minutes(&pool, user.id, 1).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.achieved_at.is_some());
}

/// A streak badge counts consecutive active days ending today.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_streak_badge(pool: PgPool) {
    let user = create_test_user(&pool, "streaker", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Three Days", ConditionKind::StreakDays, 3, 30).await;
    let engine = Evaluator::new(pool.clone());

    let today = Utc::now().date_naive();
    for days_ago in [2u64, 1, 0] {
        BehaviorRepo::create(
            &pool,
            user.id,
            &CreateBehaviorRecord {
                activity: "walking".to_string(),
                duration_minutes: 10,
                record_date: Some(today - Days::new(days_ago)),
            },
        )
        .await
        .unwrap();
    }

    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.achieved_at.is_some());
    assert_eq!(UserRepo::points(&pool, user.id).await.unwrap(), Some(30));
}

/// A broken streak records partial progress and nothing is granted.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_streak_badge_with_gap(pool: PgPool) {
    let user = create_test_user(&pool, "gapped", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Five Days", ConditionKind::StreakDays, 5, 30).await;
    let engine = Evaluator::new(pool.clone());

    let today = Utc::now().date_naive();
    // Active today and yesterday, then a gap, then two older days.
    for days_ago in [0u64, 1, 3, 4] {
        BehaviorRepo::create(
            &pool,
            user.id,
            &CreateBehaviorRecord {
                activity: "walking".to_string(),
                duration_minutes: 10,
                record_date: Some(today - Days::new(days_ago)),
            },
        )
        .await
        .unwrap();
    }

    engine.on_behavior_recorded(user.id).await.unwrap();

    let row = AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .unwrap();
    // Streak of 2 toward 5 -> 40.
    assert_eq!(row.progress, 40);
    assert!(row.achieved_at.is_none());
}

/// Scheduled re-evaluation only touches time-dependent conditions.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_scheduled_reevaluation_only_checks_time_dependent(pool: PgPool) {
    let user = create_test_user(&pool, "scheduled", SubjectKind::User).await;
    let duration_badge =
        create_badge(&pool, "An Hour", ConditionKind::CumulativeDuration, 60, 10).await;
    let streak_badge = create_badge(&pool, "One Day", ConditionKind::StreakDays, 1, 10).await;
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 90).await;
    engine.on_scheduled_reevaluation(user.id).await.unwrap();

    // Streak badge evaluated and granted; duration badge untouched.
    assert!(AchievementRepo::find(&pool, user.id, streak_badge)
        .await
        .unwrap()
        .is_some_and(|r| r.achieved_at.is_some()));
    assert!(AchievementRepo::find(&pool, user.id, duration_badge)
        .await
        .unwrap()
        .is_none());
}

/// Inactive badges are not evaluated.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_inactive_badge_not_evaluated(pool: PgPool) {
    let user = create_test_user(&pool, "ignored", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Retired", ConditionKind::CumulativeDuration, 10, 10).await;
    BadgeRepo::update(
        &pool,
        badge_id,
        &stride_db::models::badge::UpdateBadge {
            name: None,
            description: None,
            icon_url: None,
            threshold: None,
            reward_points: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();
    let engine = Evaluator::new(pool.clone());

    record_minutes(&pool, user.id, 60).await;
    engine.on_behavior_recorded(user.id).await.unwrap();

    assert!(AchievementRepo::find(&pool, user.id, badge_id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// HTTP surface
// ---------------------------------------------------------------------------

/// Recording a behavior over HTTP returns 201 with the stored row.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_record_behavior_endpoint(pool: PgPool) {
    create_test_user(&pool, "poster", SubjectKind::User).await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "poster").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/behaviors",
        &token,
        serde_json::json!({ "activity": "cycling", "duration_minutes": 45 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["activity"], "cycling");
    assert_eq!(json["duration_minutes"], 45);

    // Invalid payloads are rejected.
    let bad = post_json_auth(
        app,
        "/api/v1/behaviors",
        &token,
        serde_json::json!({ "activity": "", "duration_minutes": 45 }),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

/// The achievements listing joins badge definitions with progress.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_achievements_and_points_endpoints(pool: PgPool) {
    let user = create_test_user(&pool, "haver", SubjectKind::User).await;
    create_badge(&pool, "First Hour", ConditionKind::CumulativeDuration, 60, 25).await;
    create_badge(&pool, "Far Away", ConditionKind::CumulativeDuration, 6000, 99).await;

    record_minutes(&pool, user.id, 90).await;
    Evaluator::new(pool.clone())
        .on_behavior_recorded(user.id)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "haver").await;

    let response = get_auth(app.clone(), "/api/v1/users/me/achievements", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Achieved first.
    assert_eq!(list[0]["badge_name"], "First Hour");
    assert!(list[0]["achieved_at"].is_string());
    assert_eq!(list[1]["badge_name"], "Far Away");
    assert!(list[1]["achieved_at"].is_null());

    let response = get_auth(app, "/api/v1/users/me/points", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["reward_points"], 25);
}

/// The public badge listing shows only active badges.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_badge_listing_filters_inactive(pool: PgPool) {
    create_test_user(&pool, "browser", SubjectKind::User).await;
    create_badge(&pool, "Visible", ConditionKind::RecordCount, 5, 10).await;
    let hidden = create_badge(&pool, "Hidden", ConditionKind::RecordCount, 5, 10).await;
    BadgeRepo::update(
        &pool,
        hidden,
        &stride_db::models::badge::UpdateBadge {
            name: None,
            description: None,
            icon_url: None,
            threshold: None,
            reward_points: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "browser").await;

    let response = get_auth(app.clone(), "/api/v1/badges", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Visible");

    let response = get_auth(app, &format!("/api/v1/badges/{hidden}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin badge management
// ---------------------------------------------------------------------------

/// Admin badge CRUD: create, duplicate-name conflict, update, delete.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_badge_crud(pool: PgPool) {
    create_test_user(&pool, "badge-admin", SubjectKind::Admin).await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "badge-admin").await;

    let create_body = serde_json::json!({
        "name": "Marathon",
        "condition_kind": "cumulative_duration",
        "threshold": 2400,
        "reward_points": 100,
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/badges", &token, create_body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let badge_id = created["id"].as_i64().unwrap();

    // Duplicate name hits the unique constraint -> 409.
    let dup = post_json_auth(app.clone(), "/api/v1/admin/badges", &token, create_body).await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    // Update the threshold.
    let response = common::put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/badges/{badge_id}"),
        &token,
        serde_json::json!({ "threshold": 3000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["threshold"], 3000);

    // Delete while unheld succeeds.
    let response = common::delete_auth(
        app.clone(),
        &format!("/api/v1/admin/badges/{badge_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone now.
    let response = common::put_json_auth(
        app,
        &format!("/api/v1/admin/badges/{badge_id}"),
        &token,
        serde_json::json!({ "threshold": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A badge with achievement progress cannot be deleted.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_cannot_delete_held_badge(pool: PgPool) {
    create_test_user(&pool, "keeper-admin", SubjectKind::Admin).await;
    let user = create_test_user(&pool, "holder", SubjectKind::User).await;
    let badge_id = create_badge(&pool, "Held", ConditionKind::CumulativeDuration, 60, 10).await;

    record_minutes(&pool, user.id, 30).await;
    Evaluator::new(pool.clone())
        .on_behavior_recorded(user.id)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "keeper-admin").await;

    let response =
        common::delete_auth(app, &format!("/api/v1/admin/badges/{badge_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Invalid badge definitions are rejected up front.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_badge_validation(pool: PgPool) {
    create_test_user(&pool, "picky-admin", SubjectKind::Admin).await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "picky-admin").await;

    let response = post_json_auth(
        app,
        "/api/v1/admin/badges",
        &token,
        serde_json::json!({
            "name": "Bad",
            "condition_kind": "record_count",
            "threshold": 0,
            "reward_points": 10,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The admin re-evaluation endpoint accepts and returns 202.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_reevaluate_accepted(pool: PgPool) {
    create_test_user(&pool, "reeval-admin", SubjectKind::Admin).await;
    let target = create_test_user(&pool, "reeval-target", SubjectKind::User).await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "reeval-admin").await;

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}/reevaluate", target.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Unknown target is a 404, not a silent accept.
    let response = post_auth(app, "/api/v1/admin/users/999999/reevaluate", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
