use chrono::Utc;
use letterbox::config::db::DB;
use letterbox::config::rd::RD;
use letterbox::config::AppConfig;
use letterbox::service::upload_service::LocalStore;
use letterbox::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Fresh in-memory database with migrations applied.
///
/// One connection only: every connection to `sqlite::memory:` would open a
/// separate empty database.
pub async fn setup_db() -> DB {
    let db = DB::new("sqlite::memory:", 1).await.unwrap();
    db.migrate().await.unwrap();
    db
}

pub async fn setup_state(manual_calculation: bool) -> AppState {
    let mut config = AppConfig::default();
    config.rate_limit.enabled = false;
    config.badge.manual_calculation = manual_calculation;
    config.upload.base_path = std::env::temp_dir()
        .join(format!("letterbox-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();

    let store = LocalStore::new(&config.upload.base_path, &config.upload.base_url);

    AppState {
        config: Arc::new(config),
        db: Arc::new(setup_db().await),
        rd: Arc::new(RD::new_lazy("redis://127.0.0.1/").unwrap()),
        store: Arc::new(store),
    }
}

pub async fn insert_user(pool: &SqlitePool, id: &str, username: &str) {
    let now = Utc::now().timestamp_millis();
    sqlx::query(
        r#"
        INSERT INTO users (id, name, username, email, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(format!("User {}", id))
    .bind(username)
    .bind(format!("{}@example.com", id))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_session(pool: &SqlitePool, token: &str, user_id: &str) {
    let expires = Utc::now().timestamp_millis() + 3_600_000;
    sqlx::query("INSERT INTO sessions (session_token, user_id, expires) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(expires)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_newsletter(pool: &SqlitePool, subject: &str, created_at: i64) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO newsletters (sender, subject, created_at, updated_at)
        VALUES ('sender@example.com', ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(subject)
    .bind(created_at)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn set_counts(pool: &SqlitePool, id: i64, likes: i64, you_rocks: i64) {
    sqlx::query("UPDATE newsletters SET likes_count = ?, you_rocks_count = ? WHERE id = ?")
        .bind(likes)
        .bind(you_rocks)
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn likes_count(pool: &SqlitePool, id: i64) -> i64 {
    sqlx::query_scalar("SELECT likes_count FROM newsletters WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
