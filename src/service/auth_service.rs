use crate::errors::ApiResult;
use crate::model::user::CurrentUser;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct AuthService;

impl AuthService {
    /// Resolves a session token to its user. Expired or unknown tokens yield `None`.
    pub async fn find_session_user(pool: &SqlitePool, token: &str) -> ApiResult<Option<CurrentUser>> {
        let now = Utc::now().timestamp_millis();

        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE session_token = ? AND expires > ?",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(user_id.map(|id| CurrentUser { id }))
    }

    pub async fn delete_expired_sessions(pool: &SqlitePool, now: i64) -> ApiResult<u64> {
        let rv = sqlx::query("DELETE FROM sessions WHERE expires <= ?")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(rv.rows_affected())
    }
}
