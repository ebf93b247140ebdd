use crate::errors::{bad_request, not_found, ApiResult};
use crate::model::newsletter::{LikeStatus, LikeToggled, Newsletter, YouRockCount};
use chrono::Utc;
use sqlx::SqlitePool;

/// Upper bound for one "you rock" flush. Matches the most clicks a client
/// buffers before sending.
pub const MAX_YOU_ROCKS_PER_REQUEST: i64 = 50;

impl Newsletter {
    /// Likes the newsletter, or removes the like if `user_id` already gave one.
    ///
    /// The like row and `likes_count` change together in one transaction.
    pub async fn toggle_like(pool: &SqlitePool, user_id: &str, newsletter_id: i64) -> ApiResult<LikeToggled> {
        let now = Utc::now().timestamp_millis();
        let mut tx = pool.begin().await?;

        Newsletter::ensure_exists(&mut *tx, newsletter_id).await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM likes WHERE user_id = ? AND newsletter_id = ?")
                .bind(user_id)
                .bind(newsletter_id)
                .fetch_optional(&mut *tx)
                .await?;

        let liked = match existing {
            Some(like_id) => {
                sqlx::query("DELETE FROM likes WHERE id = ?")
                    .bind(like_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    UPDATE newsletters
                    SET likes_count = likes_count - 1, updated_at = ?
                    WHERE id = ? AND likes_count > 0
                    "#,
                )
                .bind(now)
                .bind(newsletter_id)
                .execute(&mut *tx)
                .await?;

                false
            }
            None => {
                sqlx::query("INSERT INTO likes (user_id, newsletter_id, created_at) VALUES (?, ?, ?)")
                    .bind(user_id)
                    .bind(newsletter_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    "UPDATE newsletters SET likes_count = likes_count + 1, updated_at = ? WHERE id = ?",
                )
                .bind(now)
                .bind(newsletter_id)
                .execute(&mut *tx)
                .await?;

                true
            }
        };

        tx.commit().await?;
        Ok(LikeToggled { liked })
    }

    /// Like count plus whether `user_id` (if signed in) likes the newsletter.
    pub async fn like_status(
        pool: &SqlitePool,
        user_id: Option<&str>,
        newsletter_id: i64,
    ) -> ApiResult<LikeStatus> {
        let likes_count: i64 = sqlx::query_scalar("SELECT likes_count FROM newsletters WHERE id = ?")
            .bind(newsletter_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found("Newsletter not found"))?;

        let is_liked = match user_id {
            Some(user_id) => {
                let like: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM likes WHERE user_id = ? AND newsletter_id = ?")
                        .bind(user_id)
                        .bind(newsletter_id)
                        .fetch_optional(pool)
                        .await?;
                like.is_some()
            }
            None => false,
        };

        Ok(LikeStatus { likes_count, is_liked })
    }

    /// Adds a batch of "you rock" clicks and returns the new total.
    pub async fn add_you_rocks(pool: &SqlitePool, newsletter_id: i64, increment_by: i64) -> ApiResult<YouRockCount> {
        if !(1..=MAX_YOU_ROCKS_PER_REQUEST).contains(&increment_by) {
            return Err(bad_request(&format!(
                "incrementBy must be between 1 and {}",
                MAX_YOU_ROCKS_PER_REQUEST
            )));
        }

        let now = Utc::now().timestamp_millis();
        sqlx::query_as::<_, YouRockCount>(
            r#"
            UPDATE newsletters
            SET you_rocks_count = you_rocks_count + ?, updated_at = ?
            WHERE id = ?
            RETURNING you_rocks_count
            "#,
        )
        .bind(increment_by)
        .bind(now)
        .bind(newsletter_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("Newsletter not found"))
    }

    pub async fn you_rocks(pool: &SqlitePool, newsletter_id: i64) -> ApiResult<YouRockCount> {
        sqlx::query_as::<_, YouRockCount>("SELECT you_rocks_count FROM newsletters WHERE id = ?")
            .bind(newsletter_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found("Newsletter not found"))
    }
}
