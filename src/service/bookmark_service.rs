use crate::errors::ApiResult;
use crate::model::bookmark::Bookmark;
use crate::model::newsletter::Newsletter;
use crate::model::Pagination;
use chrono::Utc;
use sqlx::SqlitePool;

impl Bookmark {
    /// Bookmarks a newsletter. Adding an existing bookmark changes nothing.
    pub async fn add(pool: &SqlitePool, user_id: &str, newsletter_id: i64) -> ApiResult<bool> {
        let now = Utc::now().timestamp_millis();
        let mut tx = pool.begin().await?;

        Newsletter::ensure_exists(&mut *tx, newsletter_id).await?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO bookmarks (user_id, newsletter_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(newsletter_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            sqlx::query("UPDATE newsletters SET bookmarks_count = bookmarks_count + 1 WHERE id = ?")
                .bind(newsletter_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Removes a bookmark if present.
    pub async fn remove(pool: &SqlitePool, user_id: &str, newsletter_id: i64) -> ApiResult<bool> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND newsletter_id = ?")
            .bind(user_id)
            .bind(newsletter_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        if removed {
            sqlx::query(
                r#"
                UPDATE newsletters
                SET bookmarks_count = bookmarks_count - 1
                WHERE id = ? AND bookmarks_count > 0
                "#,
            )
            .bind(newsletter_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    pub async fn exists(pool: &SqlitePool, user_id: &str, newsletter_id: i64) -> ApiResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM bookmarks WHERE user_id = ? AND newsletter_id = ?")
                .bind(user_id)
                .bind(newsletter_id)
                .fetch_optional(pool)
                .await?;

        Ok(found.is_some())
    }

    /// The user's bookmarked newsletters, most recently bookmarked first.
    pub async fn find_newsletters(
        pool: &SqlitePool,
        user_id: &str,
        page: &Pagination,
    ) -> ApiResult<Vec<Newsletter>> {
        let newsletters = sqlx::query_as::<_, Newsletter>(
            r#"
            SELECT n.*
            FROM bookmarks b
            JOIN newsletters n ON n.id = b.newsletter_id
            WHERE b.user_id = ?
            ORDER BY b.created_at DESC, b.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(page.take_or(20))
        .bind(page.skip())
        .fetch_all(pool)
        .await?;

        Ok(newsletters)
    }

    pub async fn count_for_user(pool: &SqlitePool, user_id: &str) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
