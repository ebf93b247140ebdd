use crate::errors::{not_found, ApiResult};
use crate::model::newsletter::{
    CreateNewsletterRequest, ExplorePage, FeedNewsletter, FeedPage, Newsletter, NewsletterWithTags, PageInfo,
};
use crate::model::tag::Tag;
use crate::model::Pagination;
use crate::util::retry::{with_retry, RetryPolicy};
use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

const POPULAR_LIMIT: i64 = 12;

impl Newsletter {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> ApiResult<Option<Newsletter>> {
        let newsletter = sqlx::query_as::<_, Newsletter>("SELECT * FROM newsletters WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(newsletter)
    }

    pub async fn find_with_tags(pool: &SqlitePool, id: i64) -> ApiResult<NewsletterWithTags> {
        let newsletter = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(newsletter_not_found)?;

        let mut rv = Tag::attach_names(pool, vec![newsletter]).await?;
        rv.pop().ok_or_else(newsletter_not_found)
    }

    pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> ApiResult<Vec<Newsletter>> {
        let ids = serde_json::to_string(ids).map_err(anyhow::Error::from)?;
        let newsletters = sqlx::query_as::<_, Newsletter>(
            r#"
            SELECT *
            FROM newsletters
            WHERE id IN (SELECT value FROM json_each(?1))
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(newsletters)
    }

    /// Fails with 404 unless the newsletter exists.
    pub async fn ensure_exists<'e, E>(executor: E, id: i64) -> ApiResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM newsletters WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        if found.is_some() {
            Ok(())
        } else {
            Err(newsletter_not_found())
        }
    }

    /// Stores a newsletter owned by `user_id` together with its tags.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        req: CreateNewsletterRequest,
    ) -> ApiResult<NewsletterWithTags> {
        let now = Utc::now().timestamp_millis();
        let mut tx = pool.begin().await?;

        let newsletter = sqlx::query_as::<_, Newsletter>(
            r#"
            INSERT INTO newsletters (user_id, brand_id, sender, subject, html_file_url,
                                     full_screenshot_url, top_screenshot_url, summary,
                                     created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&req.brand_id)
        .bind(req.sender.trim())
        .bind(req.subject.trim())
        .bind(&req.html_file_url)
        .bind(&req.full_screenshot_url)
        .bind(&req.top_screenshot_url)
        .bind(&req.summary)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let tags = Tag::attach(&mut tx, newsletter.id, &req.tags).await?;
        tx.commit().await?;

        Ok(NewsletterWithTags {
            newsletter,
            tags: tags.into_iter().map(|t| t.name).collect(),
        })
    }

    /// Newsletters with at least one like or "you rock", best first.
    pub async fn find_popular(pool: &SqlitePool, policy: &RetryPolicy) -> ApiResult<Vec<Newsletter>> {
        let newsletters = with_retry(pool, policy, || {
            sqlx::query_as::<_, Newsletter>(
                r#"
                SELECT * FROM newsletters
                WHERE likes_count > 0 OR you_rocks_count > 0
                ORDER BY likes_count DESC, you_rocks_count DESC, created_at DESC
                LIMIT ?
                "#,
            )
            .bind(POPULAR_LIMIT)
            .fetch_all(pool)
        })
        .await?;

        Ok(newsletters)
    }

    /// Same ordering as popular, without a threshold. An empty page is not an error.
    pub async fn find_trending(pool: &SqlitePool, page: &Pagination) -> ApiResult<Vec<Newsletter>> {
        let newsletters = sqlx::query_as::<_, Newsletter>(
            r#"
            SELECT * FROM newsletters
            ORDER BY likes_count DESC, you_rocks_count DESC, created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.take_or(15))
        .bind(page.skip())
        .fetch_all(pool)
        .await?;

        Ok(newsletters)
    }

    /// Newest newsletters carrying `tag_id`, with their tag names.
    pub async fn find_by_tag(
        pool: &SqlitePool,
        policy: &RetryPolicy,
        tag_id: i64,
        page: &Pagination,
    ) -> ApiResult<Vec<NewsletterWithTags>> {
        let take = page.take_or(15);
        let skip = page.skip();

        let newsletters = with_retry(pool, policy, || {
            sqlx::query_as::<_, Newsletter>(
                r#"
                SELECT n.*
                FROM newsletters n
                JOIN newsletter_tags nt ON nt.newsletter_id = n.id
                WHERE nt.tag_id = ?
                ORDER BY n.created_at DESC, n.id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(tag_id)
            .bind(take)
            .bind(skip)
            .fetch_all(pool)
        })
        .await?;

        Tag::attach_names(pool, newsletters).await
    }

    /// Every newsletter, newest first, with tags and the total for paging.
    pub async fn find_explore(pool: &SqlitePool, policy: &RetryPolicy, page: &Pagination) -> ApiResult<ExplorePage> {
        let take = page.take_or(15);
        let skip = page.skip();

        let newsletters = with_retry(pool, policy, || {
            sqlx::query_as::<_, Newsletter>(
                r#"
                SELECT * FROM newsletters
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(take)
            .bind(skip)
            .fetch_all(pool)
        })
        .await?;

        let total = with_retry(pool, policy, || {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM newsletters").fetch_one(pool)
        })
        .await?;

        Ok(ExplorePage {
            newsletters: Tag::attach_names(pool, newsletters).await?,
            pagination: PageInfo {
                total,
                skip,
                take,
                has_more: skip + take < total,
            },
        })
    }

    /// Newsletters sent by brands `user_id` follows, newest first.
    ///
    /// Fetches one row past `limit` to tell whether another page exists.
    pub async fn find_feed(pool: &SqlitePool, user_id: &str, page: i64, limit: i64) -> ApiResult<FeedPage> {
        let offset = (page.max(1) - 1) * limit;

        let mut newsletters = sqlx::query_as::<_, FeedNewsletter>(
            r#"
            SELECT n.*, b.name AS brand_name, b.slug AS brand_slug, b.logo AS brand_logo
            FROM newsletters n
            JOIN brands b ON b.id = n.brand_id
            JOIN follows f ON f.following_id = b.id
            WHERE f.follower_id = ?
            ORDER BY n.created_at DESC, n.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit + 1)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = newsletters.len() > limit;
        newsletters.truncate(limit);

        Ok(FeedPage { newsletters, has_more })
    }
}

fn newsletter_not_found() -> crate::errors::ApiError {
    not_found("Newsletter not found")
}
