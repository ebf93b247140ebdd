use crate::errors::{bad_request, not_found, ApiError, ApiResult};
use crate::model::follow::{Follow, FollowStatus, FollowTarget};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

impl FollowTarget {
    fn column(&self) -> (&'static str, &str) {
        match self {
            FollowTarget::Claimed(id) => ("following_id", id.as_str()),
            FollowTarget::Unclaimed(name) => ("following_name", name.as_str()),
        }
    }
}

impl Follow {
    /// Follows `target` on behalf of `follower_id`.
    ///
    /// A claimed target must be an existing user or brand. A name that
    /// matches a registered brand is followed by that brand's id instead.
    pub async fn create(pool: &SqlitePool, follower_id: &str, target: FollowTarget) -> ApiResult<Follow> {
        let target = Self::resolve(pool, target).await?;

        if let FollowTarget::Claimed(ref id) = target {
            if id == follower_id {
                return Err(bad_request("Cannot follow yourself"));
            }
            if !Self::target_exists(pool, id).await? {
                return Err(not_found("Target not found"));
            }
        }

        let (following_id, following_name) = target.columns();
        let follow = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (follower_id, following_id, following_name, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(following_name)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref e) if e.is_unique_violation() => bad_request("Already following"),
            err => ApiError::from(err),
        })?;

        Ok(follow)
    }

    pub async fn delete(pool: &SqlitePool, follower_id: &str, target: FollowTarget) -> ApiResult<()> {
        let target = Self::resolve(pool, target).await?;
        let (column, value) = target.column();

        let rv = sqlx::query(&format!("DELETE FROM follows WHERE follower_id = ? AND {column} = ?"))
            .bind(follower_id)
            .bind(value)
            .execute(pool)
            .await?;

        if rv.rows_affected() == 0 {
            return Err(not_found("Follow not found"));
        }
        Ok(())
    }

    pub async fn exists(pool: &SqlitePool, follower_id: &str, target: &FollowTarget) -> ApiResult<bool> {
        let (column, value) = target.column();

        let found: Option<i64> =
            sqlx::query_scalar(&format!("SELECT id FROM follows WHERE follower_id = ? AND {column} = ?"))
                .bind(follower_id)
                .bind(value)
                .fetch_optional(pool)
                .await?;

        Ok(found.is_some())
    }

    /// Like [`Follow::exists`], after resolving a brand name to its id.
    pub async fn is_following(pool: &SqlitePool, follower_id: &str, target: FollowTarget) -> ApiResult<bool> {
        let target = Self::resolve(pool, target).await?;
        Self::exists(pool, follower_id, &target).await
    }

    pub async fn count_followers(pool: &SqlitePool, target: &FollowTarget) -> ApiResult<i64> {
        let (column, value) = target.column();

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM follows WHERE {column} = ?"))
            .bind(value)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Whether `follower_id` follows the target, and how many followers it has.
    /// Anonymous callers always get `is_following = false`.
    pub async fn status(
        pool: &SqlitePool,
        follower_id: Option<&str>,
        target: FollowTarget,
    ) -> ApiResult<FollowStatus> {
        let target = Self::resolve(pool, target).await?;

        let is_following = match follower_id {
            Some(follower_id) => Self::exists(pool, follower_id, &target).await?,
            None => false,
        };
        let followers_count = Self::count_followers(pool, &target).await?;

        Ok(FollowStatus {
            is_following,
            followers_count,
        })
    }

    /// Moves follows addressed to `name` onto the brand `brand_id`.
    ///
    /// Runs inside the caller's transaction. Each follower ends up with one
    /// row: an existing follow by id wins over name-addressed ones, and among
    /// name-addressed ones the oldest is kept.
    pub async fn claim_by_name(
        tx: &mut Transaction<'_, Sqlite>,
        brand_id: &str,
        name: &str,
    ) -> ApiResult<u64> {
        sqlx::query(
            r#"
            DELETE FROM follows
            WHERE following_name = ?1 COLLATE NOCASE
              AND id NOT IN (
                  SELECT MIN(id) FROM follows
                  WHERE following_name = ?1 COLLATE NOCASE
                  GROUP BY follower_id
              )
            "#,
        )
        .bind(name)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM follows
            WHERE following_name = ?1 COLLATE NOCASE
              AND follower_id IN (SELECT follower_id FROM follows WHERE following_id = ?2)
            "#,
        )
        .bind(name)
        .bind(brand_id)
        .execute(&mut **tx)
        .await?;

        let claimed = sqlx::query(
            r#"
            UPDATE follows
            SET following_id = ?2, following_name = NULL
            WHERE following_name = ?1 COLLATE NOCASE
            "#,
        )
        .bind(name)
        .bind(brand_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if claimed > 0 {
            info!("Brand {} claimed {} follows addressed to {:?}", brand_id, claimed, name);
        }
        Ok(claimed)
    }

    // A name belonging to a registered brand is treated as that brand's id.
    async fn resolve(pool: &SqlitePool, target: FollowTarget) -> ApiResult<FollowTarget> {
        let name = match target {
            FollowTarget::Unclaimed(name) => name,
            claimed => return Ok(claimed),
        };

        let brand_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM brands WHERE name = ? COLLATE NOCASE LIMIT 1")
                .bind(&name)
                .fetch_optional(pool)
                .await?;

        Ok(match brand_id {
            Some(id) => FollowTarget::Claimed(id),
            None => FollowTarget::Unclaimed(name),
        })
    }

    async fn target_exists(pool: &SqlitePool, id: &str) -> ApiResult<bool> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT id FROM users WHERE id = ?1 UNION ALL SELECT id FROM brands WHERE id = ?1 LIMIT 1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(found.is_some())
    }
}
