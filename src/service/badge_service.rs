use crate::errors::ApiResult;
use crate::model::badge::{
    Badge, BadgeCategory, BadgeRank, BadgeType, BadgeWithNewsletter, RankedNewsletter,
};
use crate::model::newsletter::Newsletter;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::{error, info};

const TOP_N: i64 = 3;

impl Badge {
    /// Ranks newsletters created in the current `category` window by both
    /// metrics and stores rank FIRST/SECOND/THIRD badges for the top three.
    ///
    /// Badges previously stored for the same type, category and window are
    /// replaced in the same transaction, so running this repeatedly within a
    /// window never duplicates awards. Earlier windows are left untouched.
    pub async fn calculate_and_award(
        pool: &SqlitePool,
        category: BadgeCategory,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<Badge>> {
        let start = category.window_start(now).timestamp_millis();
        let end = now.timestamp_millis();

        let mut tx = pool.begin().await?;
        let mut awarded = Vec::new();

        for badge_type in BadgeType::ALL {
            let top = Self::top_newsletters(&mut tx, badge_type, start, end).await?;

            sqlx::query("DELETE FROM badges WHERE type = ? AND category = ? AND period_start = ?")
                .bind(badge_type)
                .bind(category)
                .bind(start)
                .execute(&mut *tx)
                .await?;

            for (index, ranked) in top.iter().enumerate() {
                let Some(rank) = BadgeRank::from_index(index) else {
                    break;
                };
                let badge = sqlx::query_as::<_, Badge>(
                    r#"
                    INSERT INTO badges (newsletter_id, type, category, rank, count, period_start, earned_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    RETURNING *
                    "#,
                )
                .bind(ranked.id)
                .bind(badge_type)
                .bind(category)
                .bind(rank)
                .bind(ranked.metric)
                .bind(start)
                .bind(end)
                .fetch_one(&mut *tx)
                .await?;

                awarded.push(badge);
            }
        }

        tx.commit().await?;

        info!("[Badges] Awarded {} {} badges", awarded.len(), category);
        Ok(awarded)
    }

    /// Runs every category one after another. A failing category is logged
    /// and reported without stopping the others.
    pub async fn calculate_all(
        pool: &SqlitePool,
        now: DateTime<Utc>,
    ) -> Vec<(BadgeCategory, ApiResult<Vec<Badge>>)> {
        let mut outcomes = Vec::with_capacity(BadgeCategory::ALL.len());

        for category in BadgeCategory::ALL {
            let rv = Self::calculate_and_award(pool, category, now).await;
            if let Err(ref e) = rv {
                error!("[Badges] Cannot calculate {} badges: {}", category, e);
            }
            outcomes.push((category, rv));
        }

        outcomes
    }

    /// Latest badges of one type and category, each with its newsletter.
    pub async fn top_badges(
        pool: &SqlitePool,
        badge_type: BadgeType,
        category: BadgeCategory,
        limit: i64,
    ) -> ApiResult<Vec<BadgeWithNewsletter>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT * FROM badges
            WHERE type = ? AND category = ?
            ORDER BY earned_at DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(badge_type)
        .bind(category)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        if badges.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = badges.iter().map(|b| b.newsletter_id).collect();
        let newsletters: HashMap<i64, Newsletter> = Newsletter::find_by_ids(pool, &ids)
            .await?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();

        // Badges cascade with their newsletter, so every lookup hits.
        Ok(badges
            .into_iter()
            .filter_map(|badge| {
                let newsletter = newsletters.get(&badge.newsletter_id)?.clone();
                Some(BadgeWithNewsletter { badge, newsletter })
            })
            .collect())
    }

    pub async fn find_by_newsletter(pool: &SqlitePool, newsletter_id: i64) -> ApiResult<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            "SELECT * FROM badges WHERE newsletter_id = ? ORDER BY earned_at DESC, id ASC",
        )
        .bind(newsletter_id)
        .fetch_all(pool)
        .await?;

        Ok(badges)
    }

    // Ties on the metric go to the newer newsletter, then the higher id.
    async fn top_newsletters(
        tx: &mut Transaction<'_, Sqlite>,
        badge_type: BadgeType,
        start: i64,
        end: i64,
    ) -> ApiResult<Vec<RankedNewsletter>> {
        let column = badge_type.column();
        let sql = format!(
            r#"
            SELECT id, {column} AS metric
            FROM newsletters
            WHERE created_at >= ? AND created_at <= ? AND {column} >= 1
            ORDER BY {column} DESC, created_at DESC, id DESC
            LIMIT ?
            "#
        );

        let rows = sqlx::query_as::<_, RankedNewsletter>(&sql)
            .bind(start)
            .bind(end)
            .bind(TOP_N)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows)
    }
}
