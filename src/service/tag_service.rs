use crate::errors::{not_found, ApiResult};
use crate::model::newsletter::{Newsletter, NewsletterWithTags};
use crate::model::tag::{NewsletterTagName, Tag, TagWithNewsletters};
use crate::model::validator::slugify;
use crate::model::Pagination;
use crate::util::retry::{with_retry, RetryPolicy};
use chrono::Utc;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::collections::{HashMap, HashSet};

const NEWSLETTERS_PER_TAG: i64 = 6;

#[derive(FromRow)]
struct TaggedNewsletter {
    #[sqlx(flatten)]
    newsletter: Newsletter,
    tag_id: i64,
}

impl Tag {
    /// Tags by usage, each with its newest newsletters.
    pub async fn find_top_with_newsletters(
        pool: &SqlitePool,
        page: &Pagination,
    ) -> ApiResult<Vec<TagWithNewsletters>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags ORDER BY count DESC, name ASC LIMIT ? OFFSET ?",
        )
        .bind(page.take_or(10))
        .bind(page.skip())
        .fetch_all(pool)
        .await?;

        if tags.is_empty() {
            return Ok(vec![]);
        }

        let ids = serde_json::to_string(&tags.iter().map(|t| t.id).collect::<Vec<_>>())
            .map_err(anyhow::Error::from)?;

        let rows = sqlx::query_as::<_, TaggedNewsletter>(
            r#"
            SELECT * FROM (
                SELECT n.*, nt.tag_id AS tag_id,
                       ROW_NUMBER() OVER (
                           PARTITION BY nt.tag_id ORDER BY n.created_at DESC, n.id DESC
                       ) AS position
                FROM newsletters n
                JOIN newsletter_tags nt ON nt.newsletter_id = n.id
                WHERE nt.tag_id IN (SELECT value FROM json_each(?1))
            )
            WHERE position <= ?2
            ORDER BY position
            "#,
        )
        .bind(ids)
        .bind(NEWSLETTERS_PER_TAG)
        .fetch_all(pool)
        .await?;

        let mut by_tag: HashMap<i64, Vec<Newsletter>> = HashMap::new();
        for row in rows {
            by_tag.entry(row.tag_id).or_default().push(row.newsletter);
        }

        Ok(tags
            .into_iter()
            .map(|tag| TagWithNewsletters {
                newsletters: by_tag.remove(&tag.id).unwrap_or_default(),
                tag,
            })
            .collect())
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> ApiResult<Tag> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found("Tag not found"))
    }

    /// Tags in use, most used first.
    pub async fn find_popular(pool: &SqlitePool, policy: &RetryPolicy, limit: i64) -> ApiResult<Vec<Tag>> {
        let tags = with_retry(pool, policy, || {
            sqlx::query_as::<_, Tag>(
                "SELECT * FROM tags WHERE count > 0 ORDER BY count DESC, name ASC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(pool)
        })
        .await?;

        Ok(tags)
    }

    /// Links `names` to a newsletter, creating missing tags by slug.
    ///
    /// Names that reduce to the same slug count once, and each new link
    /// bumps the tag's count inside the caller's transaction.
    pub async fn attach(
        tx: &mut Transaction<'_, Sqlite>,
        newsletter_id: i64,
        names: &[String],
    ) -> ApiResult<Vec<Tag>> {
        let now = Utc::now().timestamp_millis();
        let mut seen = HashSet::new();
        let mut attached = Vec::new();

        for name in names {
            let name = name.trim();
            let slug = slugify(name);
            if slug.is_empty() || !seen.insert(slug.clone()) {
                continue;
            }

            let tag = Tag::find_or_create(tx, name, &slug).await?;

            let linked = sqlx::query(
                "INSERT OR IGNORE INTO newsletter_tags (newsletter_id, tag_id) VALUES (?, ?)",
            )
            .bind(newsletter_id)
            .bind(tag.id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

            let tag = if linked == 1 {
                sqlx::query_as::<_, Tag>(
                    "UPDATE tags SET count = count + 1, updated_at = ? WHERE id = ? RETURNING *",
                )
                .bind(now)
                .bind(tag.id)
                .fetch_one(&mut **tx)
                .await?
            } else {
                tag
            };

            attached.push(tag);
        }

        Ok(attached)
    }

    /// Pairs each newsletter with its tag names, keeping the input order.
    pub async fn attach_names(
        pool: &SqlitePool,
        newsletters: Vec<Newsletter>,
    ) -> ApiResult<Vec<NewsletterWithTags>> {
        if newsletters.is_empty() {
            return Ok(vec![]);
        }

        let ids = serde_json::to_string(&newsletters.iter().map(|n| n.id).collect::<Vec<_>>())
            .map_err(anyhow::Error::from)?;

        let rows = sqlx::query_as::<_, NewsletterTagName>(
            r#"
            SELECT nt.newsletter_id, t.name
            FROM newsletter_tags nt
            JOIN tags t ON t.id = nt.tag_id
            WHERE nt.newsletter_id IN (SELECT value FROM json_each(?1))
            ORDER BY t.name
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            names.entry(row.newsletter_id).or_default().push(row.name);
        }

        Ok(newsletters
            .into_iter()
            .map(|newsletter| NewsletterWithTags {
                tags: names.remove(&newsletter.id).unwrap_or_default(),
                newsletter,
            })
            .collect())
    }

    async fn find_or_create(tx: &mut Transaction<'_, Sqlite>, name: &str, slug: &str) -> ApiResult<Tag> {
        let existing = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(tag) = existing {
            return Ok(tag);
        }

        let now = Utc::now().timestamp_millis();
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, slug, count, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(tag)
    }
}
