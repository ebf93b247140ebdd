use crate::errors::{bad_request, not_found, ApiResult};
use crate::model::brand::{Brand, BrandWithFollowers, CreateBrandRequest, PopularBrand};
use crate::model::follow::Follow;
use crate::model::newsletter::Newsletter;
use crate::model::Pagination;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const BRAND_WITH_FOLLOWERS: &str = r#"
    SELECT b.*,
           (SELECT COUNT(*) FROM follows f WHERE f.following_id = b.id) AS followers_count
    FROM brands b
"#;

impl Brand {
    /// Registers a claimed brand and hands it the follows addressed to its name.
    pub async fn create(pool: &SqlitePool, req: CreateBrandRequest) -> ApiResult<Brand> {
        let domain = req.domain.as_deref().map(str::trim).filter(|d| !d.is_empty());

        let taken: Option<(String, Option<String>)> = sqlx::query_as(
            "SELECT slug, domain FROM brands WHERE slug = ? OR (? IS NOT NULL AND domain = ?) LIMIT 1",
        )
        .bind(&req.slug)
        .bind(domain)
        .bind(domain)
        .fetch_optional(pool)
        .await?;

        if let Some((slug, _)) = taken {
            return Err(bad_request(if slug == req.slug {
                "This brand URL is already taken"
            } else {
                "This domain is already registered"
            }));
        }

        let name = req.name.trim();
        let blank_as_none = |v: &Option<String>| {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
        };

        let mut tx = pool.begin().await?;
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (id, name, slug, description, logo, website, domain,
                                is_claimed, is_verified, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, TRUE, FALSE, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(&req.slug)
        .bind(blank_as_none(&req.description))
        .bind(blank_as_none(&req.logo))
        .bind(blank_as_none(&req.website))
        .bind(domain)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&mut *tx)
        .await?;

        Follow::claim_by_name(&mut tx, &brand.id, name).await?;
        tx.commit().await?;

        Ok(brand)
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> ApiResult<BrandWithFollowers> {
        sqlx::query_as::<_, BrandWithFollowers>(&format!("{BRAND_WITH_FOLLOWERS} WHERE b.slug = ?"))
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found("Brand not found"))
    }

    /// Newest brands first, optionally filtered by name, slug or domain.
    pub async fn search(
        pool: &SqlitePool,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<BrandWithFollowers>> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.replace('%', "\\%").replace('_', "\\_")));

        let brands = sqlx::query_as::<_, BrandWithFollowers>(&format!(
            r#"
            {BRAND_WITH_FOLLOWERS}
            WHERE ?1 IS NULL
               OR b.name LIKE ?1 ESCAPE '\'
               OR b.slug LIKE ?1 ESCAPE '\'
               OR b.domain LIKE ?1 ESCAPE '\'
            ORDER BY b.created_at DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(brands)
    }

    pub async fn find_newsletters(pool: &SqlitePool, slug: &str, page: &Pagination) -> ApiResult<Vec<Newsletter>> {
        let brand_id: String = sqlx::query_scalar("SELECT id FROM brands WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found("Brand not found"))?;

        let newsletters = sqlx::query_as::<_, Newsletter>(
            r#"
            SELECT * FROM newsletters
            WHERE brand_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(brand_id)
        .bind(page.take_or(12))
        .bind(page.skip())
        .fetch_all(pool)
        .await?;

        Ok(newsletters)
    }

    /// Brands with the most followers, leaving out those `user_id` already follows.
    /// Ties go to brands whose newsletters collected the most reactions.
    pub async fn find_popular(pool: &SqlitePool, user_id: Option<&str>, limit: i64) -> ApiResult<Vec<PopularBrand>> {
        let brands = sqlx::query_as::<_, PopularBrand>(
            r#"
            SELECT b.id, b.name, b.slug, b.logo, b.description,
                   (SELECT COUNT(*) FROM follows f WHERE f.following_id = b.id) AS followers_count,
                   (SELECT COALESCE(SUM(n.likes_count + n.you_rocks_count), 0)
                    FROM newsletters n WHERE n.brand_id = b.id) AS reactions
            FROM brands b
            WHERE NOT EXISTS (
                SELECT 1 FROM follows mine
                WHERE mine.follower_id = ?1 AND mine.following_id = b.id
            )
            ORDER BY followers_count DESC, reactions DESC, b.created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(brands)
    }
}
