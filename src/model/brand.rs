use crate::model::validator::{validate_slug, validate_url_or_empty};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub is_claimed: bool,
    pub is_verified: bool,
    pub created_at: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct BrandWithFollowers {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub brand: Brand,
    pub followers_count: i64,
}

/// A brand suggested to a reader, ranked by follower count.
#[derive(Debug, Serialize, FromRow)]
pub struct PopularBrand {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub followers_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 100, message = "Name and slug are required fields"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 100, message = "Name and slug are required fields"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub website: Option<String>,
    pub domain: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrandSearchQuery {
    pub q: Option<String>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PopularBrandsQuery {
    #[validate(range(min = 1, max = 50, message = "must be between 1 and 50"))]
    pub limit: Option<i64>,
}
