use crate::model::Pagination;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// which Rust types correspond to which sqlite column types:
// https://docs.rs/sqlx/latest/sqlx/sqlite/types/index.html
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Newsletter {
    pub id: i64,
    pub user_id: Option<String>,
    pub brand_id: Option<String>,
    pub sender: String,
    pub subject: String,
    pub html_file_url: Option<String>,
    pub full_screenshot_url: Option<String>,
    pub top_screenshot_url: Option<String>,
    pub summary: Option<String>,
    pub likes_count: i64,
    pub you_rocks_count: i64,
    pub bookmarks_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize)]
pub struct NewsletterWithTags {
    #[serde(flatten)]
    pub newsletter: Newsletter,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsletterRequest {
    #[validate(length(min = 1, max = 200, message = "can not be empty"))]
    pub sender: String,
    #[validate(length(min = 1, max = 500, message = "can not be empty"))]
    pub subject: String,
    pub brand_id: Option<String>,
    #[validate(url)]
    pub html_file_url: Option<String>,
    #[validate(url)]
    pub full_screenshot_url: Option<String>,
    #[validate(url)]
    pub top_screenshot_url: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10, message = "at most 10 tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterIdQuery {
    pub newsletter_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub newsletter_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeToggled {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes_count: i64,
    pub is_liked: bool,
}

fn default_increment() -> i64 {
    1
}

/// A batch of "you rock" clicks flushed by the client in one request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouRockRequest {
    pub newsletter_id: i64,
    #[serde(default = "default_increment")]
    pub increment_by: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct YouRockCount {
    pub you_rocks_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByTagQuery {
    pub tag_id: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub skip: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub take: Option<i64>,
}

impl ByTagQuery {
    pub fn page(&self) -> Pagination {
        Pagination {
            skip: self.skip,
            take: self.take,
        }
    }
}

/// A newsletter in someone's feed, with the brand that sent it.
#[derive(Debug, Serialize, FromRow)]
pub struct FeedNewsletter {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub newsletter: Newsletter,
    pub brand_name: String,
    pub brand_slug: String,
    pub brand_logo: Option<String>,
}

/// `page` starts at 1.
#[derive(Debug, Deserialize, Validate)]
pub struct FeedQuery {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub newsletters: Vec<FeedNewsletter>,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: i64,
    pub skip: i64,
    pub take: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ExplorePage {
    pub newsletters: Vec<NewsletterWithTags>,
    pub pagination: PageInfo,
}
