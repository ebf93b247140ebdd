use crate::model::newsletter::Newsletter;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize)]
pub struct TagWithNewsletters {
    #[serde(flatten)]
    pub tag: Tag,
    pub newsletters: Vec<Newsletter>,
}

/// Row of the newsletter/tag join used when attaching tag names to a page of newsletters.
#[derive(Debug, FromRow)]
pub struct NewsletterTagName {
    pub newsletter_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SlugQuery {
    #[validate(length(min = 1, message = "can not be empty"))]
    pub slug: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PopularTagsQuery {
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<i64>,
}
