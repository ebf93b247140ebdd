pub mod badge_api;
pub mod bookmark_api;
pub mod brand_api;
pub mod follow_api;
pub mod newsletter_api;
pub mod tag_api;
pub mod upload_api;
pub mod user_api;
