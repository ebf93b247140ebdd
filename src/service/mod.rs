pub mod auth_service;
pub mod badge_service;
pub mod bookmark_service;
pub mod brand_service;
pub mod follow_service;
pub mod like_service;
pub mod newsletter_service;
pub mod tag_service;
pub mod task_service;
pub mod upload_service;
pub mod user_service;
