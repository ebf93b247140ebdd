use crate::model::validator::{
    validate_github, validate_instagram, validate_photo_url, validate_twitter, validate_url_or_empty,
    validate_username,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: String,
    pub profile_photo: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The signed-in user, resolved from the session token on each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub github: Option<String>,
}

/// What other signed-in users may see of a profile. Email stays private.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    #[sqlx(skip)]
    pub social_links: Option<SocialLinks>,
}

/// Profile form. Fields left out keep their stored value, an empty string clears them.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub surname: Option<String>,
    #[validate(
        length(min = 3, max = 30, message = "must be between 3 and 30 characters"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub website: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_photo_url"))]
    pub profile_photo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub user: User,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SocialLinksUpdate {
    #[validate(custom(function = "validate_twitter"))]
    pub twitter: Option<String>,
    #[validate(custom(function = "validate_instagram"))]
    pub instagram: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub linkedin: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub youtube: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub facebook: Option<String>,
    #[validate(custom(function = "validate_github"))]
    pub github: Option<String>,
}

impl SocialLinksUpdate {
    /// Empty strings become NULL.
    pub fn into_links(self) -> SocialLinks {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        SocialLinks {
            twitter: clean(self.twitter),
            instagram: clean(self.instagram),
            linkedin: clean(self.linkedin),
            youtube: clean(self.youtube),
            facebook: clean(self.facebook),
            github: clean(self.github),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksResponse {
    pub social_links: SocialLinks,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UsernameQuery {
    #[validate(length(min = 1, message = "Username parameter is required"))]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub available: bool,
}
