use crate::errors::{not_found, ApiError, ApiResult};
use crate::model::user::{ProfileUpdate, PublicProfile, SocialLinks, User};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

impl User {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn find_public_profile(pool: &SqlitePool, id: &str) -> ApiResult<PublicProfile> {
        let mut profile = sqlx::query_as::<_, PublicProfile>(
            r#"
            SELECT id, name, surname, username, bio, website, location, profile_photo
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("User not found"))?;

        profile.social_links = Self::find_social_links(pool, id).await?;
        Ok(profile)
    }

    /// Applies a profile form and returns the stored user plus the photo URL it replaced.
    ///
    /// `None` fields are left alone. Blank optional fields are cleared. A
    /// username held by someone else is a conflict.
    pub async fn update_profile(
        pool: &SqlitePool,
        user_id: &str,
        update: ProfileUpdate,
    ) -> ApiResult<(User, Option<String>)> {
        let current = Self::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| not_found("User not found"))?;

        let username = update.username.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if let Some(username) = username {
            if !Self::is_username_available(pool, username, Some(user_id)).await? {
                return Err(ApiError::Conflict("Username is already taken".to_string()));
            }
        }

        let now = Utc::now().timestamp_millis();
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE users SET name = ");
        builder.push_bind(update.name.trim().to_string());
        builder.push(", updated_at = ").push_bind(now);

        for (column, value) in [
            ("surname", &update.surname),
            ("username", &update.username),
            ("bio", &update.bio),
            ("website", &update.website),
            ("location", &update.location),
        ] {
            if let Some(value) = value {
                let value = value.trim();
                builder.push(format!(", {} = ", column));
                builder.push_bind((!value.is_empty()).then(|| value.to_string()));
            }
        }

        let new_photo = update
            .profile_photo
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && Some(*p) != current.profile_photo.as_deref());
        if let Some(photo) = new_photo {
            builder.push(", profile_photo = ").push_bind(photo.to_string());
        }

        builder.push(" WHERE id = ").push_bind(user_id.to_string());
        builder.push(" RETURNING *");

        let user = builder.build_query_as::<User>().fetch_one(pool).await?;
        let replaced = new_photo.and(current.profile_photo);

        Ok((user, replaced))
    }

    /// A username is available when nobody holds it, or `current_user_id` does.
    pub async fn is_username_available(
        pool: &SqlitePool,
        username: &str,
        current_user_id: Option<&str>,
    ) -> ApiResult<bool> {
        let holder: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(match holder {
            None => true,
            Some(holder) => current_user_id == Some(holder.as_str()),
        })
    }

    pub async fn find_social_links(pool: &SqlitePool, user_id: &str) -> ApiResult<Option<SocialLinks>> {
        let links = sqlx::query_as::<_, SocialLinks>(
            r#"
            SELECT twitter, instagram, linkedin, youtube, facebook, github
            FROM social_links
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(links)
    }

    /// Replaces the user's social links. Missing links are stored as NULL.
    pub async fn save_social_links(
        pool: &SqlitePool,
        user_id: &str,
        links: SocialLinks,
    ) -> ApiResult<SocialLinks> {
        let saved = sqlx::query_as::<_, SocialLinks>(
            r#"
            INSERT INTO social_links (user_id, twitter, instagram, linkedin, youtube, facebook, github, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                twitter = excluded.twitter,
                instagram = excluded.instagram,
                linkedin = excluded.linkedin,
                youtube = excluded.youtube,
                facebook = excluded.facebook,
                github = excluded.github,
                updated_at = excluded.updated_at
            RETURNING twitter, instagram, linkedin, youtube, facebook, github
            "#,
        )
        .bind(user_id)
        .bind(&links.twitter)
        .bind(&links.instagram)
        .bind(&links.linkedin)
        .bind(&links.youtube)
        .bind(&links.facebook)
        .bind(&links.github)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }
}
