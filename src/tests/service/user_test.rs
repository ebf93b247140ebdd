#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_user, setup_db};
    use letterbox::errors::ApiError;
    use letterbox::model::user::{ProfileUpdate, SocialLinksUpdate, User};

    fn update(name: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            surname: None,
            username: None,
            bio: None,
            website: None,
            location: None,
            profile_photo: None,
        }
    }

    #[tokio::test]
    async fn test_partial_profile_update() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let mut first = update("Alice");
        first.bio = Some("Reads everything".into());
        first.location = Some("Lisbon".into());
        let (user, replaced) = User::update_profile(&db, "u1", first).await.unwrap();
        assert_eq!(user.bio.as_deref(), Some("Reads everything"));
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(replaced, None);

        // Left out: kept. Blank: cleared.
        let mut second = update("Alice");
        second.location = Some(String::new());
        let (user, _) = User::update_profile(&db, "u1", second).await.unwrap();
        assert_eq!(user.bio.as_deref(), Some("Reads everything"));
        assert_eq!(user.location, None);
    }

    #[tokio::test]
    async fn test_username_conflict() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        let mut taken = update("Alice");
        taken.username = Some("bob".into());
        let rv = User::update_profile(&db, "u1", taken).await;
        assert!(matches!(rv, Err(ApiError::Conflict(_))));

        let mut own = update("Alice");
        own.username = Some("alice".into());
        assert!(User::update_profile(&db, "u1", own).await.is_ok());

        assert!(User::is_username_available(&db, "alice", Some("u1")).await.unwrap());
        assert!(!User::is_username_available(&db, "alice", Some("u2")).await.unwrap());
        assert!(!User::is_username_available(&db, "alice", None).await.unwrap());
        assert!(User::is_username_available(&db, "carol", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_replacing_photo_reports_old_url() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let mut first = update("Alice");
        first.profile_photo = Some("http://localhost/uploads/public/u1/a.png".into());
        let (_, replaced) = User::update_profile(&db, "u1", first).await.unwrap();
        assert_eq!(replaced, None);

        let mut same = update("Alice");
        same.profile_photo = Some("http://localhost/uploads/public/u1/a.png".into());
        let (_, replaced) = User::update_profile(&db, "u1", same).await.unwrap();
        assert_eq!(replaced, None);

        let mut second = update("Alice");
        second.profile_photo = Some("http://localhost/uploads/public/u1/b.png".into());
        let (user, replaced) = User::update_profile(&db, "u1", second).await.unwrap();
        assert_eq!(user.profile_photo.as_deref(), Some("http://localhost/uploads/public/u1/b.png"));
        assert_eq!(replaced.as_deref(), Some("http://localhost/uploads/public/u1/a.png"));
    }

    #[tokio::test]
    async fn test_social_links_replace() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        assert!(User::find_social_links(&db, "u1").await.unwrap().is_none());

        let links: SocialLinksUpdate =
            serde_json::from_str(r#"{"twitter": "alice", "github": "alice-dev"}"#).unwrap();
        let saved = User::save_social_links(&db, "u1", links.into_links()).await.unwrap();
        assert_eq!(saved.twitter.as_deref(), Some("alice"));

        let links: SocialLinksUpdate =
            serde_json::from_str(r#"{"twitter": "", "instagram": "alice.reads"}"#).unwrap();
        let saved = User::save_social_links(&db, "u1", links.into_links()).await.unwrap();
        assert_eq!(saved.twitter, None);
        assert_eq!(saved.github, None);
        assert_eq!(saved.instagram.as_deref(), Some("alice.reads"));

        let profile = User::find_public_profile(&db, "u1").await.unwrap();
        let links = profile.social_links.unwrap();
        assert_eq!(links.instagram.as_deref(), Some("alice.reads"));

        let rv = User::find_public_profile(&db, "ghost").await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }
}
