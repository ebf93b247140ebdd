#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_user, setup_db};
    use letterbox::errors::ApiError;
    use letterbox::model::brand::{Brand, CreateBrandRequest};
    use letterbox::model::follow::{Follow, FollowTarget};

    fn brand_request(name: &str, slug: &str) -> CreateBrandRequest {
        CreateBrandRequest {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            website: None,
            domain: None,
            logo: None,
        }
    }

    #[tokio::test]
    async fn test_follow_user_and_status() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        let target = FollowTarget::Claimed("u2".to_string());
        let follow = Follow::create(&db, "u1", target.clone()).await.unwrap();
        assert_eq!(follow.following_id.as_deref(), Some("u2"));
        assert_eq!(follow.following_name, None);

        let status = Follow::status(&db, Some("u1"), target.clone()).await.unwrap();
        assert!(status.is_following);
        assert_eq!(status.followers_count, 1);

        let anonymous = Follow::status(&db, None, target.clone()).await.unwrap();
        assert!(!anonymous.is_following);
        assert_eq!(anonymous.followers_count, 1);

        let rv = Follow::create(&db, "u1", target.clone()).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(_))));

        Follow::delete(&db, "u1", target.clone()).await.unwrap();
        let rv = Follow::delete(&db, "u1", target).await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_rejects_self_and_unknown_targets() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let rv = Follow::create(&db, "u1", FollowTarget::Claimed("u1".into())).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(_))));

        let rv = Follow::create(&db, "u1", FollowTarget::Claimed("ghost".into())).await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rows_hold_exactly_one_target() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let follow = Follow::create(&db, "u1", FollowTarget::Unclaimed("Morning Brew".into()))
            .await
            .unwrap();
        assert_eq!(follow.following_id, None);
        assert_eq!(follow.following_name.as_deref(), Some("Morning Brew"));

        let both = sqlx::query(
            "INSERT INTO follows (follower_id, following_id, following_name, created_at) VALUES ('u1', 'x', 'y', 0)",
        )
        .execute(&*db)
        .await;
        assert!(both.is_err());

        let neither = sqlx::query(
            "INSERT INTO follows (follower_id, following_id, following_name, created_at) VALUES ('u1', NULL, NULL, 0)",
        )
        .execute(&*db)
        .await;
        assert!(neither.is_err());
    }

    #[tokio::test]
    async fn test_brand_claims_name_follows() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        Follow::create(&db, "u1", FollowTarget::Unclaimed("Morning Brew".into())).await.unwrap();
        Follow::create(&db, "u2", FollowTarget::Unclaimed("morning brew".into())).await.unwrap();

        let brand = Brand::create(&db, brand_request("Morning Brew", "morning-brew")).await.unwrap();
        assert!(brand.is_claimed);

        let unclaimed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_name IS NOT NULL")
                .fetch_one(&*db)
                .await
                .unwrap();
        assert_eq!(unclaimed, 0);

        let found = Brand::find_by_slug(&db, "morning-brew").await.unwrap();
        assert_eq!(found.followers_count, 2);

        // Following by name now lands on the brand id.
        let target = FollowTarget::Unclaimed("MORNING BREW".into());
        assert!(Follow::is_following(&db, "u1", target.clone()).await.unwrap());
        let rv = Follow::create(&db, "u1", target).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_brand_conflicts() {
        let db = setup_db().await;

        let mut req = brand_request("Acme", "acme");
        req.domain = Some("acme.com".into());
        Brand::create(&db, req).await.unwrap();

        let rv = Brand::create(&db, brand_request("Acme Two", "acme")).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(ref m)) if m.contains("URL")));

        let mut req = brand_request("Acme Two", "acme-two");
        req.domain = Some("acme.com".into());
        let rv = Brand::create(&db, req).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(ref m)) if m.contains("domain")));

        let rv = Brand::find_by_slug(&db, "nope").await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_popular_brands_skip_followed() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        let big = Brand::create(&db, brand_request("Big", "big")).await.unwrap();
        let small = Brand::create(&db, brand_request("Small", "small")).await.unwrap();

        Follow::create(&db, "u1", FollowTarget::Claimed(big.id.clone())).await.unwrap();
        Follow::create(&db, "u2", FollowTarget::Claimed(big.id.clone())).await.unwrap();

        let anonymous = Brand::find_popular(&db, None, 3).await.unwrap();
        let slugs: Vec<&str> = anonymous.iter().map(|b| b.slug.as_str()).collect();
        assert_eq!(slugs, vec!["big", "small"]);
        assert_eq!(anonymous[0].followers_count, 2);

        let for_u1 = Brand::find_popular(&db, Some("u1"), 3).await.unwrap();
        assert_eq!(for_u1.len(), 1);
        assert_eq!(for_u1[0].id, small.id);
    }

    #[tokio::test]
    async fn test_name_follows_ignore_case() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        Follow::create(&db, "u1", FollowTarget::Unclaimed("Morning Brew".into())).await.unwrap();
        let rv = Follow::create(&db, "u1", FollowTarget::Unclaimed("morning brew".into())).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(ref m)) if m == "Already following"));

        Follow::create(&db, "u2", FollowTarget::Unclaimed("MORNING BREW".into())).await.unwrap();

        let status = Follow::status(&db, Some("u1"), FollowTarget::Unclaimed("morning BREW".into()))
            .await
            .unwrap();
        assert!(status.is_following);
        assert_eq!(status.followers_count, 2);

        Follow::delete(&db, "u2", FollowTarget::Unclaimed("Morning brew".into())).await.unwrap();

        let brand = Brand::create(&db, brand_request("Morning Brew", "morning-brew")).await.unwrap();
        let found = Brand::find_by_slug(&db, "morning-brew").await.unwrap();
        assert_eq!(found.followers_count, 1);
        assert!(Follow::is_following(&db, "u1", FollowTarget::Claimed(brand.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_is_already_following() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        // Row written by a request that won the race.
        sqlx::query(
            "INSERT INTO follows (follower_id, following_id, following_name, created_at) VALUES ('u1', 'u2', NULL, 0)",
        )
        .execute(&*db)
        .await
        .unwrap();

        let rv = Follow::create(&db, "u1", FollowTarget::Claimed("u2".into())).await;
        assert!(matches!(rv, Err(ApiError::BadRequest(ref m)) if m == "Already following"));
    }
}
