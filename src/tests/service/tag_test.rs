#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_user, setup_db};
    use letterbox::errors::ApiError;
    use letterbox::model::newsletter::{CreateNewsletterRequest, Newsletter};
    use letterbox::model::tag::Tag;
    use letterbox::model::Pagination;
    use letterbox::util::retry::RetryPolicy;

    fn request(subject: &str, tags: &[&str]) -> CreateNewsletterRequest {
        CreateNewsletterRequest {
            sender: "news@example.com".to_string(),
            subject: subject.to_string(),
            brand_id: None,
            html_file_url: None,
            full_screenshot_url: None,
            top_screenshot_url: None,
            summary: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_tag_counts_follow_attachments() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let created = Newsletter::create(&db, "u1", request("first", &["Rust", "rust", " Web Dev "]))
            .await
            .unwrap();
        assert_eq!(created.tags, vec!["Rust", "Web Dev"]);
        assert_eq!(created.newsletter.user_id.as_deref(), Some("u1"));

        Newsletter::create(&db, "u1", request("second", &["RUST"])).await.unwrap();

        let rust = Tag::find_by_slug(&db, "rust").await.unwrap();
        assert_eq!(rust.count, 2);
        assert_eq!(rust.name, "Rust");

        let web = Tag::find_by_slug(&db, "web-dev").await.unwrap();
        assert_eq!(web.count, 1);

        let rv = Tag::find_by_slug(&db, "go").await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_popular_tags_and_listing() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        for i in 0..8 {
            let tags: &[&str] = if i % 2 == 0 { &["rust", "db"] } else { &["rust"] };
            Newsletter::create(&db, "u1", request(&format!("n{}", i), tags)).await.unwrap();
        }

        let popular = Tag::find_popular(&db, &RetryPolicy::default(), 20).await.unwrap();
        let counts: Vec<(&str, i64)> = popular.iter().map(|t| (t.slug.as_str(), t.count)).collect();
        assert_eq!(counts, vec![("rust", 8), ("db", 4)]);

        let top = Tag::find_top_with_newsletters(&db, &Pagination::default()).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].tag.slug, "rust");
        assert_eq!(top[0].newsletters.len(), 6);
        assert_eq!(top[1].newsletters.len(), 4);

        let rust = Tag::find_by_slug(&db, "rust").await.unwrap();
        let page = Pagination {
            skip: None,
            take: Some(5),
        };
        let by_tag = Newsletter::find_by_tag(&db, &RetryPolicy::default(), rust.id, &page)
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 5);
        assert!(by_tag.iter().all(|n| n.tags.contains(&"rust".to_string())));
    }

    #[tokio::test]
    async fn test_newsletter_lookups() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let quiet = Newsletter::create(&db, "u1", request("quiet", &[])).await.unwrap();
        let loud = Newsletter::create(&db, "u1", request("loud", &["news"])).await.unwrap();
        let loud_id = loud.newsletter.id;
        Newsletter::add_you_rocks(&db, loud_id, 3).await.unwrap();

        let found = Newsletter::find_with_tags(&db, loud_id).await.unwrap();
        assert_eq!(found.tags, vec!["news"]);
        assert_eq!(found.newsletter.you_rocks_count, 3);

        let popular = Newsletter::find_popular(&db, &RetryPolicy::default()).await.unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, loud_id);

        let trending = Newsletter::find_trending(&db, &Pagination::default()).await.unwrap();
        let ids: Vec<i64> = trending.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![loud_id, quiet.newsletter.id]);

        let rv = Newsletter::find_with_tags(&db, 9999).await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }
}
