#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_newsletter, insert_user, setup_db};
    use letterbox::model::brand::{Brand, CreateBrandRequest};
    use letterbox::model::follow::{Follow, FollowTarget};
    use letterbox::model::newsletter::{CreateNewsletterRequest, Newsletter};
    use letterbox::model::Pagination;
    use letterbox::util::retry::RetryPolicy;
    use sqlx::SqlitePool;

    async fn brand(pool: &SqlitePool, name: &str, slug: &str) -> String {
        let req = CreateBrandRequest {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            website: None,
            domain: None,
            logo: None,
        };
        Brand::create(pool, req).await.unwrap().id
    }

    async fn send_from(pool: &SqlitePool, brand_id: &str, subject: &str) -> i64 {
        let req = CreateNewsletterRequest {
            sender: "news@example.com".to_string(),
            subject: subject.to_string(),
            brand_id: Some(brand_id.to_string()),
            html_file_url: None,
            full_screenshot_url: None,
            top_screenshot_url: None,
            summary: None,
            tags: vec!["weekly".to_string()],
        };
        Newsletter::create(pool, "u1", req).await.unwrap().newsletter.id
    }

    #[tokio::test]
    async fn test_feed_lists_followed_brands_only() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let followed = brand(&db, "Morning Brew", "morning-brew").await;
        let other = brand(&db, "Other", "other").await;
        Follow::create(&db, "u1", FollowTarget::Claimed(followed.clone())).await.unwrap();

        let first = send_from(&db, &followed, "first").await;
        let second = send_from(&db, &followed, "second").await;
        let third = send_from(&db, &followed, "third").await;
        send_from(&db, &other, "elsewhere").await;

        let page = Newsletter::find_feed(&db, "u1", 1, 2).await.unwrap();
        let ids: Vec<i64> = page.newsletters.iter().map(|n| n.newsletter.id).collect();
        assert_eq!(ids, vec![third, second]);
        assert!(page.has_more);
        assert_eq!(page.newsletters[0].brand_slug, "morning-brew");

        let page = Newsletter::find_feed(&db, "u1", 2, 2).await.unwrap();
        let ids: Vec<i64> = page.newsletters.iter().map(|n| n.newsletter.id).collect();
        assert_eq!(ids, vec![first]);
        assert!(!page.has_more);

        insert_user(&db, "u2", "bob").await;
        let empty = Newsletter::find_feed(&db, "u2", 1, 12).await.unwrap();
        assert!(empty.newsletters.is_empty());
        assert!(!empty.has_more);
    }

    #[tokio::test]
    async fn test_explore_pages_newest_first() {
        let db = setup_db().await;
        let ids = [
            insert_newsletter(&db, "a", 1_000).await,
            insert_newsletter(&db, "b", 2_000).await,
            insert_newsletter(&db, "c", 3_000).await,
        ];

        let page = Pagination {
            skip: Some(0),
            take: Some(2),
        };
        let explore = Newsletter::find_explore(&db, &RetryPolicy::default(), &page).await.unwrap();
        let listed: Vec<i64> = explore.newsletters.iter().map(|n| n.newsletter.id).collect();
        assert_eq!(listed, vec![ids[2], ids[1]]);
        assert_eq!(explore.pagination.total, 3);
        assert!(explore.pagination.has_more);

        let page = Pagination {
            skip: Some(2),
            take: Some(2),
        };
        let explore = Newsletter::find_explore(&db, &RetryPolicy::default(), &page).await.unwrap();
        assert_eq!(explore.newsletters.len(), 1);
        assert!(!explore.pagination.has_more);
    }
}
