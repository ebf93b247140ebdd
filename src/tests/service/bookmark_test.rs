#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_newsletter, insert_user, setup_db};
    use letterbox::errors::ApiError;
    use letterbox::model::bookmark::Bookmark;
    use letterbox::model::Pagination;
    use sqlx::SqlitePool;

    async fn bookmarks_count(pool: &SqlitePool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT bookmarks_count FROM newsletters WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bookmark_counter_follows_rows() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        let id = insert_newsletter(&db, "weekly", 1_000).await;

        assert!(Bookmark::add(&db, "u1", id).await.unwrap());
        assert!(!Bookmark::add(&db, "u1", id).await.unwrap());
        assert_eq!(bookmarks_count(&db, id).await, 1);
        assert!(Bookmark::exists(&db, "u1", id).await.unwrap());

        assert!(Bookmark::remove(&db, "u1", id).await.unwrap());
        assert!(!Bookmark::remove(&db, "u1", id).await.unwrap());
        assert_eq!(bookmarks_count(&db, id).await, 0);
        assert!(!Bookmark::exists(&db, "u1", id).await.unwrap());
    }

    #[tokio::test]
    async fn test_bookmark_unknown_newsletter() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;

        let rv = Bookmark::add(&db, "u1", 99).await;
        assert!(matches!(rv, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let db = setup_db().await;
        insert_user(&db, "u1", "alice").await;
        insert_user(&db, "u2", "bob").await;

        let first = insert_newsletter(&db, "first", 1_000).await;
        let second = insert_newsletter(&db, "second", 2_000).await;
        let third = insert_newsletter(&db, "third", 3_000).await;

        for id in [first, second, third] {
            Bookmark::add(&db, "u1", id).await.unwrap();
        }
        Bookmark::add(&db, "u2", first).await.unwrap();

        assert_eq!(Bookmark::count_for_user(&db, "u1").await.unwrap(), 3);
        assert_eq!(Bookmark::count_for_user(&db, "u2").await.unwrap(), 1);
        assert_eq!(Bookmark::count_for_user(&db, "nobody").await.unwrap(), 0);

        let page = Pagination {
            skip: Some(1),
            take: Some(1),
        };
        let listed = Bookmark::find_newsletters(&db, "u1", &page).await.unwrap();
        assert_eq!(listed.len(), 1);

        let all = Bookmark::find_newsletters(&db, "u1", &Pagination::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![third, second, first]);
        assert_eq!(all[2].bookmarks_count, 2);
    }
}
