#[cfg(test)]
mod tests {
    use crate::tests::common::{insert_newsletter, insert_session, insert_user, set_counts, setup_state};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use letterbox::{create_app, AppState};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("theme=dark; session_token={}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn signed_in_app(manual_calculation: bool) -> (AppState, Router) {
        let state = setup_state(manual_calculation).await;
        insert_user(&state.db, "u1", "alice").await;
        insert_session(&state.db, "tok-1", "u1").await;
        let app = create_app(state.clone());
        (state, app)
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let (state, app) = signed_in_app(false).await;
        let id = insert_newsletter(&state.db, "weekly", Utc::now().timestamp_millis()).await;

        let body = json!({ "newsletterId": id });
        let (status, body) = send(&app, json_request(Method::POST, "/api/newsletters/like", None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let body = json!({ "newsletterId": id });
        let req = json_request(Method::POST, "/api/newsletters/like", Some("expired-or-unknown"), body);
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_like_toggle_round_trip() {
        let (state, app) = signed_in_app(false).await;
        let id = insert_newsletter(&state.db, "weekly", Utc::now().timestamp_millis()).await;

        let req = json_request(Method::POST, "/api/newsletters/like", Some("tok-1"), json!({ "newsletterId": id }));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "liked": true }));

        let req = Request::builder()
            .uri(format!("/api/newsletters/like?newsletterId={}", id))
            .header(header::AUTHORIZATION, "Bearer tok-1")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, req).await;
        assert_eq!(body, json!({ "likesCount": 1, "isLiked": true }));

        let (_, body) = send(&app, get(&format!("/api/newsletters/like?newsletterId={}", id))).await;
        assert_eq!(body, json!({ "likesCount": 1, "isLiked": false }));

        let req = json_request(Method::POST, "/api/newsletters/like", Some("tok-1"), json!({ "newsletterId": id }));
        let (_, body) = send(&app, req).await;
        assert_eq!(body, json!({ "liked": false }));
    }

    #[tokio::test]
    async fn test_you_rock_limits() {
        let (state, app) = signed_in_app(false).await;
        let id = insert_newsletter(&state.db, "weekly", Utc::now().timestamp_millis()).await;

        let body = json!({ "newsletterId": id, "incrementBy": 51 });
        let (status, _) = send(&app, json_request(Method::POST, "/api/newsletters/you-rock", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({ "newsletterId": id });
        let (status, body) = send(&app, json_request(Method::POST, "/api/newsletters/you-rock", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["you_rocks_count"], 1);
    }

    #[tokio::test]
    async fn test_badge_query_validation() {
        let (_, app) = signed_in_app(false).await;

        let (status, _) = send(&app, get("/api/badges?type=BOGUS&category=DAY")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/badges?type=LIKE")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, get("/api/badges?type=LIKE&category=DAY")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_manual_calculation_is_gated() {
        let (_, app) = signed_in_app(false).await;
        let (status, body) = send(&app, json_request(Method::POST, "/api/badges/calculate", None, json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 403);

        let (state, app) = signed_in_app(true).await;
        let id = insert_newsletter(&state.db, "weekly", Utc::now().timestamp_millis()).await;
        set_counts(&state.db, id, 4, 0).await;

        let (status, body) = send(&app, get("/api/badges/calculate")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["badges"]["day"][0]["newsletter_id"], id);
        assert_eq!(body["badges"]["day"][0]["type"], "LIKE");
        assert_eq!(body["badges"]["day"][0]["rank"], "FIRST");

        let (_, body) = send(&app, get(&format!("/api/badges/newsletter/{}", id))).await;
        assert_eq!(body.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_follow_endpoints() {
        let (state, app) = signed_in_app(false).await;
        insert_user(&state.db, "u2", "bob").await;

        let body = json!({ "targetId": "u2", "targetName": "Bob" });
        let (status, _) = send(&app, json_request(Method::POST, "/api/follow", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({ "targetId": "u2" });
        let (status, body) = send(&app, json_request(Method::POST, "/api/follow", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["follow"]["following_id"], "u2");

        let (_, body) = send(&app, get("/api/follow/status?targetId=u2")).await;
        assert_eq!(body, json!({ "isFollowing": false, "followersCount": 1 }));

        let body = json!({ "targetId": "u2" });
        let (status, _) = send(&app, json_request(Method::DELETE, "/api/follow", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_found_shapes() {
        let (_, app) = signed_in_app(false).await;

        let (status, body) = send(&app, get("/api/newsletters/12345")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);

        let (status, _) = send(&app, get("/api/newsletters/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/does-not-exist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_routes() {
        let (_, app) = signed_in_app(false).await;

        let (status, _) = send(&app, get("/api/users/u1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body = json!({ "name": "A" });
        let (status, _) = send(&app, json_request(Method::PUT, "/api/users/profile", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({ "name": "Alice", "bio": "hello" });
        let (status, body) = send(&app, json_request(Method::PUT, "/api/users/profile", Some("tok-1"), body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["bio"], "hello");

        let req = Request::builder()
            .uri("/api/users/check-username?username=alice")
            .header(header::COOKIE, "session_token=tok-1")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, req).await;
        assert_eq!(body, json!({ "available": true }));

        let (_, body) = send(&app, get("/api/users/check-username?username=alice")).await;
        assert_eq!(body, json!({ "available": false }));
    }

    #[tokio::test]
    async fn test_feed_routes() {
        let (state, app) = signed_in_app(false).await;
        insert_newsletter(&state.db, "weekly", Utc::now().timestamp_millis()).await;

        let (status, _) = send(&app, get("/api/newsletters/myfeed")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/api/newsletters/myfeed?page=1&limit=12")
            .header(header::COOKIE, "session_token=tok-1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "newsletters": [], "hasMore": false }));

        let (status, body) = send(&app, get("/api/newsletters/explore?take=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["newsletters"][0]["subject"], "weekly");
        assert_eq!(body["pagination"], json!({ "total": 1, "skip": 0, "take": 5, "hasMore": false }));
    }
}
