use crate::config::rd::RedisPool;
use crate::errors::ApiError::TooManyRequests;
use crate::errors::ApiResult;
use crate::model::user::CurrentUser;
use crate::AppState;
use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use redis::ExistenceCheck::NX;
use redis::SetExpiry::EX;
use redis::SetOptions;
use tracing::warn;

/// Fixed-window rate limit on counter mutations.
///
/// Only write requests made by a signed-in user are counted, keyed by
/// user and path, so one reader hammering the like button cannot starve
/// anyone else. Reads pass through. If Redis is unavailable the request
/// is let through and the failure is logged.
pub async fn limit_request(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let limits = &state.config.rate_limit;
    if !limits.enabled || req.method() == Method::GET {
        return Ok(next.run(req).await);
    }

    let Some(user) = req.extensions().get::<CurrentUser>() else {
        return Ok(next.run(req).await);
    };

    let key = rate_key(&user.id, req.uri().path());
    match check_rate_limit(&state.rd, &key, limits.window_secs, limits.max_requests).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(TooManyRequests("Too many attempts, try again later".to_owned()));
        }
        Err(e) => warn!("Rate limit check failed, letting request through: {:#}", e),
    }

    Ok(next.run(req).await)
}

fn rate_key(user_id: &str, path: &str) -> String {
    format!("rate:{}:{}", user_id, path)
}

/// Counts one request against `key` and reports whether it is within `max_count`.
///
/// The key is created with a TTL of `expires` seconds on the first hit of a
/// window and incremented on every hit, in one atomic pipeline.
pub async fn check_rate_limit(
    pool: &RedisPool,
    key: &str,
    expires: u64,
    max_count: u64,
) -> Result<bool> {
    let mut conn = pool.get().await?;

    let rv: [u64; 1] = redis::pipe()
        .atomic()
        .set_options(
            key,
            0,
            SetOptions::default()
                .with_expiration(EX(expires))
                .conditional_set(NX),
        )
        .ignore()
        .incr(key, 1)
        .query_async(&mut *conn)
        .await
        .context("Redis Error")?;

    Ok(rv[0] <= max_count)
}
