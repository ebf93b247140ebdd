use sqlx::{Connection, SqlitePool};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff for read queries that may hit a dropped connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Errors worth another attempt: the connection or pool failed, or SQLite
/// reported the database as busy/locked.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("5") | Some("6")),
        _ => false,
    }
}

/// Runs `operation`, retrying transient failures according to `policy`.
///
/// Between attempts it sleeps with exponential backoff, then checks out and
/// pings a fresh pooled connection so a broken one is evicted before the
/// next try. The last error is returned once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_transient(&err) => {
                let delay = policy.delay_for(attempt);
                warn!("Attempt {} failed, retrying in {:?}: {}", attempt, delay, err);
                tokio::time::sleep(delay).await;
                reconnect(pool).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn reconnect(pool: &SqlitePool) {
    match pool.acquire().await {
        Ok(mut conn) => {
            if let Err(e) = conn.ping().await {
                debug!("Ping after retry failed: {}", e);
            }
        }
        Err(e) => debug!("Cannot acquire connection after retry: {}", e),
    }
}
