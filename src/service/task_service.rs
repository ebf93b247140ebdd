use crate::model::badge::{Badge, BadgeCategory};
use crate::service::auth_service::AuthService;
use crate::AppState;
use chrono::{DateTime, Datelike, Duration, Utc};
use std::error::Error;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

// Each window is ranked a minute before it closes.
const DAILY: &str = "0 59 23 * * *";
const WEEKLY: &str = "0 59 23 * * Thu";
const MONTH_END: &str = "0 59 23 28-31 * *";
const SESSION_CLEANUP: &str = "0 30 3 * * *";

pub async fn start_jobs(state: AppState) -> Result<(), Box<dyn Error + Send + Sync>> {
    let sched = JobScheduler::new().await?;

    if state.config.badge.scheduler_enabled {
        for (schedule, category) in [
            (DAILY, BadgeCategory::Day),
            (WEEKLY, BadgeCategory::Week),
            (MONTH_END, BadgeCategory::Month),
        ] {
            sched.add(badge_job(state.clone(), schedule, category)?).await?;
        }
        info!("Badge scheduler started");
    }

    let db = state.db.pool.clone();
    let clear_sessions = Job::new_async_tz(SESSION_CLEANUP, Utc, move |_uuid, _l| {
        let db = db.clone();

        Box::pin(async move {
            match AuthService::delete_expired_sessions(&db, Utc::now().timestamp_millis()).await {
                Ok(n) if n > 0 => info!("[Daily] Deleted {} expired sessions", n),
                Ok(_) => {}
                Err(e) => error!("[Daily] Cannot delete expired sessions: {}", e),
            }
        })
    })?;
    sched.add(clear_sessions).await?;

    sched.start().await?;
    Ok(())
}

fn badge_job(
    state: AppState,
    schedule: &str,
    category: BadgeCategory,
) -> Result<Job, Box<dyn Error + Send + Sync>> {
    let job = Job::new_async_tz(schedule, Utc, move |_uuid, _l| {
        let db = state.db.pool.clone();

        Box::pin(async move {
            let now = Utc::now();
            if category == BadgeCategory::Month && !is_last_day_of_month(now) {
                return;
            }

            info!("[Badges] Calculating {} badges...", category);
            if let Err(e) = Badge::calculate_and_award(&db, category, now).await {
                error!("[Badges] Cannot calculate {} badges: {}", category, e);
            }
        })
    })?;

    Ok(job)
}

fn is_last_day_of_month(now: DateTime<Utc>) -> bool {
    (now + Duration::days(1)).month() != now.month()
}
