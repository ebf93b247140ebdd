use crate::errors::{ApiError, ApiResult};
use crate::model::badge::{Badge, BadgeCategory, BadgeQuery, BadgeWithNewsletter, CalculateResponse, CalculatedBadges};
use crate::util::extractor::{Json, Path, Query};
use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use tracing::info;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/badges", get(get_badges))
        .route("/badges/calculate", get(calculate_badges).post(calculate_badges))
        .route("/badges/newsletter/{id}", get(get_newsletter_badges))
}

async fn get_badges(State(state): State<AppState>, Query(query): Query<BadgeQuery>) -> ApiResult<Json<Vec<BadgeWithNewsletter>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let badges = Badge::top_badges(&state.db, query.badge_type, query.category, limit).await?;
    Ok(Json(badges))
}

async fn get_newsletter_badges(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Vec<Badge>>> {
    let badges = Badge::find_by_newsletter(&state.db, id).await?;
    Ok(Json(badges))
}

// Recomputes every category now. Forbidden unless manual calculation is enabled.
async fn calculate_badges(State(state): State<AppState>) -> ApiResult<Json<CalculateResponse>> {
    if !state.config.badge.manual_calculation {
        return Err(ApiError::Forbidden("Badge calculation is disabled".to_string()));
    }

    info!("[Badges] Manual calculation requested");

    let mut badges = CalculatedBadges {
        day: vec![],
        week: vec![],
        month: vec![],
    };
    let mut failed = vec![];

    for (category, rv) in Badge::calculate_all(&state.db, Utc::now()).await {
        match (category, rv) {
            (BadgeCategory::Day, Ok(awarded)) => badges.day = awarded,
            (BadgeCategory::Week, Ok(awarded)) => badges.week = awarded,
            (BadgeCategory::Month, Ok(awarded)) => badges.month = awarded,
            (category, Err(_)) => failed.push(category),
        }
    }

    Ok(Json(CalculateResponse {
        success: failed.is_empty(),
        badges,
        failed,
    }))
}
