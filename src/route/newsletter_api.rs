use crate::errors::ApiResult;
use crate::middleware::check_access::MaybeUser;
use crate::model::newsletter::{ByTagQuery, CreateNewsletterRequest, ExplorePage, FeedPage, FeedQuery, LikeRequest, LikeStatus, LikeToggled, Newsletter, NewsletterIdQuery, NewsletterWithTags, YouRockCount, YouRockRequest};
use crate::model::user::CurrentUser;
use crate::model::Pagination;
use crate::util::extractor::{Json, Path, Query, ValidatedJson, ValidatedQuery};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/newsletters", post(create_newsletter))
        .route("/newsletters/like", get(get_like_status).post(toggle_like))
        .route("/newsletters/you-rock", get(get_you_rocks).post(add_you_rocks))
        .route("/newsletters/popular", get(get_popular))
        .route("/newsletters/trending", get(get_trending))
        .route("/newsletters/by-tag", get(get_by_tag))
        .route("/newsletters/explore", get(get_explore))
        .route("/newsletters/myfeed", get(get_my_feed))
        .route("/newsletters/{id}", get(get_newsletter))
}

async fn create_newsletter(State(state): State<AppState>, user: CurrentUser, ValidatedJson(req): ValidatedJson<CreateNewsletterRequest>) -> ApiResult<(StatusCode, Json<NewsletterWithTags>)> {
    let newsletter = Newsletter::create(&state.db, &user.id, req).await?;
    Ok((StatusCode::CREATED, Json(newsletter)))
}

async fn get_newsletter(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<NewsletterWithTags>> {
    let newsletter = Newsletter::find_with_tags(&state.db, id).await?;
    Ok(Json(newsletter))
}

async fn get_like_status(State(state): State<AppState>, user: MaybeUser, Query(query): Query<NewsletterIdQuery>) -> ApiResult<Json<LikeStatus>> {
    let status = Newsletter::like_status(&state.db, user.id(), query.newsletter_id).await?;
    Ok(Json(status))
}

async fn toggle_like(State(state): State<AppState>, user: CurrentUser, Json(req): Json<LikeRequest>) -> ApiResult<Json<LikeToggled>> {
    let toggled = Newsletter::toggle_like(&state.db, &user.id, req.newsletter_id).await?;
    Ok(Json(toggled))
}

async fn get_you_rocks(State(state): State<AppState>, Query(query): Query<NewsletterIdQuery>) -> ApiResult<Json<YouRockCount>> {
    let count = Newsletter::you_rocks(&state.db, query.newsletter_id).await?;
    Ok(Json(count))
}

async fn add_you_rocks(State(state): State<AppState>, _user: CurrentUser, Json(req): Json<YouRockRequest>) -> ApiResult<Json<YouRockCount>> {
    let count = Newsletter::add_you_rocks(&state.db, req.newsletter_id, req.increment_by).await?;
    Ok(Json(count))
}

async fn get_popular(State(state): State<AppState>) -> ApiResult<Json<Vec<Newsletter>>> {
    let newsletters = Newsletter::find_popular(&state.db, &state.config.db.retry).await?;
    Ok(Json(newsletters))
}

async fn get_trending(State(state): State<AppState>, ValidatedQuery(page): ValidatedQuery<Pagination>) -> ApiResult<Json<Vec<Newsletter>>> {
    let newsletters = Newsletter::find_trending(&state.db, &page).await?;
    Ok(Json(newsletters))
}

async fn get_by_tag(State(state): State<AppState>, ValidatedQuery(query): ValidatedQuery<ByTagQuery>) -> ApiResult<Json<Vec<NewsletterWithTags>>> {
    let newsletters = Newsletter::find_by_tag(&state.db, &state.config.db.retry, query.tag_id, &query.page()).await?;
    Ok(Json(newsletters))
}

async fn get_explore(State(state): State<AppState>, ValidatedQuery(page): ValidatedQuery<Pagination>) -> ApiResult<Json<ExplorePage>> {
    let explore = Newsletter::find_explore(&state.db, &state.config.db.retry, &page).await?;
    Ok(Json(explore))
}

async fn get_my_feed(State(state): State<AppState>, user: CurrentUser, ValidatedQuery(query): ValidatedQuery<FeedQuery>) -> ApiResult<Json<FeedPage>> {
    let feed = Newsletter::find_feed(&state.db, &user.id, query.page.unwrap_or(1), query.limit.unwrap_or(12)).await?;
    Ok(Json(feed))
}
