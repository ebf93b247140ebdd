use crate::errors::ApiResult;
use crate::model::tag::{PopularTagsQuery, SlugQuery, Tag, TagWithNewsletters};
use crate::model::Pagination;
use crate::util::extractor::{Json, ValidatedQuery};
use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(get_tags))
        .route("/tags/by-slug", get(get_tag_by_slug))
        .route("/tags/popular", get(get_popular_tags))
}

async fn get_tags(State(state): State<AppState>, ValidatedQuery(page): ValidatedQuery<Pagination>) -> ApiResult<Json<Vec<TagWithNewsletters>>> {
    let tags = Tag::find_top_with_newsletters(&state.db, &page).await?;
    Ok(Json(tags))
}

async fn get_tag_by_slug(State(state): State<AppState>, ValidatedQuery(query): ValidatedQuery<SlugQuery>) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_by_slug(&state.db, query.slug.trim()).await?;
    Ok(Json(tag))
}

async fn get_popular_tags(State(state): State<AppState>, ValidatedQuery(query): ValidatedQuery<PopularTagsQuery>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::find_popular(&state.db, &state.config.db.retry, query.limit.unwrap_or(20)).await?;
    Ok(Json(tags))
}
