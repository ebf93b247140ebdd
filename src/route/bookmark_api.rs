use crate::errors::ApiResult;
use crate::model::bookmark::{Bookmark, BookmarkStatus, Count, Success};
use crate::model::newsletter::Newsletter;
use crate::model::user::CurrentUser;
use crate::model::Pagination;
use crate::util::extractor::{Json, Path, ValidatedQuery};
use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(get_bookmarks))
        .route(
            "/bookmarks/{newsletter_id}",
            get(get_bookmark_status).post(add_bookmark).delete(remove_bookmark),
        )
        .route("/users/{user_id}/bookmarks/count", get(count_bookmarks))
}

async fn get_bookmarks(State(state): State<AppState>, user: CurrentUser, ValidatedQuery(page): ValidatedQuery<Pagination>) -> ApiResult<Json<Vec<Newsletter>>> {
    let newsletters = Bookmark::find_newsletters(&state.db, &user.id, &page).await?;
    Ok(Json(newsletters))
}

async fn get_bookmark_status(State(state): State<AppState>, user: CurrentUser, Path(newsletter_id): Path<i64>) -> ApiResult<Json<BookmarkStatus>> {
    let is_bookmarked = Bookmark::exists(&state.db, &user.id, newsletter_id).await?;
    Ok(Json(BookmarkStatus { is_bookmarked }))
}

async fn add_bookmark(State(state): State<AppState>, user: CurrentUser, Path(newsletter_id): Path<i64>) -> ApiResult<Json<Success>> {
    Bookmark::add(&state.db, &user.id, newsletter_id).await?;
    Ok(Json(Success::ok()))
}

async fn remove_bookmark(State(state): State<AppState>, user: CurrentUser, Path(newsletter_id): Path<i64>) -> ApiResult<Json<Success>> {
    Bookmark::remove(&state.db, &user.id, newsletter_id).await?;
    Ok(Json(Success::ok()))
}

async fn count_bookmarks(State(state): State<AppState>, _user: CurrentUser, Path(user_id): Path<String>) -> ApiResult<Json<Count>> {
    let count = Bookmark::count_for_user(&state.db, &user_id).await?;
    Ok(Json(Count { count }))
}
