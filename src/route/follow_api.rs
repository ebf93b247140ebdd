use crate::errors::ApiResult;
use crate::middleware::check_access::MaybeUser;
use crate::model::bookmark::Success;
use crate::model::follow::{Follow, FollowCreated, FollowStatus, FollowTarget, IsFollowing, TargetParams};
use crate::model::user::CurrentUser;
use crate::util::extractor::{Json, Query};
use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/follow", get(is_following).post(follow).delete(unfollow))
        .route("/follow/status", get(follow_status))
}

async fn is_following(State(state): State<AppState>, user: MaybeUser, Query(params): Query<TargetParams>) -> ApiResult<Json<IsFollowing>> {
    let target = FollowTarget::try_from(params)?;
    let is_following = match user.id() {
        Some(follower_id) => Follow::is_following(&state.db, follower_id, target).await?,
        None => false,
    };
    Ok(Json(IsFollowing { is_following }))
}

async fn follow(State(state): State<AppState>, user: CurrentUser, Json(params): Json<TargetParams>) -> ApiResult<Json<FollowCreated>> {
    let target = FollowTarget::try_from(params)?;
    let follow = Follow::create(&state.db, &user.id, target).await?;
    Ok(Json(FollowCreated { success: true, follow }))
}

async fn unfollow(State(state): State<AppState>, user: CurrentUser, Json(params): Json<TargetParams>) -> ApiResult<Json<Success>> {
    let target = FollowTarget::try_from(params)?;
    Follow::delete(&state.db, &user.id, target).await?;
    Ok(Json(Success::ok()))
}

async fn follow_status(State(state): State<AppState>, user: MaybeUser, Query(params): Query<TargetParams>) -> ApiResult<Json<FollowStatus>> {
    let target = FollowTarget::try_from(params)?;
    let status = Follow::status(&state.db, user.id(), target).await?;
    Ok(Json(status))
}
