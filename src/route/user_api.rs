use crate::errors::{bad_request, ApiResult};
use crate::middleware::check_access::MaybeUser;
use crate::model::brand::{Brand, PopularBrand, PopularBrandsQuery};
use crate::model::user::{CurrentUser, ProfileUpdate, ProfileUpdated, PublicProfile, SocialLinksResponse, SocialLinksUpdate, User, UsernameAvailability, UsernameQuery};
use crate::service::upload_service::{may_use_as_photo, owns_upload};
use crate::util::extractor::{Json, Path, ValidatedJson, ValidatedQuery};
use crate::AppState;
use axum::extract::State;
use axum::routing::{get, put};
use axum::Router;
use tracing::error;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", put(update_profile))
        .route("/users/check-username", get(check_username))
        .route("/users/social-links", get(get_social_links).put(update_social_links))
        .route("/users/popular", get(get_popular_brands))
        .route("/users/{user_id}", get(get_profile))
}

async fn get_profile(State(state): State<AppState>, _user: CurrentUser, Path(user_id): Path<String>) -> ApiResult<Json<PublicProfile>> {
    let profile = User::find_public_profile(&state.db, &user_id).await?;
    Ok(Json(profile))
}

async fn update_profile(State(state): State<AppState>, user: CurrentUser, ValidatedJson(update): ValidatedJson<ProfileUpdate>) -> ApiResult<Json<ProfileUpdated>> {
    let photo = update.profile_photo.as_deref().map(str::trim).filter(|p| !p.is_empty());
    if photo.is_some_and(|url| !may_use_as_photo(state.store.as_ref(), &user.id, url)) {
        return Err(bad_request("Profile photo must be one of your own uploads"));
    }

    let (updated, replaced_photo) = User::update_profile(&state.db, &user.id, update).await?;

    if let Some(url) = replaced_photo.filter(|url| owns_upload(state.store.as_ref(), &user.id, url)) {
        tokio::spawn(async move {
            if let Err(e) = state.store.delete(&url).await {
                error!("Cannot delete old profile image {}: {:?}", url, e);
            }
        });
    }

    Ok(Json(ProfileUpdated { user: updated }))
}

async fn check_username(State(state): State<AppState>, user: MaybeUser, ValidatedQuery(query): ValidatedQuery<UsernameQuery>) -> ApiResult<Json<UsernameAvailability>> {
    let available = User::is_username_available(&state.db, query.username.trim(), user.id()).await?;
    Ok(Json(UsernameAvailability { available }))
}

async fn get_social_links(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<SocialLinksResponse>> {
    let social_links = User::find_social_links(&state.db, &user.id).await?.unwrap_or_default();
    Ok(Json(SocialLinksResponse { social_links }))
}

async fn update_social_links(State(state): State<AppState>, user: CurrentUser, ValidatedJson(update): ValidatedJson<SocialLinksUpdate>) -> ApiResult<Json<SocialLinksResponse>> {
    let social_links = User::save_social_links(&state.db, &user.id, update.into_links()).await?;
    Ok(Json(SocialLinksResponse { social_links }))
}

async fn get_popular_brands(State(state): State<AppState>, user: MaybeUser, ValidatedQuery(query): ValidatedQuery<PopularBrandsQuery>) -> ApiResult<Json<Vec<PopularBrand>>> {
    let brands = Brand::find_popular(&state.db, user.id(), query.limit.unwrap_or(3)).await?;
    Ok(Json(brands))
}
