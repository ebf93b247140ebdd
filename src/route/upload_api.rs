use crate::errors::{bad_request, ApiResult};
use crate::model::upload::UploadedImage;
use crate::model::user::CurrentUser;
use crate::service::upload_service::ImageUploadService;
use crate::util::extractor::Json;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::Router;

pub fn create_routes() -> Router<AppState> {
    Router::new().route("/upload/profile-image", post(upload_profile_image))
}

async fn upload_profile_image(State(state): State<AppState>, user: CurrentUser, mut multipart: Multipart) -> ApiResult<Json<UploadedImage>> {
    let uploader = ImageUploadService::new(state.config.upload.clone(), state.store.clone());

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let image = uploader.upload_profile_image(&user.id, field).await?;
            return Ok(Json(image));
        }
    }

    Err(bad_request("No file provided"))
}
