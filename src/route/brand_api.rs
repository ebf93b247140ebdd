use crate::errors::ApiResult;
use crate::model::brand::{Brand, BrandSearchQuery, BrandWithFollowers, CreateBrandRequest};
use crate::model::newsletter::Newsletter;
use crate::model::user::CurrentUser;
use crate::model::Pagination;
use crate::util::extractor::{Json, Path, ValidatedJson, ValidatedQuery};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tracing::info;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(search_brands).post(create_brand))
        .route("/brands/{slug}", get(get_brand))
        .route("/brands/{slug}/newsletters", get(get_brand_newsletters))
}

async fn create_brand(State(state): State<AppState>, user: CurrentUser, ValidatedJson(req): ValidatedJson<CreateBrandRequest>) -> ApiResult<(StatusCode, Json<Brand>)> {
    let brand = Brand::create(&state.db, req).await?;
    info!("User {} registered brand {}", user.id, brand.slug);
    Ok((StatusCode::CREATED, Json(brand)))
}

async fn search_brands(State(state): State<AppState>, ValidatedQuery(query): ValidatedQuery<BrandSearchQuery>) -> ApiResult<Json<Vec<BrandWithFollowers>>> {
    let brands = Brand::search(&state.db, query.q.as_deref(), query.limit.unwrap_or(10), query.offset.unwrap_or(0)).await?;
    Ok(Json(brands))
}

async fn get_brand(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<BrandWithFollowers>> {
    let brand = Brand::find_by_slug(&state.db, &slug).await?;
    Ok(Json(brand))
}

async fn get_brand_newsletters(State(state): State<AppState>, Path(slug): Path<String>, ValidatedQuery(page): ValidatedQuery<Pagination>) -> ApiResult<Json<Vec<Newsletter>>> {
    let newsletters = Brand::find_newsletters(&state.db, &slug, &page).await?;
    Ok(Json(newsletters))
}
