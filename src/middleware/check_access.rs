use crate::errors::{unauthorized, ApiError, ApiResult};
use crate::model::user::CurrentUser;
use crate::service::auth_service::AuthService;
use crate::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

/// Resolves the session token sent with the request, if any.
///
/// The token is read from the session cookie or a `Bearer` authorization
/// header and looked up in the `sessions` table. A valid session puts a
/// [`CurrentUser`] into the request extensions. Requests without one pass
/// through unchanged; handlers decide whether a user is required by taking
/// `CurrentUser` or `MaybeUser`.
pub async fn check_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = get_cookie(&request, &state.config.auth.session_cookie).or(extract_bearer(&request));

    if let Some(token) = token {
        match AuthService::find_session_user(&state.db, &token).await? {
            Some(user) => {
                request.extensions_mut().insert(user);
            }
            None => debug!("Ignoring unknown or expired session token"),
        }
    }

    Ok(next.run(request).await)
}

// Helper function to extract Bearer token from Authorization header
fn extract_bearer(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    (!token.is_empty()).then(|| token.to_string())
}

// Helper function to get a cookie by name from the request
fn get_cookie(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|s| {
            let (cookie_name, cookie_value) = s.trim().split_once('=')?;
            (cookie_name == name).then(|| cookie_value.to_string())
        })
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}

/// The signed-in user when there is one. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
