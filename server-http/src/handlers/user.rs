use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use infocache::models::UserProfile;
use serde::Serialize;
use shared::Error;
use tracing::error;

use super::{bad_request, internal_error};
use crate::middleware::auth::USER_ID_HEADER;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreateUserResponse {
    pub status: String,
}

/// POST /user
///
/// The id comes from the X-User-ID header, the profile fields from the
/// body. Registration is the one endpoint outside the auth guard.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut user): Json<UserProfile>,
) -> Result<Response, Response> {
    let header = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if header.is_empty() {
        return Err(bad_request("X-User-ID header is required"));
    }

    user.user_id = match header.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(bad_request("Invalid X-User-ID")),
    };

    match state.users.create_user(&user).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(CreateUserResponse {
                status: "ok".into(),
            }),
        )
            .into_response()),
        Err(Error::Validation(message)) => Err(bad_request(message)),
        Err(e) => {
            error!(user_id = user.user_id, error = %e, "create user failed");
            Err(internal_error("failed to create user"))
        }
    }
}
