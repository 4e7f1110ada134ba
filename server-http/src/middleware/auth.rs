use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use infocache::keys;
use infocache::store::KeyValueStore;
use tracing::error;

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// Parse the X-User-ID header value into a positive id.
fn parse_user_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Resolve the header against the store: the id must parse and
/// `user:<id>` must exist (warmed by the user sync worker after
/// registration).
async fn authorize(store: &dyn KeyValueStore, header: Option<&str>) -> Result<i64, Response> {
    let header = match header {
        Some(h) => h,
        None => {
            return Err(
                (StatusCode::UNAUTHORIZED, "X-User-ID header required").into_response(),
            )
        }
    };

    let user_id = match parse_user_id(header) {
        Some(id) => id,
        None => return Err((StatusCode::BAD_REQUEST, "Invalid X-User-ID").into_response()),
    };

    let key = keys::user(&user_id.to_string());
    match store.exists(&key).await {
        Ok(true) => Ok(user_id),
        Ok(false) => Err((StatusCode::UNAUTHORIZED, "User not registered").into_response()),
        Err(e) => {
            error!(user_id, error = %e, "store lookup failed during auth");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response())
        }
    }
}

/// Guard for the lookup endpoints: the caller must carry an X-User-ID
/// header naming a registered user.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok());

    let user_id = authorize(state.store.as_ref(), header).await?;

    // Attach the id for handlers that want it
    request.extensions_mut().insert(user_id);

    Ok(next.run(request).await)
}
