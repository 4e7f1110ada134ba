pub mod admin;
pub mod exchange;
pub mod health;
pub mod user;
pub mod weather;

pub use admin::create_popular;
pub use exchange::get_exchange_rate;
pub use health::health_check;
pub use user::create_user;
pub use weather::get_weather;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
