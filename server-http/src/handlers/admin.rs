use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use super::{bad_request, internal_error};
use crate::state::AppState;
use crate::validation::parse_command;

#[derive(Deserialize)]
pub struct CreatePopularRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct CreatePopularResponse {
    pub ok: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub args: HashMap<String, String>,
}

/// POST /admin
///
/// Seeds the request log with a free-text command (`/weather <city>`,
/// `/exchange <base> <target>`) so the popularity publisher can pick
/// it up on its next tick.
pub async fn create_popular(
    State(state): State<AppState>,
    Json(req): Json<CreatePopularRequest>,
) -> Result<Response, Response> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(bad_request("field 'text' is required"));
    }

    let request = match parse_command(text) {
        Ok(request) => request,
        Err(e) => return Err(bad_request(format!("parse error: {e}"))),
    };

    if let Err(e) = state.request_log.save(request.clone()).await {
        error!(error = %e, "failed to save seed request");
        return Err(internal_error("internal error"));
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatePopularResponse {
            ok: true,
            kind: request.kind,
            args: request.args,
        }),
    )
        .into_response())
}
