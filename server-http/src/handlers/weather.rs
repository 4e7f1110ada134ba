use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use infocache::models::Weather;
use serde::Deserialize;
use tracing::{error, info};

use super::{bad_request, internal_error};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    city: String,
}

/// GET /weather?city=
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Weather>, Response> {
    let city = query.city.trim();
    if city.is_empty() {
        return Err(bad_request("query parameter 'city' is required"));
    }

    info!(%city, "GET /weather");

    match state.weather.get(&[city]).await {
        Ok(weather) => Ok(Json(weather)),
        Err(e) => {
            error!(%city, error = %e, "weather lookup failed");
            Err(internal_error("failed to fetch weather"))
        }
    }
}
