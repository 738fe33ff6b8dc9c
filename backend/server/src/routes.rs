use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::AppError,
    person::{DailySelection, GuessResult, Person, Persons},
    state::AppState,
    utils::is_authorized,
};

#[derive(Serialize)]
pub struct RoundId {
    pub id: String,
}

pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_authorized(&headers, &state.config.api_token) {
        warn!("Rejected unauthorized request to {}", request.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "Healthy")
}

pub async fn persons_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Persons>, AppError> {
    let persons = state.game.roster().await?;

    Ok(Json(Persons { persons }))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Person>, JsonRejection>,
) -> Result<Json<GuessResult>, AppError> {
    let Json(guess) = payload.map_err(|_| AppError::MalformedPayload)?;
    debug!("Received guess: {} {}", guess.firstname, guess.lastname);

    Ok(Json(state.game.evaluate_guess(&guess).await?))
}

pub async fn hint_handler(State(state): State<Arc<AppState>>) -> Result<Json<String>, AppError> {
    Ok(Json(state.game.hint().await?))
}

pub async fn yesterday_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Person>, AppError> {
    Ok(Json(state.game.yesterday().await?))
}

pub async fn round_id_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoundId>, AppError> {
    let id = state.game.current_round_id().await?;

    Ok(Json(RoundId { id }))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    state.game.select_person_of_the_day().await?;

    Ok((StatusCode::OK, "Person of the day updated successfully"))
}

pub async fn history_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailySelection>>, AppError> {
    Ok(Json(state.game.history().await?))
}

pub async fn today_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DailySelection>, AppError> {
    Ok(Json(state.game.today_selection().await?))
}
