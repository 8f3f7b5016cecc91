//! Actions on the active session.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use anamnesis_core::models::image::EncodedImage;
use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::session::Session;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnswersRequest {
    pub answers: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct ImagesRequest {
    pub images: Vec<EncodedImage>,
}

pub async fn current_session(
    State(state): State<AppState>,
) -> Result<Json<Option<Session>>, ApiError> {
    let orchestrator = state.orchestrator()?;
    Ok(Json(orchestrator.session().cloned()))
}

pub async fn start(
    State(state): State<AppState>,
    Json(intake): Json<Intake>,
) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.start(intake).await?;
    Ok(Json(session.clone()))
}

pub async fn submit_answers(
    State(state): State<AppState>,
    Json(req): Json<AnswersRequest>,
) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.submit_answers(req.answers).await?;
    Ok(Json(session.clone()))
}

pub async fn submit_images(
    State(state): State<AppState>,
    Json(req): Json<ImagesRequest>,
) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.submit_images(req.images).await?;
    Ok(Json(session.clone()))
}

/// Skip images and run outcome and record generation back to back.
pub async fn skip(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.skip_supplemental_input().await?;
    Ok(Json(session.clone()))
}

pub async fn request_record(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.request_record().await?;
    Ok(Json(session.clone()))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<()>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    orchestrator.reset().await?;
    Ok(Json(()))
}
