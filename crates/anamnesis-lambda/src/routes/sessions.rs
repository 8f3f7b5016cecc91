//! Stored session snapshots.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use anamnesis_core::models::session::{InterviewStep, Session, SessionStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Listing entry. Full snapshots carry history and images, so the list only
/// has what a picker needs.
#[derive(Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
    pub status: SessionStatus,
    pub step: InterviewStep,
    pub complaint: String,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            updated_at: session.updated_at,
            status: session.status,
            step: session.step,
            complaint: session.intake.complaint.clone(),
        }
    }
}

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.store.list_all().await?;
    Ok(Json(sessions.iter().map(SessionSummary::from).collect()))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    state
        .store
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {id}")))
}

pub async fn load_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let mut orchestrator = state.orchestrator()?;
    let session = orchestrator.load(id).await?;
    Ok(Json(session.clone()))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    let orchestrator = state.orchestrator()?;
    orchestrator.delete_snapshot(id).await?;
    Ok(Json(()))
}
