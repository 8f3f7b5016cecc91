use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};
use uuid::Uuid;

use anamnesis_bedrock::gateway::{ModelGateway, ModelRequest};
use anamnesis_bedrock::prompt::{PromptPhase, build_prompt, format_answers};
use anamnesis_core::models::image::EncodedImage;
use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::message::Message;
use anamnesis_core::models::session::{
    InterviewStep, Session, SessionPatch, SessionStatus,
};
use anamnesis_core::placeholder::substitute_name;
use anamnesis_core::schema::{ModelResponse, ResponseKind, classify};
use anamnesis_storage::SessionStore;

use crate::config::InterviewConfig;
use crate::error::InterviewError;

/// Owns the single active session and drives it through the interview.
///
/// Every action that reaches the model makes exactly one round trip (the
/// skip action makes two, strictly one after the other) and commits or fails
/// before returning. Actions take `&mut self`, so a second action cannot
/// start while one is in flight.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn SessionStore>,
    config: InterviewConfig,
    session: Option<Session>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn SessionStore>,
        config: InterviewConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
            session: None,
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current step; [`InterviewStep::Initial`] when no session is active.
    pub fn step(&self) -> InterviewStep {
        self.session
            .as_ref()
            .map_or(InterviewStep::Initial, |s| s.step)
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    /// Open a session and fetch the first question batch.
    pub async fn start(&mut self, intake: Intake) -> Result<&Session, InterviewError> {
        if let Some(active) = &self.session {
            return Err(InterviewError::RequestValidation(format!(
                "session {} is still active; reset before starting another",
                active.id
            )));
        }
        intake
            .validate()
            .map_err(|e| InterviewError::RequestValidation(e.to_string()))?;

        let mut session = Session::new(intake);
        let messages = build_prompt(
            &PromptPhase::InterviewStart {
                intake: &session.intake,
            },
            &[],
        );
        session.history.extend(messages.iter().cloned());
        info!(session_id = %session.id, "interview started");
        self.session = Some(session);

        let (response, raw) = self.exchange(messages).await?;
        match response {
            ModelResponse::QuestionBatch(batch) => {
                let session = self.active_mut()?;
                session.push_message(Message::assistant(raw));
                session.current_questions = batch.questions;
                session.guidance = Some(batch.explanation);
                set_step(session, InterviewStep::Interviewing);
            }
            other => return Err(self.reject(&[ResponseKind::QuestionBatch], &other, raw)),
        }

        self.persist().await?;
        self.active()
    }

    /// Answer the current batch, keyed by question id.
    pub async fn submit_answers(
        &mut self,
        answers: HashMap<String, String>,
    ) -> Result<&Session, InterviewError> {
        let session = self.active_mut()?;
        require_step(session, InterviewStep::Interviewing, "submit answers")?;
        if session.current_questions.is_empty() {
            return Err(InterviewError::RequestValidation(
                "there is no open question batch to answer".to_string(),
            ));
        }
        if answers.is_empty() {
            return Err(InterviewError::RequestValidation(
                "no answers were submitted".to_string(),
            ));
        }
        if let Some(unknown) = answers
            .keys()
            .find(|id| !session.current_questions.iter().any(|q| &q.id == *id))
        {
            return Err(InterviewError::RequestValidation(format!(
                "answer refers to unknown question id \"{unknown}\""
            )));
        }

        let answer_text = format_answers(&session.current_questions, &answers);
        session.push_message(Message::user(answer_text));
        let messages = build_prompt(&PromptPhase::InterviewContinuation, &session.history);
        info!(
            session_id = %session.id,
            answered = answers.len(),
            "answers submitted"
        );

        let (response, raw) = self.exchange(messages).await?;
        match response {
            ModelResponse::QuestionBatch(batch) => {
                let session = self.active_mut()?;
                session.push_message(Message::assistant(raw));
                session.current_questions = batch.questions;
                session.guidance = Some(batch.explanation);
                info!(
                    session_id = %session.id,
                    questions = session.current_questions.len(),
                    "next question batch received"
                );
            }
            ModelResponse::ReadinessSignal(signal) => {
                let session = self.active_mut()?;
                session.push_message(Message::assistant(raw));
                session.current_questions.clear();
                session.guidance = signal.explanation;
                set_step(session, InterviewStep::AwaitingSupplementalInput);
            }
            other => {
                return Err(self.reject(
                    &[ResponseKind::QuestionBatch, ResponseKind::ReadinessSignal],
                    &other,
                    raw,
                ));
            }
        }

        self.persist().await?;
        self.active()
    }

    /// Attach images (possibly none) and generate the structured outcome.
    pub async fn submit_images(
        &mut self,
        images: Vec<EncodedImage>,
    ) -> Result<&Session, InterviewError> {
        self.check_supplemental_input()?;
        validate_images(&images, self.config.max_images)?;
        self.generate_outcome(images).await?;
        self.active()
    }

    /// Skip images, then generate the outcome and the record back to back.
    pub async fn skip_supplemental_input(&mut self) -> Result<&Session, InterviewError> {
        self.check_supplemental_input()?;
        self.generate_outcome(Vec::new()).await?;
        self.generate_record().await?;
        self.active()
    }

    /// Generate the final record from the stored outcome.
    pub async fn request_record(&mut self) -> Result<&Session, InterviewError> {
        let session = self.active_mut()?;
        if session.structured_outcome.is_none() {
            return Err(InterviewError::RequestValidation(
                "a structured outcome is required before the record can be generated".to_string(),
            ));
        }
        require_step(session, InterviewStep::OutcomeReady, "request the record")?;
        self.generate_record().await?;
        self.active()
    }

    /// Discard the active session and return to [`InterviewStep::Initial`].
    ///
    /// The stored snapshot is marked completed or abandoned; it is not deleted.
    pub async fn reset(&mut self) -> Result<(), InterviewError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let status = if session.step == InterviewStep::Completed {
            SessionStatus::Completed
        } else {
            SessionStatus::Abandoned
        };
        info!(
            session_id = %session.id,
            step = %session.step,
            status = ?status,
            "session reset"
        );
        self.store
            .update(session.id, SessionPatch::status(status))
            .await?;
        Ok(())
    }

    /// Make a stored snapshot the active session.
    pub async fn load(&mut self, id: Uuid) -> Result<&Session, InterviewError> {
        if let Some(active) = &self.session {
            return Err(InterviewError::RequestValidation(format!(
                "session {} is still active; reset before loading another",
                active.id
            )));
        }

        let mut session = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(InterviewError::SessionNotFound(id))?;

        if matches!(
            session.step,
            InterviewStep::Initial
                | InterviewStep::GeneratingOutcome
                | InterviewStep::GeneratingRecord
                | InterviewStep::Failed
        ) {
            return Err(InterviewError::RequestValidation(format!(
                "stored session {id} is in transient step {}",
                session.step
            )));
        }
        session.check_consistency().map_err(|e| {
            InterviewError::RequestValidation(format!("stored session {id} is unusable: {e}"))
        })?;

        if session.step != InterviewStep::Completed {
            session.status = SessionStatus::InProgress;
        }
        session.failure = None;
        info!(session_id = %id, step = %session.step, "session loaded");
        self.session = Some(session);
        self.active()
    }

    /// Delete a stored snapshot. The active session, if any, is unaffected.
    pub async fn delete_snapshot(&self, id: Uuid) -> Result<(), InterviewError> {
        self.store.delete(id).await?;
        info!(session_id = %id, "session snapshot deleted");
        Ok(())
    }

    pub async fn list_snapshots(&self) -> Result<Vec<Session>, InterviewError> {
        Ok(self.store.list_all().await?)
    }

    // ── Phases ───────────────────────────────────────────────────────────────

    fn check_supplemental_input(&mut self) -> Result<(), InterviewError> {
        let session = self.active_mut()?;
        require_step(
            session,
            InterviewStep::AwaitingSupplementalInput,
            "provide supplemental input",
        )?;
        if session.images.is_some() {
            return Err(InterviewError::RequestValidation(
                "images were already submitted for this session".to_string(),
            ));
        }
        Ok(())
    }

    async fn generate_outcome(&mut self, images: Vec<EncodedImage>) -> Result<(), InterviewError> {
        let session = self.active_mut()?;
        info!(
            session_id = %session.id,
            images = images.len(),
            "supplemental input received"
        );
        session.images = Some(images);
        set_step(session, InterviewStep::GeneratingOutcome);

        let messages = build_prompt(
            &PromptPhase::OutcomeGeneration {
                images: session.images.as_deref().unwrap_or_default(),
            },
            &session.history,
        );

        let (response, raw) = self.exchange(messages).await?;
        match response {
            ModelResponse::StructuredOutcome(outcome) => {
                let session = self.active_mut()?;
                session.push_message(Message::assistant(raw));
                session.structured_outcome = Some(outcome);
                set_step(session, InterviewStep::OutcomeReady);
            }
            other => return Err(self.reject(&[ResponseKind::StructuredOutcome], &other, raw)),
        }

        self.persist().await
    }

    async fn generate_record(&mut self) -> Result<(), InterviewError> {
        let session = self.active_mut()?;
        let Some(outcome) = session.structured_outcome.as_ref() else {
            return Err(InterviewError::RequestValidation(
                "a structured outcome is required before the record can be generated".to_string(),
            ));
        };
        let messages = build_prompt(
            &PromptPhase::RecordGeneration {
                intake: &session.intake,
                outcome,
                images: session.images.as_deref().unwrap_or_default(),
            },
            &session.history,
        );
        set_step(session, InterviewStep::GeneratingRecord);

        let (response, raw) = self.exchange(messages).await?;
        match response {
            ModelResponse::FinalRecord(record) => {
                let session = self.active_mut()?;
                session.push_message(Message::assistant(raw));
                session.final_record = Some(substitute_name(&record, &session.intake.name));
                session.status = SessionStatus::Completed;
                set_step(session, InterviewStep::Completed);
            }
            other => return Err(self.reject(&[ResponseKind::FinalRecord], &other, raw)),
        }

        self.persist().await
    }

    // ── Round trip ───────────────────────────────────────────────────────────

    /// Send one request and classify the reply.
    ///
    /// Gateway failures and schema violations fail the session here. The
    /// caller matches the variant it expects and calls [`Self::reject`] for
    /// anything else. Returns the response and its compact JSON text.
    async fn exchange(
        &mut self,
        messages: Vec<Message>,
    ) -> Result<(ModelResponse, String), InterviewError> {
        let request = ModelRequest {
            messages,
            json_output: self.config.json_output,
        };

        let result = self.gateway.complete(request).await;
        let value = match result {
            Ok(value) => value,
            Err(e) => return Err(self.fail(e.into())),
        };

        let raw = value.to_string();
        match classify(&value) {
            ModelResponse::Invalid { reason } => Err(self.fail(InterviewError::SchemaViolation {
                reason,
                payload: raw,
            })),
            response => Ok((response, raw)),
        }
    }

    /// A valid response of the wrong kind for this transition.
    fn reject(
        &mut self,
        expected: &[ResponseKind],
        found: &ModelResponse,
        payload: String,
    ) -> InterviewError {
        self.fail(InterviewError::UnexpectedType {
            expected: expected.to_vec(),
            found: found.kind(),
            payload,
        })
    }

    /// Move the active session to `Failed`. Failed state is never persisted.
    fn fail(&mut self, err: InterviewError) -> InterviewError {
        if let Some(session) = self.session.as_mut() {
            warn!(
                session_id = %session.id,
                step = %session.step,
                error = %err,
                "transition failed"
            );
            session.failure = err.to_failure();
            set_step(session, InterviewStep::Failed);
        }
        err
    }

    async fn persist(&mut self) -> Result<(), InterviewError> {
        let session = self.active_mut()?;
        session.touch();
        let snapshot = session.clone();
        self.store.save(&snapshot).await?;
        Ok(())
    }

    fn active(&self) -> Result<&Session, InterviewError> {
        self.session
            .as_ref()
            .ok_or_else(|| InterviewError::RequestValidation("no active session".to_string()))
    }

    fn active_mut(&mut self) -> Result<&mut Session, InterviewError> {
        self.session
            .as_mut()
            .ok_or_else(|| InterviewError::RequestValidation("no active session".to_string()))
    }
}

fn require_step(
    session: &Session,
    expected: InterviewStep,
    action: &str,
) -> Result<(), InterviewError> {
    if session.step == expected {
        Ok(())
    } else {
        Err(InterviewError::RequestValidation(format!(
            "cannot {action} while the session is {}",
            session.step
        )))
    }
}

fn set_step(session: &mut Session, to: InterviewStep) {
    info!(
        session_id = %session.id,
        from = %session.step,
        to = %to,
        "step transition"
    );
    session.step = to;
}

fn validate_images(images: &[EncodedImage], max_images: usize) -> Result<(), InterviewError> {
    if images.len() > max_images {
        return Err(InterviewError::RequestValidation(format!(
            "{} images submitted, at most {max_images} allowed",
            images.len()
        )));
    }
    for (index, image) in images.iter().enumerate() {
        if image.data.trim().is_empty() {
            return Err(InterviewError::RequestValidation(format!(
                "image {index} has no data"
            )));
        }
        if STANDARD.decode(&image.data).is_err() {
            return Err(InterviewError::RequestValidation(format!(
                "image {index} is not valid base64"
            )));
        }
    }
    Ok(())
}
