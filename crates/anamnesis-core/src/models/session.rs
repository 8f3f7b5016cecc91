use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::image::EncodedImage;
use super::intake::Intake;
use super::message::Message;
use super::outcome::StructuredOutcome;
use super::question::Question;
use crate::error::CoreError;

/// An interview session: the aggregate the orchestrator owns and the
/// snapshot the session store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub id: Uuid,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
    pub status: SessionStatus,
    pub step: InterviewStep,
    /// Append-only exchange history, including the leading system prompt.
    pub history: Vec<Message>,
    #[serde(default)]
    pub current_questions: Vec<Question>,
    /// Free-text explanation that accompanied the latest model turn.
    #[serde(default)]
    pub guidance: Option<String>,
    #[serde(default)]
    pub structured_outcome: Option<StructuredOutcome>,
    #[serde(default)]
    pub final_record: Option<String>,
    pub intake: Intake,
    /// `None` until images are submitted or skipped; set at most once.
    #[serde(default)]
    pub images: Option<Vec<EncodedImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SessionFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InterviewStep {
    Initial,
    Interviewing,
    AwaitingSupplementalInput,
    GeneratingOutcome,
    OutcomeReady,
    GeneratingRecord,
    Completed,
    Failed,
}

impl InterviewStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Interviewing => "interviewing",
            Self::AwaitingSupplementalInput => "awaiting_supplemental_input",
            Self::GeneratingOutcome => "generating_outcome",
            Self::OutcomeReady => "outcome_ready",
            Self::GeneratingRecord => "generating_record",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for InterviewStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the active session entered [`InterviewStep::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
    /// The offending model output, when there is one to show.
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FailureKind {
    Gateway,
    Decode,
    SchemaViolation,
    UnexpectedType,
}

/// Partial update merged into a stored snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub step: Option<InterviewStep>,
    pub history: Option<Vec<Message>>,
    pub current_questions: Option<Vec<Question>>,
    pub guidance: Option<String>,
    pub structured_outcome: Option<StructuredOutcome>,
    pub final_record: Option<String>,
    pub images: Option<Vec<EncodedImage>>,
}

impl SessionPatch {
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Session {
    /// A fresh session in [`InterviewStep::Initial`] with empty history.
    pub fn new(intake: Intake) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            status: SessionStatus::InProgress,
            step: InterviewStep::Initial,
            history: Vec::new(),
            current_questions: Vec::new(),
            guidance: None,
            structured_outcome: None,
            final_record: None,
            intake,
            images: None,
            failure: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = jiff::Timestamp::now();
    }

    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Merge the present fields of `patch`. Timestamps are left to the caller.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(step) = patch.step {
            self.step = step;
        }
        if let Some(history) = patch.history {
            self.history = history;
        }
        if let Some(questions) = patch.current_questions {
            self.current_questions = questions;
        }
        if let Some(guidance) = patch.guidance {
            self.guidance = Some(guidance);
        }
        if let Some(outcome) = patch.structured_outcome {
            self.structured_outcome = Some(outcome);
        }
        if let Some(record) = patch.final_record {
            self.final_record = Some(record);
        }
        if let Some(images) = patch.images {
            self.images = Some(images);
        }
    }

    /// Check that the step agrees with which artifacts are present.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        let fail = |msg: &str| -> Result<(), CoreError> {
            Err(CoreError::Inconsistent(format!("{}: {msg}", self.step)))
        };

        if self.final_record.is_some() && self.structured_outcome.is_none() {
            return fail("final record present without a structured outcome");
        }

        let has_questions = !self.current_questions.is_empty();
        let has_outcome = self.structured_outcome.is_some();
        let has_record = self.final_record.is_some();

        match self.step {
            InterviewStep::Initial => {
                if has_questions || has_outcome || has_record {
                    return fail("artifacts present before the interview started");
                }
            }
            InterviewStep::Interviewing => {
                if !has_questions {
                    return fail("no current question batch");
                }
                if has_outcome {
                    return fail("structured outcome present while interviewing");
                }
            }
            InterviewStep::AwaitingSupplementalInput | InterviewStep::GeneratingOutcome => {
                if has_questions {
                    return fail("question batch still open");
                }
                if has_outcome {
                    return fail("structured outcome already present");
                }
            }
            InterviewStep::OutcomeReady | InterviewStep::GeneratingRecord => {
                if !has_outcome {
                    return fail("structured outcome missing");
                }
                if has_record {
                    return fail("final record already present");
                }
            }
            InterviewStep::Completed => {
                if !has_outcome || !has_record {
                    return fail("completed without both structured outcome and final record");
                }
            }
            InterviewStep::Failed => {
                if self.failure.is_none() {
                    return fail("failed without a recorded failure");
                }
            }
        }

        if self.status == SessionStatus::Completed && self.step != InterviewStep::Completed {
            return fail("status is completed but the interview is not");
        }

        Ok(())
    }
}
