use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A batch of follow-up questions produced during the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionBatch {
    pub explanation: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    /// Unique within its batch.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// The model's signal that the interview has gathered enough information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReadinessSignal {
    pub explanation: Option<String>,
}
