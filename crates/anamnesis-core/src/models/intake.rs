use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Subject-provided data captured once when a session starts.
///
/// `name` stays local to the engine; prompts only ever see the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Intake {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub complaint: String,
}

impl Intake {
    /// Reject blank fields. Every field is required to start an interview.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("name", &self.name),
            ("age", &self.age),
            ("gender", &self.gender),
            ("complaint", &self.complaint),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(CoreError::MissingField(field.to_string()));
            }
        }
        Ok(())
    }
}
