use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Ranked diagnoses, advice, and ranked specialists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StructuredOutcome {
    /// Most likely first.
    pub most_probable_diagnosis: Vec<String>,
    pub advice: String,
    /// Most relevant first.
    pub recommended_specialists: Vec<String>,
}
