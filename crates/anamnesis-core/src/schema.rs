//! Response schema for model output.
//!
//! The model is asked for a single JSON object in one of four shapes. This
//! module classifies a decoded value into exactly one of them, or into
//! [`ModelResponse::Invalid`]. Rules run in a fixed order and each one
//! requires an exact key set, so no object can satisfy two rules and nothing
//! is accepted on a partial match.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::message::{Message, Role};
use crate::models::outcome::StructuredOutcome;
use crate::models::question::{Question, QuestionBatch, ReadinessSignal};

/// Key names of the wire contract.
pub mod key {
    pub const READY_FOR_RECORD: &str = "readyForRecord";
    pub const EXPLANATION: &str = "explanation";
    pub const QUESTIONS: &str = "questions";
    pub const MOST_PROBABLE_DIAGNOSIS: &str = "mostProbableDiagnosis";
    pub const ADVICE: &str = "advice";
    pub const RECOMMENDED_SPECIALISTS: &str = "recommendedSpecialists";
    pub const MEDICAL_RECORD: &str = "medicalRecord";
    pub const QUESTION_ID: &str = "id";
    pub const QUESTION_TEXT: &str = "text";
    pub const SUGGESTIONS: &str = "suggestions";
}

/// A classified model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResponse {
    QuestionBatch(QuestionBatch),
    ReadinessSignal(ReadinessSignal),
    StructuredOutcome(StructuredOutcome),
    FinalRecord(String),
    Invalid { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    QuestionBatch,
    ReadinessSignal,
    StructuredOutcome,
    FinalRecord,
    Invalid,
}

impl ModelResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::QuestionBatch(_) => ResponseKind::QuestionBatch,
            Self::ReadinessSignal(_) => ResponseKind::ReadinessSignal,
            Self::StructuredOutcome(_) => ResponseKind::StructuredOutcome,
            Self::FinalRecord(_) => ResponseKind::FinalRecord,
            Self::Invalid { .. } => ResponseKind::Invalid,
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QuestionBatch => "question batch",
            Self::ReadinessSignal => "readiness signal",
            Self::StructuredOutcome => "structured outcome",
            Self::FinalRecord => "final record",
            Self::Invalid => "invalid response",
        };
        f.write_str(name)
    }
}

/// The key set an object must have for a rule to apply.
struct Shape {
    required: &'static [&'static str],
    optional: &'static [&'static str],
}

impl Shape {
    fn applies(&self, obj: &Map<String, Value>) -> bool {
        self.required.iter().all(|k| obj.contains_key(*k))
            && obj
                .keys()
                .all(|k| self.required.contains(&k.as_str()) || self.optional.contains(&k.as_str()))
    }
}

const READINESS: Shape = Shape {
    required: &[key::READY_FOR_RECORD],
    optional: &[key::EXPLANATION],
};

const OUTCOME: Shape = Shape {
    required: &[
        key::MOST_PROBABLE_DIAGNOSIS,
        key::ADVICE,
        key::RECOMMENDED_SPECIALISTS,
    ],
    optional: &[],
};

const RECORD: Shape = Shape {
    required: &[key::MEDICAL_RECORD],
    optional: &[],
};

const QUESTION_BATCH: Shape = Shape {
    required: &[key::EXPLANATION, key::QUESTIONS],
    optional: &[],
};

const QUESTION_ITEM: Shape = Shape {
    required: &[key::QUESTION_ID, key::QUESTION_TEXT],
    optional: &[key::SUGGESTIONS],
};

/// Outcome of a single rule.
enum Rule<T> {
    NotApplicable,
    Matched(T),
    Malformed(String),
}

/// Classify a decoded JSON value. Pure and deterministic.
pub fn classify(value: &Value) -> ModelResponse {
    let Some(obj) = value.as_object() else {
        return ModelResponse::Invalid {
            reason: format!("expected a JSON object, found {}", type_name(value)),
        };
    };

    let mut malformed = None;

    if let Some(signal) = settle(readiness_rule(obj), &mut malformed) {
        return ModelResponse::ReadinessSignal(signal);
    }
    if let Some(outcome) = settle(outcome_rule(obj), &mut malformed) {
        return ModelResponse::StructuredOutcome(outcome);
    }
    if let Some(record) = settle(record_rule(obj), &mut malformed) {
        return ModelResponse::FinalRecord(record);
    }
    if let Some(batch) = settle(question_batch_rule(obj), &mut malformed) {
        return ModelResponse::QuestionBatch(batch);
    }

    let detail = malformed.unwrap_or_else(|| "matched no known response shape".to_string());
    ModelResponse::Invalid {
        reason: format!("{detail}; found keys: [{}]", found_keys(obj)),
    }
}

/// Whether `message` is an earlier structured outcome echoed into history.
///
/// Only the key set is checked. Content that does not decode is not a match.
pub fn is_structured_outcome_message(message: &Message) -> bool {
    if message.role != Role::Assistant {
        return false;
    }
    match serde_json::from_str::<Value>(&message.text()) {
        Ok(Value::Object(obj)) => OUTCOME.applies(&obj),
        _ => false,
    }
}

fn settle<T>(rule: Rule<T>, malformed: &mut Option<String>) -> Option<T> {
    match rule {
        Rule::Matched(value) => Some(value),
        Rule::Malformed(reason) => {
            malformed.get_or_insert(reason);
            None
        }
        Rule::NotApplicable => None,
    }
}

fn readiness_rule(obj: &Map<String, Value>) -> Rule<ReadinessSignal> {
    if !READINESS.applies(obj) {
        return Rule::NotApplicable;
    }
    if obj.get(key::READY_FOR_RECORD) != Some(&Value::Bool(true)) {
        return Rule::Malformed(format!("{} must be true", key::READY_FOR_RECORD));
    }
    let explanation = match obj.get(key::EXPLANATION) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Rule::Malformed(format!("{} must be a string", key::EXPLANATION)),
    };
    Rule::Matched(ReadinessSignal { explanation })
}

fn outcome_rule(obj: &Map<String, Value>) -> Rule<StructuredOutcome> {
    if !OUTCOME.applies(obj) {
        return Rule::NotApplicable;
    }
    let diagnoses = match string_array(obj, key::MOST_PROBABLE_DIAGNOSIS) {
        Ok(v) => v,
        Err(reason) => return Rule::Malformed(reason),
    };
    let advice = match string_field(obj, key::ADVICE) {
        Ok(v) => v,
        Err(reason) => return Rule::Malformed(reason),
    };
    let specialists = match string_array(obj, key::RECOMMENDED_SPECIALISTS) {
        Ok(v) => v,
        Err(reason) => return Rule::Malformed(reason),
    };
    Rule::Matched(StructuredOutcome {
        most_probable_diagnosis: diagnoses,
        advice,
        recommended_specialists: specialists,
    })
}

fn record_rule(obj: &Map<String, Value>) -> Rule<String> {
    if !RECORD.applies(obj) {
        return Rule::NotApplicable;
    }
    match string_field(obj, key::MEDICAL_RECORD) {
        Ok(record) => Rule::Matched(record),
        Err(reason) => Rule::Malformed(reason),
    }
}

fn question_batch_rule(obj: &Map<String, Value>) -> Rule<QuestionBatch> {
    if !QUESTION_BATCH.applies(obj) {
        return Rule::NotApplicable;
    }
    let explanation = match string_field(obj, key::EXPLANATION) {
        Ok(v) => v,
        Err(reason) => return Rule::Malformed(reason),
    };
    let Some(Value::Array(items)) = obj.get(key::QUESTIONS) else {
        return Rule::Malformed(format!("{} must be an array", key::QUESTIONS));
    };
    if items.is_empty() {
        return Rule::Malformed(format!("{} must not be empty", key::QUESTIONS));
    }

    let mut questions = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let question = match question_item(item) {
            Ok(q) => q,
            Err(reason) => {
                return Rule::Malformed(format!("{}[{index}]: {reason}", key::QUESTIONS));
            }
        };
        if !seen.insert(question.id.clone()) {
            return Rule::Malformed(format!(
                "{}[{index}]: duplicate question id \"{}\"",
                key::QUESTIONS,
                question.id
            ));
        }
        questions.push(question);
    }

    Rule::Matched(QuestionBatch {
        explanation,
        questions,
    })
}

fn question_item(item: &Value) -> Result<Question, String> {
    let Some(obj) = item.as_object() else {
        return Err(format!("expected an object, found {}", type_name(item)));
    };
    if !QUESTION_ITEM.applies(obj) {
        return Err(format!(
            "expected keys id, text and optional suggestions; found keys: [{}]",
            found_keys(obj)
        ));
    }
    let id = string_field(obj, key::QUESTION_ID)?;
    let text = string_field(obj, key::QUESTION_TEXT)?;
    let suggestions = if obj.contains_key(key::SUGGESTIONS) {
        string_array(obj, key::SUGGESTIONS)?
    } else {
        Vec::new()
    };
    Ok(Question {
        id,
        text,
        suggestions,
    })
}

fn string_field(obj: &Map<String, Value>, name: &str) -> Result<String, String> {
    match obj.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("{name} must be a string, found {}", type_name(other))),
        None => Err(format!("{name} is missing")),
    }
}

fn string_array(obj: &Map<String, Value>, name: &str) -> Result<Vec<String>, String> {
    let Some(Value::Array(items)) = obj.get(name) else {
        return Err(format!("{name} must be an array of strings"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(format!("{name}[{i}] must be a string, found {}", type_name(other))),
        })
        .collect()
}

fn found_keys(obj: &Map<String, Value>) -> String {
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(", ")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
