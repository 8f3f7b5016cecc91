//! anamnesis-core
//!
//! Pure domain types, the model response schema, and storage key conventions.
//! No AWS SDK dependency; this is the shared vocabulary of the interview engine.

pub mod error;
pub mod keys;
pub mod models;
pub mod placeholder;
pub mod schema;
