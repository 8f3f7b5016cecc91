//! anamnesis-interview
//!
//! The session orchestrator: a state machine that sequences the interview,
//! one model round trip per action.
//!
//! Public API:
//! - `Orchestrator::start()`: open a session from intake data
//! - `Orchestrator::submit_answers()`: answer the current question batch
//! - `Orchestrator::submit_images()`: attach images and generate the outcome
//! - `Orchestrator::skip_supplemental_input()`: outcome then record, no images
//! - `Orchestrator::request_record()`: generate the final record
//! - `Orchestrator::reset()` / `Orchestrator::load()`: leave or resume a session

pub mod config;
pub mod error;
pub mod orchestrator;

pub use crate::config::InterviewConfig;
pub use crate::error::InterviewError;
pub use crate::orchestrator::Orchestrator;
