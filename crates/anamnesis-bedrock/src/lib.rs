//! anamnesis-bedrock
//!
//! Prompt assembly, the model gateway seam, and its Bedrock Converse
//! implementation.

pub mod client;
pub mod converse;
pub mod error;
pub mod gateway;
pub mod prompt;
