//! anamnesis-storage
//!
//! Session snapshot persistence behind the [`SessionStore`] trait, with
//! in-memory, local-file and S3 backends.

pub mod client;
pub mod error;
pub mod file;
pub mod memory;
pub mod s3;
pub mod store;

pub use crate::error::StorageError;
pub use crate::file::FileSessionStore;
pub use crate::memory::MemorySessionStore;
pub use crate::s3::S3SessionStore;
pub use crate::store::SessionStore;
