pub mod memory;
pub mod submissions;

use crate::domain::submission::{NewSubmission, Submission};
use anyhow::Context;
use std::fmt;

pub use memory::MemorySubmissionStore;
pub use submissions::PgSubmissionStore;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Any failure of the underlying store. Callers surface this as an opaque
/// internal error; the detail is for logs only.
#[derive(Debug)]
pub struct StorageError {
    pub stage: &'static str,
    pub source: anyhow::Error,
}

impl StorageError {
    pub fn new(stage: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error (stage={}): {:#}", self.stage, self.source)
    }
}

impl std::error::Error for StorageError {}

/// Append-only store of submissions.
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Writes one submission atomically and returns it with `id` and
    /// `created_at` assigned by the store.
    async fn save(&self, new: NewSubmission) -> Result<Submission, StorageError>;

    async fn find(&self, id: i64) -> Result<Option<Submission>, StorageError>;
}

/// Stands in when the database could not be reached at startup.
#[derive(Debug, Clone, Default)]
pub struct UnavailableSubmissionStore;

#[async_trait::async_trait]
impl SubmissionStore for UnavailableSubmissionStore {
    async fn save(&self, _new: NewSubmission) -> Result<Submission, StorageError> {
        Err(StorageError::new(
            "save",
            anyhow::anyhow!("database unavailable"),
        ))
    }

    async fn find(&self, _id: i64) -> Result<Option<Submission>, StorageError> {
        Err(StorageError::new(
            "find",
            anyhow::anyhow!("database unavailable"),
        ))
    }
}
