use crate::domain::submission::{NewSubmission, Submission};
use crate::storage::{StorageError, SubmissionStore};
use std::sync::{Arc, Mutex};

/// Process-local store. Ids start at 1.
#[derive(Debug, Clone, Default)]
pub struct MemorySubmissionStore {
    rows: Arc<Mutex<Vec<Submission>>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        // Rows are only ever appended, so a poisoned lock still holds every saved row.
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn save(&self, new: NewSubmission) -> Result<Submission, StorageError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StorageError::new("save", anyhow::anyhow!("memory store poisoned")))?;
        let id = rows.last().map_or(1, |s| s.id + 1);
        let submission = Submission::from_new(id, chrono::Utc::now(), new);
        rows.push(submission.clone());
        Ok(submission)
    }

    async fn find(&self, id: i64) -> Result<Option<Submission>, StorageError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| StorageError::new("find", anyhow::anyhow!("memory store poisoned")))?;
        Ok(rows.iter().find(|s| s.id == id).cloned())
    }
}
