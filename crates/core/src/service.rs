use crate::domain::rules;
use crate::domain::submission::NewSubmission;
use crate::domain::validation::{self, ValidationError};
use crate::storage::{StorageError, SubmissionStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
    pub explanation: String,
}

#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Storage(StorageError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Validate, evaluate, persist. The response is only produced after the
/// submission has been written.
pub async fn create_recommendation(
    store: &dyn SubmissionStore,
    payload: &Value,
) -> Result<RecommendationResponse, ServiceError> {
    let profile = validation::validate(payload)?;
    let outcome = rules::recommend(&profile);

    let saved = store
        .save(NewSubmission {
            profile,
            recommendation: outcome.recommendation,
            explanation: outcome.explanation,
        })
        .await?;

    tracing::info!(
        submission_id = saved.id,
        policy = %outcome.policy.policy_type,
        total_coverage = outcome.coverage.total,
        "persisted submission"
    );

    Ok(RecommendationResponse {
        recommendation: saved.recommendation,
        explanation: saved.explanation,
    })
}
