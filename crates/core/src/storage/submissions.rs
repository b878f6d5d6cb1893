use crate::config::DatabaseSettings;
use crate::domain::submission::{NewSubmission, RiskTolerance, Submission};
use crate::storage::{StorageError, SubmissionStore};
use anyhow::Context;
use chrono::{DateTime, Utc};

type SubmissionRow = (i64, i32, f64, i64, String, String, String, DateTime<Utc>);

#[derive(Debug, Clone)]
pub struct PgSubmissionStore {
    pool: sqlx::PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url())
            .await
            .with_context(|| format!("connect {} failed", settings.redacted_url()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn save(&self, new: NewSubmission) -> Result<Submission, StorageError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO submissions (age, income, dependents, risk_tolerance, recommendation, explanation) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, created_at",
        )
        .bind(new.profile.age)
        .bind(new.profile.income)
        .bind(new.profile.dependents)
        .bind(new.profile.risk_tolerance.as_str())
        .bind(&new.recommendation)
        .bind(&new.explanation)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::new("insert submissions", e))?;

        Ok(Submission::from_new(id, created_at, new))
    }

    async fn find(&self, id: i64) -> Result<Option<Submission>, StorageError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            "SELECT id, age, income, dependents, risk_tolerance, recommendation, explanation, created_at \
             FROM submissions \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::new("select submissions", e))?;

        row.map(into_submission)
            .transpose()
            .map_err(|e| StorageError::new("decode submissions", e))
    }
}

fn into_submission(row: SubmissionRow) -> anyhow::Result<Submission> {
    let (id, age, income, dependents, risk_tolerance, recommendation, explanation, created_at) = row;
    let risk_tolerance = risk_tolerance
        .parse::<RiskTolerance>()
        .with_context(|| format!("invalid risk_tolerance in DB for id={id}"))?;
    Ok(Submission {
        id,
        age,
        income,
        dependents,
        risk_tolerance,
        recommendation,
        explanation,
        created_at,
    })
}
