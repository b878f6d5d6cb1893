use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = anyhow::Error;

    // Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown risk tolerance: {s}"))
    }
}

/// The four applicant attributes after server-side validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    pub age: i32,
    pub income: f64,
    pub dependents: i64,
    pub risk_tolerance: RiskTolerance,
}

/// A submission that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub profile: ApplicantProfile,
    pub recommendation: String,
    pub explanation: String,
}

/// A persisted submission. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub age: i32,
    pub income: f64,
    pub dependents: i64,
    pub risk_tolerance: RiskTolerance,
    pub recommendation: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn from_new(id: i64, created_at: DateTime<Utc>, new: NewSubmission) -> Self {
        Self {
            id,
            age: new.profile.age,
            income: new.profile.income,
            dependents: new.profile.dependents,
            risk_tolerance: new.profile.risk_tolerance,
            recommendation: new.recommendation,
            explanation: new.explanation,
            created_at,
        }
    }
}
