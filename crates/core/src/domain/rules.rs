use crate::domain::submission::{ApplicantProfile, RiskTolerance};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const INCOME_MULTIPLE: f64 = 10.0;
pub const COVERAGE_PER_DEPENDENT: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyType {
    #[serde(rename = "Term Life")]
    TermLife,
    #[serde(rename = "Whole Life")]
    WholeLife,
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TermLife => "Term Life",
            Self::WholeLife => "Whole Life",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_type: PolicyType,
    /// Years of cover. `None` for whole life.
    pub term_years: Option<u32>,
}

impl Policy {
    /// Brackets are half-open: 40 and 60 belong to the older bracket.
    pub fn for_age(age: i32) -> Self {
        match age {
            a if a < 40 => Self {
                policy_type: PolicyType::TermLife,
                term_years: Some(30),
            },
            a if a < 60 => Self {
                policy_type: PolicyType::TermLife,
                term_years: Some(20),
            },
            _ => Self {
                policy_type: PolicyType::WholeLife,
                term_years: None,
            },
        }
    }
}

impl RiskTolerance {
    pub fn coverage_multiplier(&self) -> f64 {
        match self {
            Self::High => 1.2,
            Self::Medium => 1.0,
            Self::Low => 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub base: f64,
    pub adjusted_base: f64,
    pub additional: f64,
    pub total: f64,
}

impl Coverage {
    pub fn compute(profile: &ApplicantProfile) -> Self {
        let base = INCOME_MULTIPLE * profile.income;
        let adjusted_base = base * profile.risk_tolerance.coverage_multiplier();
        let additional = profile.dependents as f64 * COVERAGE_PER_DEPENDENT;
        Self {
            base,
            adjusted_base,
            additional,
            total: adjusted_base + additional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub policy: Policy,
    pub coverage: Coverage,
    pub recommendation: String,
    pub explanation: String,
}

/// Pure: identical profiles always produce identical recommendations.
pub fn recommend(profile: &ApplicantProfile) -> Recommendation {
    let policy = Policy::for_age(profile.age);
    let coverage = Coverage::compute(profile);

    Recommendation {
        policy,
        coverage,
        recommendation: recommendation_text(&policy, &coverage),
        explanation: explanation_text(profile),
    }
}

fn recommendation_text(policy: &Policy, coverage: &Coverage) -> String {
    let amount = format_currency(coverage.total);
    match policy.term_years {
        Some(term) => format!("{} – {amount} for {term} years", policy.policy_type),
        None => format!("{} – {amount}", policy.policy_type),
    }
}

fn explanation_text(profile: &ApplicantProfile) -> String {
    format!(
        "Based on your age ({}), income ({}), number of dependents ({}), and risk tolerance ({}), \
         we recommend this policy to ensure your family's financial security.",
        profile.age,
        format_currency(profile.income),
        profile.dependents,
        profile.risk_tolerance,
    )
}

/// Two fractional digits, halves rounded away from zero.
///
/// `{:.2}` rounds exact binary ties (x.125, x.375, ...) to even, so those are
/// rounded in integer cents instead. A tie at the third decimal is always an
/// odd multiple of 1/8, which keeps the arithmetic exact.
pub fn format_currency(amount: f64) -> String {
    let eighths = amount * 8.0;
    if eighths.fract() == 0.0 && eighths.abs() < MAX_EXACT_EIGHTHS {
        let n = eighths as i64;
        if n % 2 != 0 {
            let cents = (n * 25 + n.signum()) / 2;
            let sign = if cents < 0 { "-" } else { "" };
            let abs = cents.unsigned_abs();
            return format!("${sign}{}.{:02}", abs / 100, abs % 100);
        }
    }
    format!("${amount:.2}")
}

// 2^53: odd integers are not representable above this.
const MAX_EXACT_EIGHTHS: f64 = 9_007_199_254_740_992.0;
