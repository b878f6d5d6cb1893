//! Server-side validation of recommendation requests.
//!
//! This is the authoritative copy. The bundled client page carries its own
//! advisory checks; rejections from here are what callers can rely on.

use crate::domain::submission::{ApplicantProfile, RiskTolerance};
use serde_json::{Map, Value};
use std::fmt;

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 100;

// Largest integer an IEEE double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const FIELDS: [&str; 4] = ["age", "income", "dependents", "riskTolerance"];

/// Every violated field, one message each, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

pub fn validate(payload: &Value) -> Result<ApplicantProfile, ValidationError> {
    let Some(obj) = payload.as_object() else {
        return Err(ValidationError::new(vec![
            "Request body must be a JSON object".to_string(),
        ]));
    };

    let mut messages = Vec::new();

    let age = collect(&mut messages, check_age(obj.get("age")));
    let income = collect(&mut messages, check_income(obj.get("income")));
    let dependents = collect(&mut messages, check_dependents(obj.get("dependents")));
    let risk_tolerance = collect(
        &mut messages,
        check_risk_tolerance(obj.get("riskTolerance")),
    );

    messages.extend(unknown_keys(obj).map(|k| format!("\"{k}\" is not allowed")));

    match (age, income, dependents, risk_tolerance) {
        (Some(age), Some(income), Some(dependents), Some(risk_tolerance)) if messages.is_empty() => {
            Ok(ApplicantProfile {
                age,
                income,
                dependents,
                risk_tolerance,
            })
        }
        _ => Err(ValidationError::new(messages)),
    }
}

fn collect<T>(messages: &mut Vec<String>, checked: Result<T, String>) -> Option<T> {
    match checked {
        Ok(v) => Some(v),
        Err(msg) => {
            messages.push(msg);
            None
        }
    }
}

fn unknown_keys(obj: &Map<String, Value>) -> impl Iterator<Item = &String> {
    obj.keys().filter(|k| !FIELDS.contains(&k.as_str()))
}

/// JSON numbers and numeric strings both count as numbers.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn require_number(value: Option<&Value>, label: &str) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("{label} is required"))?;
    as_number(value).ok_or_else(|| format!("{label} must be a number"))
}

fn check_age(value: Option<&Value>) -> Result<i32, String> {
    let n = require_number(value, "Age")?;
    if n.fract() != 0.0 {
        return Err("Age must be an integer".to_string());
    }
    if n < f64::from(MIN_AGE) {
        return Err(format!("Age must be at least {MIN_AGE}"));
    }
    if n > f64::from(MAX_AGE) {
        return Err(format!("Age must be at most {MAX_AGE}"));
    }
    Ok(n as i32)
}

fn check_income(value: Option<&Value>) -> Result<f64, String> {
    let n = require_number(value, "Income")?;
    if n.abs() > MAX_SAFE_INTEGER {
        return Err("Income must be a safe number".to_string());
    }
    if n < 0.0 {
        return Err("Income cannot be negative".to_string());
    }
    // Normalizes -0.0 so it never renders as "-0.00".
    Ok(n + 0.0)
}

fn check_dependents(value: Option<&Value>) -> Result<i64, String> {
    let n = require_number(value, "Dependents")?;
    if n.fract() != 0.0 {
        return Err("Dependents must be an integer".to_string());
    }
    if n.abs() > MAX_SAFE_INTEGER {
        return Err("Dependents must be a safe number".to_string());
    }
    if n < 0.0 {
        return Err("Dependents cannot be negative".to_string());
    }
    Ok(n as i64)
}

fn check_risk_tolerance(value: Option<&Value>) -> Result<RiskTolerance, String> {
    let value = value.ok_or_else(|| "Risk tolerance is required".to_string())?;
    let s = value
        .as_str()
        .ok_or_else(|| "Risk tolerance must be a string".to_string())?;
    s.parse::<RiskTolerance>()
        .map_err(|_| "Risk tolerance must be one of Low, Medium, or High".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(payload: Value) -> Vec<String> {
        validate(&payload).unwrap_err().into_messages()
    }

    #[test]
    fn accepts_valid_payload_unchanged() {
        let p = validate(&json!({
            "age": 25,
            "income": 50000.5,
            "dependents": 2,
            "riskTolerance": "Medium",
        }))
        .unwrap();
        assert_eq!(
            p,
            ApplicantProfile {
                age: 25,
                income: 50000.5,
                dependents: 2,
                risk_tolerance: RiskTolerance::Medium,
            }
        );
    }

    #[test]
    fn accepts_inclusive_age_bounds_and_zeroes() {
        for age in [18, 40, 60, 100] {
            let p = validate(&json!({
                "age": age,
                "income": 0,
                "dependents": 0,
                "riskTolerance": "Low",
            }))
            .unwrap();
            assert_eq!(p.age, age);
        }
    }

    #[test]
    fn rejects_out_of_range_age() {
        let base = |age: i64| json!({"age": age, "income": 1, "dependents": 0, "riskTolerance": "Low"});
        assert_eq!(messages(base(17)), vec!["Age must be at least 18"]);
        assert_eq!(messages(base(101)), vec!["Age must be at most 100"]);
    }

    #[test]
    fn rejects_negative_dependents_and_unknown_risk() {
        let msgs = messages(json!({
            "age": 30,
            "income": 1,
            "dependents": -1,
            "riskTolerance": "Extreme",
        }));
        assert_eq!(
            msgs,
            vec![
                "Dependents cannot be negative",
                "Risk tolerance must be one of Low, Medium, or High",
            ]
        );
    }

    #[test]
    fn reports_every_violated_field() {
        assert_eq!(
            messages(json!({})),
            vec![
                "Age is required",
                "Income is required",
                "Dependents is required",
                "Risk tolerance is required",
            ]
        );
    }

    #[test]
    fn type_errors_are_field_specific() {
        let msgs = messages(json!({
            "age": "abc",
            "income": null,
            "dependents": 1.5,
            "riskTolerance": 3,
        }));
        assert_eq!(
            msgs,
            vec![
                "Age must be a number",
                "Income must be a number",
                "Dependents must be an integer",
                "Risk tolerance must be a string",
            ]
        );
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let p = validate(&json!({
            "age": "45",
            "income": " 1200.25 ",
            "dependents": "3",
            "riskTolerance": "High",
        }))
        .unwrap();
        assert_eq!((p.age, p.income, p.dependents), (45, 1200.25, 3));
    }

    #[test]
    fn rejects_fractional_age_and_negative_income() {
        let msgs = messages(json!({
            "age": 30.5,
            "income": -0.01,
            "dependents": 0,
            "riskTolerance": "Low",
        }));
        assert_eq!(msgs, vec!["Age must be an integer", "Income cannot be negative"]);
    }

    #[test]
    fn rejects_incomes_beyond_safe_range() {
        let base = |income: f64| {
            json!({"age": 30, "income": income, "dependents": 0, "riskTolerance": "High"})
        };
        assert_eq!(messages(base(1e308)), vec!["Income must be a safe number"]);
        assert_eq!(messages(base(9_007_199_254_740_993.0)), vec!["Income must be a safe number"]);

        let p = validate(&base(9_007_199_254_740_991.0)).unwrap();
        let r = crate::domain::rules::recommend(&p);
        assert!(r.coverage.total.is_finite());
        assert!(!r.recommendation.contains("inf"));
    }

    #[test]
    fn rejects_unknown_keys_and_non_objects() {
        let msgs = messages(json!({
            "age": 30,
            "income": 1,
            "dependents": 0,
            "riskTolerance": "Low",
            "smoker": true,
        }));
        assert_eq!(msgs, vec!["\"smoker\" is not allowed"]);

        assert_eq!(
            messages(json!([1, 2])),
            vec!["Request body must be a JSON object"]
        );
    }

    #[test]
    fn risk_tolerance_is_case_sensitive() {
        let msgs = messages(json!({
            "age": 30,
            "income": 1,
            "dependents": 0,
            "riskTolerance": "medium",
        }));
        assert_eq!(msgs, vec!["Risk tolerance must be one of Low, Medium, or High"]);
    }
}
