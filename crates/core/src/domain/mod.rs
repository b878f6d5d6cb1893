pub mod rules;
pub mod submission;
pub mod validation;
