//! # Validation
//!
//! Declarative checks run before every Create and Update, simulated or not.
//!
//! Checks never stop at the first problem: every violation is recorded as a
//! [`CheckFailure`] and all of them are reported together.

mod rules;

pub use rules::{is_aws_region, is_cognito_user_pool_id, is_uuid};

use serde::{Deserialize, Serialize};

/// One (field, reason) validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub property: String,
    pub reason: String,
}

impl CheckFailure {
    pub fn new(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.property, self.reason)
    }
}

/// Accumulates failures across one check pass
#[derive(Debug, Default)]
pub struct Failures(Vec<CheckFailure>);

impl Failures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: &str, reason: impl Into<String>) {
        self.0.push(CheckFailure::new(property, reason));
    }

    /// Field must be present and not blank
    pub fn require(&mut self, property: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(property, format!("{property} is required"));
        }
    }

    /// Optional field, when set, must be one of `allowed`
    pub fn one_of(&mut self, property: &str, value: Option<&str>, allowed: &[&str]) {
        if let Some(value) = value {
            if !allowed.contains(&value) {
                self.push(property, format!("must be one of: {}", allowed.join(", ")));
            }
        }
    }

    /// Every element of a list must be non-blank
    pub fn no_blank_entries(&mut self, property: &str, values: &[String]) {
        for (index, value) in values.iter().enumerate() {
            if value.trim().is_empty() {
                self.push(&format!("{property}[{index}]"), "must not be empty");
            }
        }
    }

    /// Optional value, when non-empty, must be a UUID
    pub fn uuid(&mut self, property: &str, value: &str) {
        if !value.is_empty() && !is_uuid(value) {
            self.push(property, "must be a valid UUID");
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<CheckFailure> {
        self.0
    }
}

/// Result of a Check pass: inputs with defaults applied plus every failure
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResponse<I> {
    pub inputs: I,
    pub failures: Vec<CheckFailure>,
}

impl<I> CheckResponse<I> {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render failures as one line, `a: x; b: y`
#[must_use]
pub fn join_failures(failures: &[CheckFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
