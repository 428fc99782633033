//! Input Collector — holds the two text buffers and gates submission on both
//! being present.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assistant::action::Action;

/// One of the two required inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    JobPosting,
    FreelancerProfile,
}

/// Raised when one or both inputs are empty (whitespace-only counts as empty).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please provide both the Upwork Job Post and your Freelancer Profile/Summary to {}.", .action.purpose())]
pub struct ValidationError {
    pub action: Action,
    pub missing: Vec<Field>,
}

/// A validated request, ready for the Generation Client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission<'a> {
    pub action: Action,
    pub job_posting: &'a str,
    pub freelancer_profile: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputCollector {
    #[serde(default)]
    pub job_posting: String,
    #[serde(default)]
    pub freelancer_profile: String,
}

impl InputCollector {
    #[cfg(test)]
    pub fn new(job_posting: impl Into<String>, freelancer_profile: impl Into<String>) -> Self {
        Self {
            job_posting: job_posting.into(),
            freelancer_profile: freelancer_profile.into(),
        }
    }

    /// Validates both buffers for `action`. The buffers are left untouched
    /// whatever the outcome, and the submission borrows them verbatim.
    pub fn submit(&self, action: Action) -> Result<Submission<'_>, ValidationError> {
        let mut missing = Vec::new();
        if self.job_posting.trim().is_empty() {
            missing.push(Field::JobPosting);
        }
        if self.freelancer_profile.trim().is_empty() {
            missing.push(Field::FreelancerProfile);
        }

        if !missing.is_empty() {
            return Err(ValidationError { action, missing });
        }

        Ok(Submission {
            action,
            job_posting: &self.job_posting,
            freelancer_profile: &self.freelancer_profile,
        })
    }
}
