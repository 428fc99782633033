//! Generation Client — turns two inputs and an instruction template into one
//! outbound call and hands back the service's text untouched.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assistant::action::Action;
use crate::assistant::collector::Submission;
use crate::assistant::prompts::{PromptTemplates, FREELANCER_PROFILE_LABEL, JOB_POSTING_LABEL};
use crate::llm_client::{LlmError, TextGenerator, MODEL};

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing or rejected API credential.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service failed, timed out, or returned nothing usable.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        if err.is_credential_error() {
            GenerationError::Configuration(err.to_string())
        } else {
            GenerationError::Upstream(err.to_string())
        }
    }
}

/// Builds the three ordered request segments:
/// instruction, labeled job posting, labeled freelancer profile.
pub fn build_segments(
    job_posting: &str,
    freelancer_profile: &str,
    instruction_template: &str,
) -> Vec<String> {
    vec![
        instruction_template.to_string(),
        format!("{JOB_POSTING_LABEL}{job_posting}"),
        format!("{FREELANCER_PROFILE_LABEL}{freelancer_profile}"),
    ]
}

/// Holds the outbound service and the action → template mapping.
#[derive(Clone)]
pub struct GenerationClient {
    service: Arc<dyn TextGenerator>,
    templates: PromptTemplates,
}

impl GenerationClient {
    pub fn new(service: Arc<dyn TextGenerator>, templates: PromptTemplates) -> Self {
        Self { service, templates }
    }

    /// Issues exactly one call with the given template. Errors are not retried.
    pub async fn generate(
        &self,
        job_posting: &str,
        freelancer_profile: &str,
        instruction_template: &str,
    ) -> Result<String, GenerationError> {
        let segments = build_segments(job_posting, freelancer_profile, instruction_template);
        debug!(
            "Sending {} segments to {MODEL} (job_posting={} bytes, profile={} bytes)",
            segments.len(),
            job_posting.len(),
            freelancer_profile.len()
        );

        self.service
            .generate_content(MODEL, &segments)
            .await
            .map_err(|e| {
                warn!("Generation failed: {e}");
                GenerationError::from(e)
            })
    }

    /// Runs a validated submission with the template bound to its action.
    pub async fn run(&self, submission: &Submission<'_>) -> Result<String, GenerationError> {
        let action: Action = submission.action;
        info!("Running action {action}");
        let text = self
            .generate(
                submission.job_posting,
                submission.freelancer_profile,
                self.templates.get(action),
            )
            .await?;
        info!("Action {action} completed ({} bytes)", text.len());
        Ok(text)
    }
}
