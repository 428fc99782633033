// Instruction templates for the six actions, plus the labels that prefix the
// two user inputs in every request.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::assistant::action::Action;

/// Prefix of the second request segment.
pub const JOB_POSTING_LABEL: &str = "Upwork Job Post:\n";
/// Prefix of the third request segment.
pub const FREELANCER_PROFILE_LABEL: &str = "Freelancer Profile/Summary:\n";

pub const GENERATE_PROPOSAL: &str = "
You are an expert Upwork proposal writer. Your task is to craft a compelling and tailored proposal for the provided Upwork Job Post, leveraging the information from the Freelancer Profile/Summary. Focus on highlighting relevant skills, experience, and a clear call to action. Ensure the tone is professional, persuasive, and concise, typically fitting within a standard Upwork proposal length.
";

pub const ANALYZE_MATCH_PERCENTAGE: &str = r#"
You are an Upwork ATS (Applicant Tracking System) scanner. Your task is to evaluate the provided Proposal (which is generated from the Freelancer Profile/Summary) against the Upwork Job Post. Give me the percentage of match.
First, the output should come as a percentage (e.g., "75% Match").
Then, list "Keywords Missing" from the proposal that are present in the job post.
Lastly, provide "Final Thoughts" on the proposal's overall alignment and areas for quick improvement.
"#;

pub const IMPROVE_PROPOSAL: &str = "
You are a seasoned Upwork Career Coach and proposal strategist. Your task is to analyze the provided Proposal (from the Freelancer Profile/Summary) against the Upwork Job Post. Suggest specific improvements, rephrasing, or additional points the freelancer should focus on to better align with the job requirements and stand out. Highlight areas where the proposal excels and where there is room for improvement. Provide actionable advice.
";

pub const HIGHLIGHT_SELLING_POINTS: &str = "
You are a professional Upwork Profile Analyst. Your task is to extract and highlight the most significant selling points and achievements from the Freelancer Profile/Summary in the context of the Upwork Job Post. Focus on accomplishments that align strongly with the job and showcase measurable impacts relevant to the client's needs.
";

pub const IDENTIFY_TRANSFERABLE_SKILLS: &str = "
You are an Upwork Talent Scout specializing in skill identification. Your task is to identify transferable skills from the Freelancer Profile/Summary that can be applied effectively to the specified Upwork Job Post. Highlight skills that are versatile and demonstrate adaptability to the job's requirements, even if not explicitly stated in the job post.
";

pub const ASSESS_BID_SUITABILITY: &str = "
You are an experienced Upwork Business Advisor. Your task is to analyze the Freelancer Profile/Summary against the Upwork Job Post to determine the overall suitability for bidding on this project. Provide a detailed assessment of the fit, including potential challenges and advantages. Conclude with a recommendation for the bid range (e.g., 'Low', 'Medium', 'High' based on fit and complexity) and a rating out of 10 that reflects the overall fit of the freelancer for the role.
";

/// Maps every `Action` to the instruction text sent with it.
///
/// Always complete: construction paths guarantee one template per action.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<Action, String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::from_fn(|action| default_template(action).to_string())
    }
}

impl PromptTemplates {
    /// Builds a template set by asking `f` for each action's text.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Action) -> String,
    {
        Self {
            templates: Action::ALL.into_iter().map(|a| (a, f(a))).collect(),
        }
    }

    /// Loads defaults, then replaces any action that has a `<slug>.txt`
    /// file in `dir`.
    pub fn load_overrides(dir: &Path) -> Result<Self> {
        let mut templates = Self::default();

        for action in Action::ALL {
            let path = dir.join(format!("{}.txt", action.slug()));
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            if text.trim().is_empty() {
                bail!("Template override {} is empty", path.display());
            }
            info!("Using template override for {action} from {}", path.display());
            templates.templates.insert(action, text);
        }

        Ok(templates)
    }

    pub fn get(&self, action: Action) -> &str {
        self.templates
            .get(&action)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(action))
    }
}

fn default_template(action: Action) -> &'static str {
    match action {
        Action::GenerateProposal => GENERATE_PROPOSAL,
        Action::AnalyzeMatch => ANALYZE_MATCH_PERCENTAGE,
        Action::ImproveProposal => IMPROVE_PROPOSAL,
        Action::HighlightSellingPoints => HIGHLIGHT_SELLING_POINTS,
        Action::IdentifyTransferableSkills => IDENTIFY_TRANSFERABLE_SKILLS,
        Action::AssessBidSuitability => ASSESS_BID_SUITABILITY,
    }
}
