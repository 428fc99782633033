//! The six fixed actions a user can trigger from the form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One user intent. Selects exactly one instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    GenerateProposal,
    AnalyzeMatch,
    ImproveProposal,
    HighlightSellingPoints,
    IdentifyTransferableSkills,
    AssessBidSuitability,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::GenerateProposal,
        Action::AnalyzeMatch,
        Action::ImproveProposal,
        Action::HighlightSellingPoints,
        Action::IdentifyTransferableSkills,
        Action::AssessBidSuitability,
    ];

    /// URL path segment, also the file stem for template overrides.
    pub fn slug(self) -> &'static str {
        match self {
            Action::GenerateProposal => "generate-proposal",
            Action::AnalyzeMatch => "analyze-match",
            Action::ImproveProposal => "improve-proposal",
            Action::HighlightSellingPoints => "highlight-selling-points",
            Action::IdentifyTransferableSkills => "identify-transferable-skills",
            Action::AssessBidSuitability => "assess-bid-suitability",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Action::GenerateProposal => "Generate New Proposal",
            Action::AnalyzeMatch => "Analyze Proposal Match (%)",
            Action::ImproveProposal => "Improve Existing Proposal",
            Action::HighlightSellingPoints => "Highlight Key Selling Points",
            Action::IdentifyTransferableSkills => "Identify Transferable Skills",
            Action::AssessBidSuitability => "Assess Bid Suitability",
        }
    }

    /// Shown while the request is in flight.
    pub fn busy_message(self) -> &'static str {
        match self {
            Action::GenerateProposal => "Generating proposal...",
            Action::AnalyzeMatch => "Analyzing match percentage...",
            Action::ImproveProposal => "Suggesting improvements...",
            Action::HighlightSellingPoints => "Highlighting selling points...",
            Action::IdentifyTransferableSkills => "Identifying transferable skills...",
            Action::AssessBidSuitability => "Assessing bid suitability...",
        }
    }

    /// Heading for the output area once the result arrives.
    pub fn result_title(self) -> &'static str {
        match self {
            Action::GenerateProposal => "Generated Proposal",
            Action::AnalyzeMatch => "Proposal Match Analysis",
            Action::ImproveProposal => "Proposal Improvement Suggestions",
            Action::HighlightSellingPoints => "Key Selling Points",
            Action::IdentifyTransferableSkills => "Transferable Skills",
            Action::AssessBidSuitability => "Bid Suitability Assessment",
        }
    }

    /// Completes "Please provide both ... to {purpose}."
    pub fn purpose(self) -> &'static str {
        match self {
            Action::GenerateProposal => "generate a proposal",
            Action::AnalyzeMatch => "analyze the match",
            Action::ImproveProposal => "get improvement suggestions",
            Action::HighlightSellingPoints => "highlight selling points",
            Action::IdentifyTransferableSkills => "identify transferable skills",
            Action::AssessBidSuitability => "assess bid suitability",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.slug() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
