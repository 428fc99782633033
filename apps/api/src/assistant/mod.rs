// Proposal assistant: input collection, template selection, and generation.
// All LLM calls go through llm_client, never directly from here.

pub mod action;
pub mod collector;
pub mod generator;
pub mod handlers;
pub mod prompts;
