//! Story Wizard — collects story elements step by step and asks an LLM for a
//! children's story.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod wizard;
