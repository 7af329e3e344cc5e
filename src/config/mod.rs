// src/config/mod.rs
//! Process-wide configuration: LLM provider credentials and service knobs.

pub mod llm;
pub mod service;

pub use llm::{ProviderConfig, ProviderKind};
pub use service::ServiceConfig;
