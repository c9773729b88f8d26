//! Orchestrator Module
//!
//! Runs one query through the model with a bounded number of tool rounds.

pub mod prompts;
mod service;

pub use service::{
    GenerateRequest, Generation, GenerationStatus, ModelErrorPolicy, Orchestrator,
    OrchestratorConfig, OrchestratorError,
};
