//! Integration Tests Module
//!
//! End-to-end tests for the course assistant: the bounded tool loop against a
//! scripted model, the dispatcher with real course tools, and the assistant
//! service on top of both.

// Scripted providers, flaky stores and a sample catalog
mod mocks;

// Bounded round loop scenarios
mod orchestrator_test;

// Dispatcher with the course tools
mod dispatcher_test;
