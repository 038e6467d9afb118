//! Service layer between HTTP handlers and the model crates.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
