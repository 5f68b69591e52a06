//! External API integrations

pub mod assistant;
pub mod inference;

pub use assistant::AssistantClient;
pub use inference::{FieldAnalyzer, InferenceClient};
