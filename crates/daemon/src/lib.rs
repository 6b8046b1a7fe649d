pub mod api;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod media;
pub mod orchestrator;
pub mod reasoning;
pub mod settings;
pub mod video;
