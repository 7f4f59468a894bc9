//! Farmhand assistant core: conversational tool routing, response
//! validation, speech augmentation and the sibling diagnosis and advisory
//! flows, on top of an injected model backend.

pub mod advisory;
pub mod backend;
pub mod chat;
pub mod config;
pub mod data_uri;
pub mod diagnosis;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod router;
pub mod schema;
pub mod speech;
pub mod tools;
pub mod validate;

pub use backend::{ModelBackend, ModelRequest};
pub use chat::FarmhandAgent;
pub use error::{ModelError, SpeechError, ToolError, TurnError};
pub use speech::SpeechSynthesizer;
pub use tools::ToolRegistry;
