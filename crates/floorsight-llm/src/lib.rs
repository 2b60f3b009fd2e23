//! Floorsight LLM - Multimodal generation port
//!
//! This crate defines the port for multimodal text generation,
//! along with the Gemini adapter and an in-memory scripted model.

pub mod gemini;
pub mod ports;
pub mod scripted;

// Re-export main types
pub use gemini::GeminiClient;
pub use ports::{GenerationRequest, InlineImage, MultimodalModel, ResponseFormat, SamplingParams};
pub use scripted::ScriptedModel;
