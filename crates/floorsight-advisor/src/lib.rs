//! Floorsight Advisor - Two-stage apartment analysis
//!
//! Stage 1 reads the apartment's floorplan crop into a structured layout.
//! Stage 2 reads the building's site-map crop with that layout and the user's
//! question to produce a consultative answer.

pub mod models;
pub mod pipeline;
pub mod prompts;

pub use models::{PipelineSettings, StructuredLayout};
pub use pipeline::AdvisorPipeline;
pub use prompts::{PromptTemplates, STAGE_ONE_TEMPLATE, STAGE_TWO_TEMPLATE};
