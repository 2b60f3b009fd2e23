use serde::{Deserialize, Serialize};
use std::fmt;

/// Override value that selects the configured default prompt template
pub const DEFAULT_SENTINEL: &str = "default";

/// Prefix of rendered apartment labels
const APARTMENT_PREFIX: &str = "CH";

/// Render an apartment label: the fixed prefix plus the number zero-padded to two digits
pub fn apartment_label(apartment_number: u32) -> String {
    format!("{}{:02}", APARTMENT_PREFIX, apartment_number)
}

/// The two sequential model calls of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Floorplan crop -> structured layout JSON
    StageOne,
    /// Site-map crop + layout + query -> consultative answer
    StageTwo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::StageOne => write!(f, "stage 1"),
            Stage::StageTwo => write!(f, "stage 2"),
        }
    }
}

/// Per-request prompt template override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOverride<'a>(pub &'a str);

impl<'a> PromptOverride<'a> {
    /// The override text, or `default` when the override is the sentinel
    pub fn resolve(&self, default: &'a str) -> &'a str {
        if self.0 == DEFAULT_SENTINEL {
            default
        } else {
            self.0
        }
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SENTINEL
    }
}

fn default_prompt() -> String {
    DEFAULT_SENTINEL.to_string()
}

/// One analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Stage-1 template override, or the sentinel
    #[serde(default = "default_prompt")]
    pub prompt_1: String,

    /// Stage-2 template override, or the sentinel
    #[serde(default = "default_prompt")]
    pub prompt_2: String,

    /// Building code as printed on the site map (e.g. `S6.06`)
    pub building_code: String,

    pub apartment_number: u32,

    pub floor_number: i32,

    /// Free-text user question
    pub query: String,
}

impl AnalysisRequest {
    /// Create a request that uses both default templates
    pub fn new(
        building_code: impl Into<String>,
        apartment_number: u32,
        floor_number: i32,
        query: impl Into<String>,
    ) -> Self {
        Self {
            prompt_1: default_prompt(),
            prompt_2: default_prompt(),
            building_code: building_code.into(),
            apartment_number,
            floor_number,
            query: query.into(),
        }
    }

    pub fn with_prompt_1(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_1 = prompt.into();
        self
    }

    pub fn with_prompt_2(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_2 = prompt.into();
        self
    }

    pub fn apartment_label(&self) -> String {
        apartment_label(self.apartment_number)
    }
}

/// Output of a completed analysis: two texts and four encoded previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Raw stage-1 JSON text
    pub step1: String,
    /// Stage-2 prose answer
    pub step2: String,
    pub map_original: String,
    pub map_cropped: String,
    pub floorplan_original: String,
    pub floorplan_cropped: String,
}
