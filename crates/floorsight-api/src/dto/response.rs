use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: "floorsight-api",
        }
    }
}

/// One building of the catalog listing
#[derive(Debug, Serialize)]
pub struct BuildingSummary {
    pub building: String,
    pub floor_ranges: Vec<FloorRangeSummary>,
}

/// One floor-range bucket of a building
#[derive(Debug, Serialize)]
pub struct FloorRangeSummary {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i32>,
    pub has_design: bool,
    pub apartments: Vec<String>,
}
