use serde::Serialize;
use std::collections::BTreeMap;

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub data_dir: String,
    pub site_map: SiteMapInfo,
    pub buildings: Vec<BuildingInfo>,
}

#[derive(Debug, Serialize)]
pub struct SiteMapInfo {
    pub building_codes: Vec<String>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct BuildingInfo {
    pub building: String,
    pub floor_ranges: Vec<FloorRangeInfo>,
}

#[derive(Debug, Serialize)]
pub struct FloorRangeInfo {
    pub label: String,
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub apartment_count: usize,
    pub tile_count: usize,
    pub has_design: bool,
}

/// Output for crop command
#[derive(Debug, Serialize)]
pub struct CropOutput {
    pub source: String,
    pub code: String,
    pub width: u32,
    pub height: u32,
    pub path: String,
}

/// Output for ask command
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub step1: String,
    pub step2: String,
    pub saved_images: Vec<String>,
}

/// Output for doctor command
#[derive(Debug, Serialize)]
pub struct DoctorOutput {
    pub config: BTreeMap<String, ConfigEntry>,
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}
