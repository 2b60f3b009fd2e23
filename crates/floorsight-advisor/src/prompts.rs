//! Prompt templates and instruction assembly for both stages

use crate::models::StructuredLayout;

/// Built-in stage-1 template: floorplan layout extraction as JSON
pub const STAGE_ONE_TEMPLATE: &str = include_str!("../prompts/stage_one.txt");

/// Built-in stage-2 template: orientation-grounded consultation
pub const STAGE_TWO_TEMPLATE: &str = include_str!("../prompts/stage_two.txt");

/// Default templates used when a request sends the `"default"` sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    stage_one: String,
    stage_two: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            stage_one: STAGE_ONE_TEMPLATE.to_string(),
            stage_two: STAGE_TWO_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn new(stage_one: impl Into<String>, stage_two: impl Into<String>) -> Self {
        Self {
            stage_one: stage_one.into(),
            stage_two: stage_two.into(),
        }
    }

    /// Built-in templates, each replaced by its configured counterpart when present
    pub fn from_config(stage_one: Option<String>, stage_two: Option<String>) -> Self {
        Self {
            stage_one: stage_one.unwrap_or_else(|| STAGE_ONE_TEMPLATE.to_string()),
            stage_two: stage_two.unwrap_or_else(|| STAGE_TWO_TEMPLATE.to_string()),
        }
    }

    pub fn stage_one(&self) -> &str {
        &self.stage_one
    }

    pub fn stage_two(&self) -> &str {
        &self.stage_two
    }
}

/// Everything stage 2 knows about the apartment besides the map image
#[derive(Debug, Clone, Copy)]
pub struct StageTwoContext<'a> {
    pub building_code: &'a str,
    pub apartment_label: &'a str,
    pub floor_number: i32,
    pub layout: &'a StructuredLayout,
    pub query: &'a str,
}

/// Stage-1 instruction: the template followed by the apartment being analysed
pub fn stage_one_prompt(template: &str, apartment_label: &str) -> String {
    format!("{}\nThông tin căn hộ cần phân tích: {}", template, apartment_label)
}

/// Stage-2 instruction: the template, the apartment block, the inlined layout,
/// and the user's question
pub fn stage_two_prompt(template: &str, context: &StageTwoContext<'_>) -> String {
    format!(
        "{template}\n\
         Thông tin căn hộ cần phân tích:\n\
         \n\
         * Tòa nhà (Building): {building}\n\
         * Căn hộ (Apartment): {apartment}\n\
         * Tầng (Floor): {floor}\n\
         \n\
         [MAP_IMAGE]: Đây là ảnh bản đồ tổng quan vị trí block/căn hộ trong khu đô thị.\n\
         [FLOORPLAN_LAYOUT]: Đây là JSON mô tả bố cục thiết kế mặt bằng chi tiết của căn hộ {apartment} trong Block {building}: {layout}\n\
         [USER_QUERY]: {query}\n",
        template = template,
        building = context.building_code,
        apartment = context.apartment_label,
        floor = context.floor_number,
        layout = context.layout.to_inline_json(),
        query = context.query,
    )
}
