use floorsight_core::floor::normalize_building_code;
use floorsight_core::models::{BuildingCatalog, FloorRange};

use crate::dto::{BuildingSummary, FloorRangeSummary};

/// Service for describing the loaded catalog
pub struct CatalogService;

impl CatalogService {
    /// Buildings in sorted order, optionally restricted to one building
    pub fn summarize(catalog: &BuildingCatalog, building: Option<&str>) -> Vec<BuildingSummary> {
        let wanted = building.map(normalize_building_code);

        catalog
            .buildings()
            .filter(|(code, _)| wanted.as_deref().is_none_or(|w| w == *code))
            .map(|(code, floors)| BuildingSummary {
                building: code.to_string(),
                floor_ranges: floors
                    .iter()
                    .map(|(label, dataset)| {
                        let range = FloorRange::parse(label);
                        FloorRangeSummary {
                            label: label.clone(),
                            start: range.as_ref().map(|r| r.start),
                            end: range.as_ref().map(|r| r.end),
                            has_design: dataset.has_raster(),
                            apartments: dataset
                                .index()
                                .codes()
                                .into_iter()
                                .map(str::to_string)
                                .collect(),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}
