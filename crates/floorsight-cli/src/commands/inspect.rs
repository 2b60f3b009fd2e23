//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::{BuildingInfo, FloorRangeInfo, InspectOutput, SiteMapInfo};
use anyhow::{bail, Context, Result};
use floorsight_core::config::LayeredConfig;
use floorsight_core::floor::normalize_building_code;
use floorsight_core::loader::load_assets;
use floorsight_core::models::{Assets, FloorRange};
use tabled::Tabled;

pub fn execute(args: InspectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let layout = config.data_layout();
    let assets = load_assets(&layout)
        .with_context(|| format!("Failed to load assets from {}", layout.root().display()))?;

    let wanted = args.building.as_deref().map(normalize_building_code);
    let buildings = describe_buildings(&assets, wanted.as_deref());
    if let Some(code) = &wanted {
        if buildings.is_empty() {
            bail!("Building {} is not in the catalog", code);
        }
    }

    let (width, height) = assets.site_map.raster()?.dimensions();
    let site_map = SiteMapInfo {
        building_codes: assets.site_map.index().codes().into_iter().map(str::to_string).collect(),
        width,
        height,
    };

    if output.is_json() {
        return output.result(InspectOutput {
            data_dir: layout.root().display().to_string(),
            site_map,
            buildings,
        });
    }

    output.section("Site Map");
    output.kv("Image", format!("{}x{}", site_map.width, site_map.height));
    output.kv("Buildings located", site_map.building_codes.join(", "));

    output.section("Floor Designs");

    #[derive(Tabled)]
    struct FloorRow {
        #[tabled(rename = "Building")]
        building: String,
        #[tabled(rename = "Range")]
        label: String,
        #[tabled(rename = "Floors")]
        floors: String,
        #[tabled(rename = "Apartments")]
        apartments: usize,
        #[tabled(rename = "Tiles")]
        tiles: usize,
        #[tabled(rename = "Design")]
        design: &'static str,
    }

    let rows: Vec<FloorRow> = buildings
        .iter()
        .flat_map(|b| {
            b.floor_ranges.iter().map(move |r| FloorRow {
                building: b.building.clone(),
                label: r.label.clone(),
                floors: match (r.start, r.end) {
                    (Some(start), Some(end)) => format!("{}-{}", start, end),
                    _ => "-".to_string(),
                },
                apartments: r.apartment_count,
                tiles: r.tile_count,
                design: if r.has_design { "yes" } else { "missing" },
            })
        })
        .collect();

    output.table(rows);

    for building in buildings.iter().filter(|b| b.floor_ranges.is_empty()) {
        output.warning(format!("Building {} has no floor designs", building.building));
    }

    Ok(())
}

fn describe_buildings(assets: &Assets, wanted: Option<&str>) -> Vec<BuildingInfo> {
    assets
        .catalog
        .buildings()
        .filter(|(code, _)| wanted.is_none_or(|w| w == *code))
        .map(|(code, floors)| BuildingInfo {
            building: code.to_string(),
            floor_ranges: floors
                .iter()
                .map(|(label, dataset)| {
                    let range = FloorRange::parse(label);
                    FloorRangeInfo {
                        label: label.clone(),
                        start: range.as_ref().map(|r| r.start),
                        end: range.as_ref().map(|r| r.end),
                        apartment_count: dataset.index().len(),
                        tile_count: dataset.index().tile_count(),
                        has_design: dataset.has_raster(),
                    }
                })
                .collect(),
        })
        .collect()
}
