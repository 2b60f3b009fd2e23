//! Crop command implementation

use crate::cli::CropArgs;
use crate::output::OutputWriter;
use crate::output_types::CropOutput;
use anyhow::{Context, Result};
use floorsight_core::config::LayeredConfig;
use floorsight_core::floor::select_floor;
use floorsight_core::imaging;
use floorsight_core::loader::{load_assets, SITE_MAP_NAME};
use floorsight_core::models::apartment_label;
use std::fs;

pub fn execute(args: CropArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let layout = config.data_layout();
    let assets = load_assets(&layout)
        .with_context(|| format!("Failed to load assets from {}", layout.root().display()))?;

    let (source, code, raster) = match (args.apartment, args.floor) {
        (Some(apartment), Some(floor)) => {
            let (label, dataset) = select_floor(&assets.catalog, &args.building, floor)?;
            tracing::debug!(floor, range = %label, "Selected floor dataset");
            let code = apartment_label(apartment);
            let raster = dataset.crop(&code)?;
            (dataset.name().to_string(), code, raster)
        }
        _ => {
            let raster = assets.site_map.crop(&args.building)?;
            (SITE_MAP_NAME.to_string(), args.building.clone(), raster)
        }
    };

    let raster = match args.max_dimension {
        Some(max) => imaging::preview(&raster, max),
        None => raster,
    };

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&args.out, imaging::encode_jpeg(&raster)?)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let (width, height) = raster.dimensions();
    output.success(format!(
        "Wrote {} from {} ({}x{}) to {}",
        code,
        source,
        width,
        height,
        args.out.display()
    ));

    output.result(CropOutput {
        source,
        code,
        width,
        height,
        path: args.out.display().to_string(),
    })
}
