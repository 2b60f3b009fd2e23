//! Startup loading of the site map and the per-building floor catalog.
//!
//! Expected layout under the data directory:
//!
//! ```text
//! mapping.json            building code -> [tile]
//! metadata.json           tile -> {x, y, width, height}
//! map.JPG                 site map raster
//! design/<BUILDING>/<prefix>_<start>_<end>/
//!     mapping.json        apartment code -> [tile]
//!     metadata.json       tile -> rect
//!     design.jpg          design sheet raster
//! ```

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FloorsightError, Result};
use crate::imaging;
use crate::models::{Assets, BuildingCatalog, EntityKind, TileDataset, TileIndex, TileRect};

pub const MAPPING_FILE: &str = "mapping.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const DESIGN_IMAGE_FILE: &str = "design.jpg";
pub const DESIGN_DIR: &str = "design";
pub const SITE_MAP_NAME: &str = "site-map";

/// Paths of the startup assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
    site_map_image: String,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            site_map_image: "map.JPG".to_string(),
        }
    }

    pub fn with_site_map_image(mut self, file_name: impl Into<String>) -> Self {
        self.site_map_image = file_name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site_map_mapping_path(&self) -> PathBuf {
        self.root.join(MAPPING_FILE)
    }

    pub fn site_map_metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn site_map_image_path(&self) -> PathBuf {
        self.root.join(&self.site_map_image)
    }

    pub fn design_dir(&self) -> PathBuf {
        self.root.join(DESIGN_DIR)
    }
}

/// Load the site map and the building catalog
pub fn load_assets(layout: &DataLayout) -> Result<Assets> {
    let site_map = load_site_map(layout)?;
    let catalog = load_catalog(&layout.design_dir())?;

    tracing::info!(
        buildings = catalog.len(),
        site_map_codes = site_map.index().len(),
        "Assets loaded"
    );

    Ok(Assets::new(catalog, site_map))
}

/// Load the development site map. All three files are required.
pub fn load_site_map(layout: &DataLayout) -> Result<TileDataset> {
    let codes: HashMap<String, Vec<String>> = read_json(&layout.site_map_mapping_path())?;
    let tiles: HashMap<String, TileRect> = read_json(&layout.site_map_metadata_path())?;

    let image_path = layout.site_map_image_path();
    if !image_path.is_file() {
        return Err(FloorsightError::DatasetIncomplete {
            dataset: SITE_MAP_NAME.to_string(),
            missing: image_path.display().to_string(),
        });
    }
    let raster = imaging::open(&image_path)?;

    let index = TileIndex::new(EntityKind::Building, codes, tiles);
    warn_dangling(SITE_MAP_NAME, &index);

    TileDataset::new(SITE_MAP_NAME, index, Some(raster))
}

/// Walk `design_dir/<building>/<floor range>/` and load every floor dataset.
///
/// Non-directory entries are skipped. Floor directories missing some of their
/// files yield partially populated datasets.
pub fn load_catalog(design_dir: &Path) -> Result<BuildingCatalog> {
    if !design_dir.is_dir() {
        return Err(FloorsightError::ConfigInvalid {
            key: "data_dir".to_string(),
            reason: format!("design directory {} does not exist", design_dir.display()),
        });
    }

    let mut catalog = BuildingCatalog::new();

    for building_dir in sorted_subdirectories(design_dir)? {
        let building = dir_name(&building_dir);
        catalog.add_building(&building);

        for floor_dir in sorted_subdirectories(&building_dir)? {
            let label = dir_name(&floor_dir);
            let dataset = load_floor_dataset(&floor_dir, format!("{}/{}", building, label))?;
            tracing::debug!(
                building = %building,
                label = %label,
                apartments = dataset.index().len(),
                has_raster = dataset.has_raster(),
                "Loaded floor dataset"
            );
            catalog.insert(&building, label, dataset);
        }
    }

    Ok(catalog)
}

/// Load one floor directory, tolerating missing files
pub fn load_floor_dataset(dir: &Path, name: String) -> Result<TileDataset> {
    let codes: HashMap<String, Vec<String>> =
        read_optional_json(&dir.join(MAPPING_FILE), &name)?.unwrap_or_default();
    let tiles: HashMap<String, TileRect> =
        read_optional_json(&dir.join(METADATA_FILE), &name)?.unwrap_or_default();

    let image_path = dir.join(DESIGN_IMAGE_FILE);
    let raster = if image_path.is_file() {
        Some(imaging::open(&image_path)?)
    } else {
        tracing::warn!(dataset = %name, file = DESIGN_IMAGE_FILE, "Floor dataset has no design sheet");
        None
    };

    let index = TileIndex::new(EntityKind::Apartment, codes, tiles);
    warn_dangling(&name, &index);

    TileDataset::new(name, index, raster)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        FloorsightError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        FloorsightError::Serialization(format!("{}: {}", path.display(), e))
    })
}

fn read_optional_json<T: DeserializeOwned>(path: &Path, dataset: &str) -> Result<Option<T>> {
    if !path.is_file() {
        tracing::warn!(dataset = %dataset, file = %path.display(), "Floor dataset file missing");
        return Ok(None);
    }
    read_json(path).map(Some)
}

fn sorted_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn warn_dangling(dataset: &str, index: &TileIndex) {
    let dangling = index.dangling_tiles();
    if !dangling.is_empty() {
        tracing::warn!(
            dataset = %dataset,
            tiles = ?dangling,
            "Codes reference tiles without rectangles"
        );
    }
}
