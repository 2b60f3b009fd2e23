use serde::Serialize;
use std::collections::BTreeMap;

use super::tile::TileIndex;
use crate::error::{FloorsightError, Result};
use crate::imaging::{self, Raster, DEFAULT_PREVIEW_DIMENSION};
use crate::region;

/// A tile index paired with the raster its rectangles point into.
///
/// Loaded once at startup and never mutated. Either half may be missing when the
/// source directory was only partially populated.
#[derive(Debug, Clone)]
pub struct TileDataset {
    name: String,
    index: TileIndex,
    raster: Option<Raster>,
    /// Encoded preview of the full raster
    preview: Option<String>,
}

impl TileDataset {
    /// Create a dataset, encoding the preview of the full raster up front
    pub fn new(name: impl Into<String>, index: TileIndex, raster: Option<Raster>) -> Result<Self> {
        let preview = raster
            .as_ref()
            .map(|r| imaging::encoded_preview(r, DEFAULT_PREVIEW_DIMENSION))
            .transpose()?;

        Ok(Self {
            name: name.into(),
            index,
            raster,
            preview,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    pub fn has_raster(&self) -> bool {
        self.raster.is_some()
    }

    /// The full raster, or `DatasetIncomplete` if none was loaded
    pub fn raster(&self) -> Result<&Raster> {
        self.raster.as_ref().ok_or_else(|| self.incomplete("raster"))
    }

    /// Encoded preview of the full raster
    pub fn preview(&self) -> Result<&str> {
        self.preview.as_deref().ok_or_else(|| self.incomplete("raster"))
    }

    /// Crop the bounding box of every tile composing `code`
    pub fn crop(&self, code: &str) -> Result<Raster> {
        let rects = self.index.region_for(code)?;
        region::crop(self.raster()?, &rects)
    }

    fn incomplete(&self, missing: &str) -> FloorsightError {
        FloorsightError::DatasetIncomplete {
            dataset: self.name.clone(),
            missing: missing.to_string(),
        }
    }
}

/// Inclusive floor range parsed from a `<prefix>_<start>_<end>` label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorRange {
    pub prefix: String,
    pub start: i32,
    pub end: i32,
}

impl FloorRange {
    /// Parse a floor-range label.
    ///
    /// Returns `None` unless the label has exactly three `_`-separated fields
    /// with integer start and end.
    pub fn parse(label: &str) -> Option<Self> {
        let mut fields = label.split('_');
        let prefix = fields.next()?;
        let start = fields.next()?.parse().ok()?;
        let end = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            prefix: prefix.to_string(),
            start,
            end,
        })
    }

    pub fn contains(&self, floor: i32) -> bool {
        self.start <= floor && floor <= self.end
    }
}

/// Building code -> floor-range label -> floor dataset.
///
/// Labels are kept sorted so that floor selection is deterministic.
#[derive(Debug, Clone, Default)]
pub struct BuildingCatalog {
    buildings: BTreeMap<String, BTreeMap<String, TileDataset>>,
}

impl BuildingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the dataset of one floor-range bucket
    pub fn insert(
        &mut self,
        building: impl Into<String>,
        label: impl Into<String>,
        dataset: TileDataset,
    ) {
        self.buildings.entry(building.into()).or_default().insert(label.into(), dataset);
    }

    /// Register a building with no floor datasets yet
    pub fn add_building(&mut self, building: impl Into<String>) {
        self.buildings.entry(building.into()).or_default();
    }

    /// Floor datasets of a building, keyed by label
    pub fn floors(&self, building: &str) -> Option<&BTreeMap<String, TileDataset>> {
        self.buildings.get(building)
    }

    /// Iterate buildings in sorted order
    pub fn buildings(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, TileDataset>)> {
        self.buildings.iter().map(|(code, floors)| (code.as_str(), floors))
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// Everything loaded at startup: the per-building catalog and the site map
#[derive(Debug, Clone)]
pub struct Assets {
    pub catalog: BuildingCatalog,
    pub site_map: TileDataset,
}

impl Assets {
    pub fn new(catalog: BuildingCatalog, site_map: TileDataset) -> Self {
        Self { catalog, site_map }
    }
}
