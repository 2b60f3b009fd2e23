//! Bounding-box cropping of tile regions.
//!
//! A region is the axis-aligned box enclosing all of its tiles. When tiles are
//! not contiguous the crop also contains the pixels between them, which may
//! belong to neighbouring units. Output parity with the existing drawings
//! depends on this, so the crop is never tightened to the tile outlines.

use crate::error::{FloorsightError, Result};
use crate::imaging::Raster;
use crate::models::TileRect;

/// Enclosing rectangle of a set of tiles, as half-open pixel ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl RegionBounds {
    /// The smallest box covering every rect, or `None` for an empty set
    pub fn enclosing(rects: &[TileRect]) -> Option<Self> {
        let first = rects.first()?;
        let seed = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.right(),
            max_y: first.bottom(),
        };

        Some(rects[1..].iter().fold(seed, |acc, rect| Self {
            min_x: acc.min_x.min(rect.x),
            min_y: acc.min_y.min(rect.y),
            max_x: acc.max_x.max(rect.right()),
            max_y: acc.max_y.max(rect.bottom()),
        }))
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Restrict the box to a `width` x `height` raster
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        Self {
            min_x: self.min_x.min(width),
            min_y: self.min_y.min(height),
            max_x: self.max_x.min(width),
            max_y: self.max_y.min(height),
        }
    }
}

/// Extract the enclosing box of `rects` from `raster` as a new raster.
///
/// Boxes reaching past the raster edge are clamped to it with a warning. Fails
/// with `InvalidRegion` when `rects` is empty or the clamped box has no pixels.
pub fn crop(raster: &Raster, rects: &[TileRect]) -> Result<Raster> {
    let bounds = RegionBounds::enclosing(rects).ok_or_else(|| FloorsightError::InvalidRegion {
        reason: "no tiles to crop".to_string(),
    })?;

    let (width, height) = raster.dimensions();
    let clamped = bounds.clamp_to(width, height);
    if clamped != bounds {
        tracing::warn!(
            requested = ?bounds,
            raster_width = width,
            raster_height = height,
            "Region exceeds raster bounds, clamping"
        );
    }

    if clamped.is_empty() {
        return Err(FloorsightError::InvalidRegion {
            reason: format!(
                "region {:?} lies outside the {}x{} raster",
                bounds, width, height
            ),
        });
    }

    Ok(image::imageops::crop_imm(
        raster,
        clamped.min_x,
        clamped.min_y,
        clamped.width(),
        clamped.height(),
    )
    .to_image())
}
