use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{FloorsightError, Result};

/// What the codes of a tile index identify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Apartment codes on a floor design sheet (e.g. `CH07`)
    Apartment,
    /// Building codes on the development site map (e.g. `S6.06`)
    Building,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Apartment => write!(f, "Apartment"),
            EntityKind::Building => write!(f, "Building"),
        }
    }
}

/// Offset and size of one named tile inside its parent raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// Maps entity codes to the tiles that compose them.
///
/// Both maps share the coordinate space of a single raster. Codes are unique per
/// index; tile order within a code carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndex {
    kind: EntityKind,
    codes: HashMap<String, Vec<String>>,
    tiles: HashMap<String, TileRect>,
}

impl TileIndex {
    /// Create a tile index from a code mapping and a tile rectangle mapping
    pub fn new(
        kind: EntityKind,
        codes: HashMap<String, Vec<String>>,
        tiles: HashMap<String, TileRect>,
    ) -> Self {
        Self { kind, codes, tiles }
    }

    /// Create an index with no codes and no tiles
    pub fn empty(kind: EntityKind) -> Self {
        Self::new(kind, HashMap::new(), HashMap::new())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Resolve the rectangles of every tile composing `code`.
    ///
    /// Fails with `NotFound` when the code is unknown and with `InvalidRegion`
    /// when one of its tiles has no rectangle.
    pub fn region_for(&self, code: &str) -> Result<Vec<TileRect>> {
        let tile_names = self.codes.get(code).ok_or_else(|| FloorsightError::NotFound {
            entity: self.kind,
            code: code.to_string(),
        })?;

        tile_names
            .iter()
            .map(|name| {
                self.tiles.get(name).copied().ok_or_else(|| FloorsightError::InvalidRegion {
                    reason: format!("tile '{}' referenced by '{}' has no rectangle", name, code),
                })
            })
            .collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    /// All codes in sorted order
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Number of codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of tile rectangles
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tile names referenced by some code but missing from the rectangle map
    pub fn dangling_tiles(&self) -> BTreeSet<&str> {
        self.codes
            .values()
            .flatten()
            .filter(|name| !self.tiles.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> TileIndex {
        let codes = HashMap::from([
            ("CH07".to_string(), vec!["t1".to_string(), "t2".to_string()]),
            ("CH08".to_string(), vec!["t3".to_string(), "ghost".to_string()]),
        ]);
        let tiles = HashMap::from([
            ("t1".to_string(), TileRect::new(0, 0, 10, 10)),
            ("t2".to_string(), TileRect::new(10, 0, 10, 10)),
            ("t3".to_string(), TileRect::new(20, 0, 10, 10)),
        ]);
        TileIndex::new(EntityKind::Apartment, codes, tiles)
    }

    #[test]
    fn test_region_for_known_code() {
        let index = sample_index();
        let rects = index.region_for("CH07").unwrap();
        assert_eq!(rects, vec![TileRect::new(0, 0, 10, 10), TileRect::new(10, 0, 10, 10)]);
    }

    #[test]
    fn test_region_for_unknown_code() {
        let index = sample_index();
        match index.region_for("CH99") {
            Err(FloorsightError::NotFound { entity, code }) => {
                assert_eq!(entity, EntityKind::Apartment);
                assert_eq!(code, "CH99");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_region_for_dangling_tile() {
        let index = sample_index();
        assert!(matches!(
            index.region_for("CH08"),
            Err(FloorsightError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_dangling_tiles() {
        let index = sample_index();
        let dangling = index.dangling_tiles();
        assert_eq!(dangling.into_iter().collect::<Vec<_>>(), vec!["ghost"]);
    }

    #[test]
    fn test_codes_sorted() {
        let index = sample_index();
        assert_eq!(index.codes(), vec!["CH07", "CH08"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.tile_count(), 3);
    }

    #[test]
    fn test_tile_rect_ignores_extra_fields() {
        let rect: TileRect =
            serde_json::from_str(r#"{"x": 4, "y": 5, "width": 6, "height": 7, "row": 1}"#)
                .unwrap();
        assert_eq!(rect, TileRect::new(4, 5, 6, 7));
        assert_eq!(rect.right(), 10);
        assert_eq!(rect.bottom(), 12);
    }
}
