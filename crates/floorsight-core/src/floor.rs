//! Floor-range bucket selection

use crate::error::{FloorsightError, Result};
use crate::models::{BuildingCatalog, EntityKind, FloorRange, TileDataset};

/// Delimiter stripped from building codes before catalog lookup (`S6.06` -> `S606`)
const BUILDING_CODE_DELIMITER: char = '.';

/// Remove the delimiter from a building code so it matches catalog directory names
pub fn normalize_building_code(code: &str) -> String {
    code.chars().filter(|c| *c != BUILDING_CODE_DELIMITER).collect()
}

/// Find the floor dataset of `building_code` whose inclusive range covers `floor_number`.
///
/// Labels are visited in sorted order and the first match wins. Labels that are
/// not `prefix_start_end` are skipped.
pub fn select_floor<'a>(
    catalog: &'a BuildingCatalog,
    building_code: &str,
    floor_number: i32,
) -> Result<(&'a str, &'a TileDataset)> {
    let building = normalize_building_code(building_code);
    let floors = catalog.floors(&building).ok_or_else(|| FloorsightError::NotFound {
        entity: EntityKind::Building,
        code: building.clone(),
    })?;

    for (label, dataset) in floors {
        let Some(range) = FloorRange::parse(label) else {
            tracing::debug!(building = %building, label = %label, "Skipping unparsable floor range");
            continue;
        };

        if range.contains(floor_number) {
            return Ok((label.as_str(), dataset));
        }
    }

    Err(FloorsightError::FloorNotFound {
        building,
        floor: floor_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TileIndex;

    fn dataset(name: &str) -> TileDataset {
        TileDataset::new(name, TileIndex::empty(EntityKind::Apartment), None).unwrap()
    }

    fn catalog() -> BuildingCatalog {
        let mut catalog = BuildingCatalog::new();
        catalog.insert("S606", "floors_1_25", dataset("low"));
        catalog.insert("S606", "floors_26_40", dataset("high"));
        catalog.insert("S606", "notes", dataset("junk"));
        catalog.insert("S606", "a_b_c", dataset("junk"));
        catalog
    }

    #[test]
    fn test_normalize_building_code() {
        assert_eq!(normalize_building_code("S6.06"), "S606");
        assert_eq!(normalize_building_code("S606"), "S606");
        assert_eq!(normalize_building_code("A.1.2"), "A12");
    }

    #[test]
    fn test_select_floor_in_range() {
        let catalog = catalog();
        let (label, found) = select_floor(&catalog, "S6.06", 20).unwrap();
        assert_eq!(label, "floors_1_25");
        assert_eq!(found.name(), "low");

        let (label, found) = select_floor(&catalog, "S606", 26).unwrap();
        assert_eq!(label, "floors_26_40");
        assert_eq!(found.name(), "high");
    }

    #[test]
    fn test_select_floor_bounds_inclusive() {
        let catalog = catalog();
        assert_eq!(select_floor(&catalog, "S606", 1).unwrap().0, "floors_1_25");
        assert_eq!(select_floor(&catalog, "S606", 25).unwrap().0, "floors_1_25");
        assert_eq!(select_floor(&catalog, "S606", 40).unwrap().0, "floors_26_40");
    }

    #[test]
    fn test_select_floor_no_range() {
        let catalog = catalog();
        match select_floor(&catalog, "S6.06", 99) {
            Err(FloorsightError::FloorNotFound { building, floor }) => {
                assert_eq!(building, "S606");
                assert_eq!(floor, 99);
            }
            other => panic!("expected FloorNotFound, got {:?}", other.map(|(l, _)| l)),
        }
    }

    #[test]
    fn test_select_floor_unknown_building() {
        let catalog = catalog();
        assert!(matches!(
            select_floor(&catalog, "Z9.99", 3),
            Err(FloorsightError::NotFound {
                entity: EntityKind::Building,
                ..
            })
        ));
    }

    #[test]
    fn test_select_floor_is_deterministic() {
        let catalog = catalog();
        for floor in -2..45 {
            let first = select_floor(&catalog, "S606", floor).map(|(label, _)| label.to_string());
            let second = select_floor(&catalog, "S606", floor).map(|(label, _)| label.to_string());
            assert_eq!(first.ok(), second.ok());
        }
    }
}
