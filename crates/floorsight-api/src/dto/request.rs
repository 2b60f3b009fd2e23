use serde::Deserialize;

/// Query string of the catalog listing
#[derive(Debug, Default, Deserialize)]
pub struct BuildingsQuery {
    /// Restrict the listing to one building (dots are ignored)
    pub building: Option<String>,
}
