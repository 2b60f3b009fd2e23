pub mod analysis;
pub mod dataset;
pub mod tile;

pub use analysis::{
    apartment_label, AnalysisRequest, AnalysisResult, PromptOverride, Stage, DEFAULT_SENTINEL,
};
pub use dataset::{Assets, BuildingCatalog, FloorRange, TileDataset};
pub use tile::{EntityKind, TileIndex, TileRect};
