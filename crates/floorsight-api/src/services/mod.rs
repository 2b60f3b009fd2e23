mod analysis;
mod catalog;

pub use analysis::AnalysisService;
pub use catalog::CatalogService;
