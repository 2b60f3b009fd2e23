mod request;
mod response;

pub use request::BuildingsQuery;
pub use response::{BuildingSummary, FloorRangeSummary, HealthResponse};
