mod analyze;
mod buildings;
mod health;

pub use analyze::handle_analyze;
pub use buildings::list_buildings;
pub use health::health_check;
