use floorsight_advisor::AdvisorPipeline;
use floorsight_core::models::Assets;
use floorsight_llm::MultimodalModel;
use std::sync::Arc;

use crate::exchange_log::ExchangeLog;

/// Remote model shared by every request
pub type SharedModel = Arc<dyn MultimodalModel>;

/// Read-only after startup; handlers receive it behind an `Arc`
pub struct AppState {
    pub assets: Arc<Assets>,
    pub pipeline: AdvisorPipeline<SharedModel>,
    pub exchange_log: Option<ExchangeLog>,
}

impl AppState {
    pub fn new(assets: Arc<Assets>, pipeline: AdvisorPipeline<SharedModel>) -> Self {
        Self {
            assets,
            pipeline,
            exchange_log: None,
        }
    }

    pub fn with_exchange_log(mut self, exchange_log: ExchangeLog) -> Self {
        self.exchange_log = Some(exchange_log);
        self
    }
}
