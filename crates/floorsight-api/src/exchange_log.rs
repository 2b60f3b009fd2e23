//! Append-only JSON-lines record of analysis exchanges

use chrono::{DateTime, Utc};
use floorsight_core::models::{AnalysisRequest, AnalysisResult};
use floorsight_core::{FloorsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeOutcome {
    Ok,
    Error,
}

/// One logged exchange. Images are never recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    pub building_code: String,
    pub apartment_number: u32,
    pub floor_number: i32,
    pub query: String,
    pub outcome: ExchangeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExchangeRecord {
    pub fn new(
        request_id: Uuid,
        request: &AnalysisRequest,
        outcome: &std::result::Result<AnalysisResult, FloorsightError>,
    ) -> Self {
        let (outcome, step1, step2, error) = match outcome {
            Ok(result) => (
                ExchangeOutcome::Ok,
                Some(result.step1.clone()),
                Some(result.step2.clone()),
                None,
            ),
            Err(e) => (ExchangeOutcome::Error, None, None, Some(e.to_string())),
        };

        Self {
            timestamp: Utc::now(),
            request_id,
            building_code: request.building_code.clone(),
            apartment_number: request.apartment_number,
            floor_number: request.floor_number,
            query: request.query.clone(),
            outcome,
            step1,
            step2,
            error,
        }
    }
}

/// Exchange log file; appends are serialized so lines never interleave
pub struct ExchangeLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ExchangeLog {
    /// Open `path` for appending, creating it and its parent directory if needed
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        tracing::info!(path = %path.display(), "Exchange log opened");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &ExchangeRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
