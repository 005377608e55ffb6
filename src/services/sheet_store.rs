use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, Url};
use serde_json::{json, Value};

use crate::config::{Config, UpdateAddressing};
use crate::error::AppError;
use crate::models::{row_from_value, RowRecord, Sheet, SheetCollection, KEY_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The store reported at least one updated row, or echoed the data back.
    Acknowledged,
    /// The key value matched no row.
    NotFound,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub status: UpdateStatus,
    pub body: Value,
}

/// Row-oriented spreadsheet store behind the proxy.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn fetch_all(&self) -> Result<SheetCollection, AppError>;

    async fn update_row(
        &self,
        sheet: Option<&str>,
        key_value: &str,
        fields: &RowRecord,
    ) -> Result<UpdateOutcome, AppError>;
}

/// SheetDB-style REST client.
pub struct SheetDbClient {
    client: Client,
    base: Url,
    sheet_names: Vec<String>,
    key_column: String,
    addressing: UpdateAddressing,
}

impl SheetDbClient {
    pub fn new(
        base: &str,
        sheet_names: Vec<String>,
        addressing: UpdateAddressing,
    ) -> Result<Self, AppError> {
        let base = Url::parse(base)
            .map_err(|e| AppError::UpstreamFailure(format!("Invalid store URL '{}': {}", base, e)))?;

        Ok(Self {
            client: Client::new(),
            base,
            sheet_names,
            key_column: KEY_COLUMN.to_string(),
            addressing,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.sheet_api_base,
            config.sheet_names.clone(),
            config.update_addressing,
        )
    }

    pub fn read_url(&self, sheet: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("sheet", sheet);
        url
    }

    /// Where to send the PATCH for the row whose key column equals `key_value`.
    pub fn update_url(&self, sheet: Option<&str>, key_value: &str) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        match self.addressing {
            UpdateAddressing::Query => {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("column", &self.key_column)
                    .append_pair("value", key_value);
                if let Some(sheet) = sheet {
                    query.append_pair("sheet", sheet);
                }
            }
            UpdateAddressing::Path => {
                url.path_segments_mut()
                    .map_err(|_| AppError::UpstreamFailure(format!("Store URL '{}' cannot take path segments", self.base)))?
                    .pop_if_empty()
                    .push(&self.key_column)
                    .push(key_value);
                if let Some(sheet) = sheet {
                    url.query_pairs_mut().append_pair("sheet", sheet);
                }
            }
        }
        Ok(url)
    }

    async fn fetch_sheet(&self, name: &str) -> Result<Sheet, AppError> {
        let response = self
            .client
            .get(self.read_url(name))
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Failed to read sheet '{}': {}", name, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Failed to read sheet '{}': {}", name, e)))?;

        let rows = match serde_json::from_str::<Value>(&text) {
            Ok(value) => rows_for_sheet(&value, name).unwrap_or_else(|| {
                tracing::warn!("Sheet '{}' returned no row array (status {}), using empty sheet", name, status);
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!("Sheet '{}' returned invalid JSON (status {}): {}", name, status, e);
                Vec::new()
            }
        };

        Ok(Sheet {
            name: name.to_string(),
            rows,
        })
    }
}

#[async_trait]
impl SheetStore for SheetDbClient {
    async fn fetch_all(&self) -> Result<SheetCollection, AppError> {
        let start = std::time::Instant::now();
        let reads = self.sheet_names.iter().map(|name| self.fetch_sheet(name));

        let sheets = join_all(reads)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let collection = SheetCollection::new(sheets);
        tracing::info!(
            "Read {} rows across {} sheets in {:?}",
            collection.row_count(),
            collection.sheets.len(),
            start.elapsed()
        );
        Ok(collection)
    }

    async fn update_row(
        &self,
        sheet: Option<&str>,
        key_value: &str,
        fields: &RowRecord,
    ) -> Result<UpdateOutcome, AppError> {
        let url = self.update_url(sheet, key_value)?;
        tracing::info!("Updating row '{}' ({} columns)", key_value, fields.len());

        let response = self
            .client
            .patch(url)
            .json(&json!({ "data": fields }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Failed to update row: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Failed to parse update response ({}): {}", status, e)))?;

        let outcome = UpdateOutcome {
            status: classify_ack(&body),
            body,
        };
        if outcome.status != UpdateStatus::Acknowledged {
            tracing::warn!("Store did not acknowledge update of '{}': {:?}", key_value, outcome.status);
        }
        Ok(outcome)
    }
}

/// Extracts the rows of `sheet` from a read response.
///
/// Accepts a plain array, or an object keyed by sheet name (matched without
/// regard to case). Array entries that are not objects are skipped.
pub fn rows_for_sheet(value: &Value, sheet: &str) -> Option<Vec<RowRecord>> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(sheets) => sheets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(sheet))
            .and_then(|(_, rows)| rows.as_array())?,
        _ => return None,
    };

    Some(rows.iter().filter_map(row_from_value).collect())
}

pub fn classify_ack(body: &Value) -> UpdateStatus {
    match body.get("updated") {
        Some(count) => match count.as_u64().or_else(|| count.as_str().and_then(|s| s.parse().ok())) {
            Some(0) => UpdateStatus::NotFound,
            Some(_) => UpdateStatus::Acknowledged,
            None => UpdateStatus::Rejected,
        },
        None if body.get("data").is_some() => UpdateStatus::Acknowledged,
        None => UpdateStatus::Rejected,
    }
}
