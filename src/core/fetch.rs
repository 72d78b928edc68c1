use crate::domain::model::{FetchWindow, Record};
use crate::utils::error::FetchError;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_PAGE_LIMIT: u32 = 50_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues one time-bounded request against the open-data API and yields the
/// raw records. The row cap bounds a single page; requesting successive
/// offset pages until a short page comes back would guarantee completeness at
/// high volumes, but this pipeline deliberately stays single-page and leans
/// on the cap being generous for a 30-day window.
#[derive(Debug, Clone)]
pub struct WindowedFetcher {
    client: Client,
    endpoint: String,
}

impl WindowedFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        // Build fails only when the TLS backend cannot initialize.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Fetch all records with `incident_date >= window.start_date`, newest
    /// first, capped at `page_limit` rows. No retry here; retry policy
    /// belongs to the orchestrator.
    pub async fn fetch(
        &self,
        window: &FetchWindow,
        page_limit: u32,
    ) -> Result<Vec<Record>, FetchError> {
        let params = [
            (
                "$where",
                format!("incident_date >= '{}'", window.start_date.format("%Y-%m-%d")),
            ),
            ("$limit", page_limit.to_string()),
            ("$order", "incident_date DESC".to_string()),
        ];

        tracing::debug!(endpoint = %self.endpoint, start_date = %window.start_date, "Requesting incident records");
        let response = self.client.get(&self.endpoint).query(&params).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        let payload: serde_json::Value = serde_json::from_str(&body)?;
        let items = match payload {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(FetchError::UnexpectedPayload {
                    detail: format!("expected a JSON array of records, got {}", type_name(&other)),
                })
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match item {
                serde_json::Value::Object(obj) => {
                    records.push(Record::new(obj.into_iter().collect()));
                }
                other => {
                    return Err(FetchError::UnexpectedPayload {
                        detail: format!("expected a JSON object per record, got {}", type_name(&other)),
                    })
                }
            }
        }

        tracing::debug!(count = records.len(), "Fetched records");
        Ok(records)
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
