use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::app::ports::SheetRowsPort;
use crate::error::{FeedError, Result};
use crate::infra::service_account::ServiceAccountTokenSource;

/// How requests to the Sheets API are authorized
pub enum SheetsAuth {
    /// OAuth bearer token minted from a service-account key
    ServiceAccount(ServiceAccountTokenSource),
    /// API key; only works for sheets shared publicly
    ApiKey(String),
}

/// Response body of `spreadsheets.values.get`
#[derive(Debug, Deserialize)]
struct ValueRange {
    // Omitted entirely when the range is empty
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Read-only Google Sheets v4 client for a single spreadsheet
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl GoogleSheetsClient {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        auth: SheetsAuth,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        }
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| FeedError::Config(format!("Invalid Sheets API base '{}': {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::Config(format!("Sheets API base '{}' cannot have a path", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }
}

#[async_trait]
impl SheetRowsPort for GoogleSheetsClient {
    #[instrument(skip(self), fields(spreadsheet_id = %self.spreadsheet_id))]
    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range)?;
        let request = match &self.auth {
            SheetsAuth::ServiceAccount(tokens) => {
                let token = tokens.access_token().await?;
                self.client.get(url).bearer_auth(token)
            }
            SheetsAuth::ApiKey(key) => self.client.get(url).query(&[("key", key.as_str())]),
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ValueRange = resp.json().await?;
        debug!("Sheets returned {} rows", body.values.len());
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

/// Formatted values arrive as strings; anything else is rendered as JSON text
fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
