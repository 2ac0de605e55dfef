use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::app::ports::{ImageModerationPort, ModerationVerdict};
use crate::error::{FeedError, Result};

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
}

/// Image moderation through the OpenAI moderations endpoint
pub struct OpenAiModerator {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiModerator {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageModerationPort for OpenAiModerator {
    fn backend_name(&self) -> &'static str {
        "openai"
    }

    async fn moderate(&self, image_reference: &str) -> Result<ModerationVerdict> {
        let url = format!("{}/v1/moderations", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "input": [{ "type": "image_url", "image_url": { "url": image_reference } }],
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ModerationResponse = resp.json().await?;
        let result = parsed.results.first().ok_or_else(|| FeedError::Api {
            status: status.as_u16(),
            message: "moderation response had no results".to_string(),
        })?;

        debug!(flagged = result.flagged, "Moderation result");
        Ok(if result.flagged {
            ModerationVerdict::Flagged
        } else {
            ModerationVerdict::Approved
        })
    }
}
