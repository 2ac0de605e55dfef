use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::app::feed_use_case::FeedUseCase;
use crate::app::ports::ImageModerationPort;
use crate::config::{Config, ModerationBackend};
use crate::constants::SHEETS_READONLY_SCOPE;
use crate::error::{FeedError, Result};
use crate::infra::openai_moderation::OpenAiModerator;
use crate::infra::service_account::{ServiceAccountKey, ServiceAccountTokenSource};
use crate::infra::sheets_client::{GoogleSheetsClient, SheetsAuth};
use crate::pipeline::media_gate::{AllowAllModerator, MediaGate};
use crate::pipeline::source::RawSourceAdapter;

/// Wire the production adapters described by `config` into a [`FeedUseCase`]
pub fn build_feed_use_case(config: &Config) -> Result<FeedUseCase> {
    let fetch_timeout = Duration::from_secs(config.sheets.fetch_timeout_secs);
    let sheets_http = reqwest::Client::builder().timeout(fetch_timeout).build()?;

    let auth = match &config.sheets.api_key {
        Some(key) => {
            info!("Sheets access via API key");
            SheetsAuth::ApiKey(key.clone())
        }
        None => {
            let key = ServiceAccountKey::from_file(&config.sheets.credentials_file)?;
            info!(client_email = %key.client_email, "Sheets access via service account");
            SheetsAuth::ServiceAccount(ServiceAccountTokenSource::new(
                key,
                SHEETS_READONLY_SCOPE,
                sheets_http.clone(),
            )?)
        }
    };

    let sheets = GoogleSheetsClient::new(
        sheets_http,
        config.sheets.api_base.clone(),
        config.sheets.spreadsheet_id.clone(),
        auth,
    );
    let source = RawSourceAdapter::new(Arc::new(sheets), config.sheets.range.clone(), fetch_timeout);

    let media_gate = MediaGate::new(
        build_moderator(config)?,
        Duration::from_secs(config.moderation.timeout_secs),
        config.moderation.on_error,
    );
    info!(
        backend = media_gate.backend_name(),
        on_error = ?config.moderation.on_error,
        "Media gate configured"
    );

    Ok(FeedUseCase::new(source, config.fields.clone(), media_gate))
}

fn build_moderator(config: &Config) -> Result<Arc<dyn ImageModerationPort>> {
    match config.moderation.backend {
        ModerationBackend::AllowAll => Ok(Arc::new(AllowAllModerator)),
        ModerationBackend::OpenAi => {
            let api_key = config.moderation.openai_api_key.clone().ok_or_else(|| {
                FeedError::Config("OPENAI_API_KEY is required for the openai backend".to_string())
            })?;
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.moderation.timeout_secs))
                .build()?;
            Ok(Arc::new(OpenAiModerator::new(
                http,
                config.moderation.openai_api_base.clone(),
                api_key,
                config.moderation.openai_model.clone(),
            )))
        }
    }
}
