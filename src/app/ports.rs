use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Read-only access to a rectangular range of a spreadsheet.
///
/// Rows come back exactly as the store returns them: the first row is the
/// header, and trailing empty cells may be missing from any row.
#[async_trait]
pub trait SheetRowsPort: Send + Sync {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<String>>>;
}

/// Decision returned by an image moderation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationVerdict {
    Approved,
    Flagged,
}

/// A content moderation backend for attached image references
#[async_trait]
pub trait ImageModerationPort: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn moderate(&self, image_reference: &str) -> Result<ModerationVerdict>;
}
