//! Pipeline policy constants and default source layout.
//!
//! The thresholds here are fixed policy and are not part of the runtime
//! configuration.

/// Minimum description length, in characters, for a record to be published
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Best-match similarity at or above which a description counts as a duplicate
pub const DUPLICATE_THRESHOLD: f64 = 0.8;

/// Replacement for the middle four digits of a phone number
pub const PHONE_MASK: &str = "****";

// Default header text, as produced by the submission form
pub const TIMESTAMP_HEADER: &str = "Timestamp";
pub const TITLE_HEADER: &str = "News Title";
pub const DESCRIPTION_HEADER: &str = "News Description";
pub const CITY_HEADER: &str = "City";
pub const CATEGORY_HEADER: &str = "Topic/Category";
pub const IMAGE_HEADER: &str = "Please also Upload an Image about it";
pub const PUBLISHER_NAME_HEADER: &str = "Publishers First Name";
pub const PUBLISHER_PHONE_HEADER: &str = "Publishers Phone Number";

// Source defaults
pub const DEFAULT_RANGE: &str = "sheet1!A:H";
pub const DEFAULT_CREDENTIALS_FILE: &str = "google-service-account.json";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

// Moderation defaults
pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const OPENAI_MODERATION_MODEL: &str = "omni-moderation-latest";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MODERATION_TIMEOUT_SECS: u64 = 5;
