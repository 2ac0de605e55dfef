pub mod factory;
pub mod openai_moderation;
pub mod service_account;
pub mod sheets_client;
