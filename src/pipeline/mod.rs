//! Stages of the news pipeline, in the order a record passes through them:
//! source → validate → dedupe → media gate → redact.

pub mod dedupe;
pub mod media_gate;
pub mod redact;
pub mod source;
pub mod validate;
