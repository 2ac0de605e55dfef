use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app::ports::{ImageModerationPort, ModerationVerdict};
use crate::error::Result;
use crate::observability::metrics;

/// What the gate decides when the moderation backend errors out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the image as safe and publish the record
    FailOpen,
    /// Treat the image as unsafe and drop the record
    #[default]
    FailClosed,
}

/// Approve/reject decision point for an item's attached image reference.
///
/// The backend is swappable; the gate owns the timeout and failure policy so
/// every backend gets the same semantics.
pub struct MediaGate {
    moderator: Arc<dyn ImageModerationPort>,
    timeout: Duration,
    on_error: FailurePolicy,
}

impl MediaGate {
    pub fn new(
        moderator: Arc<dyn ImageModerationPort>,
        timeout: Duration,
        on_error: FailurePolicy,
    ) -> Self {
        Self {
            moderator,
            timeout,
            on_error,
        }
    }

    /// Gate backed by [`AllowAllModerator`]
    pub fn allow_all() -> Self {
        Self::new(
            Arc::new(AllowAllModerator),
            Duration::from_secs(crate::constants::DEFAULT_MODERATION_TIMEOUT_SECS),
            FailurePolicy::FailClosed,
        )
    }

    pub fn backend_name(&self) -> &'static str {
        self.moderator.backend_name()
    }

    /// A timeout always counts as unsafe; backend errors follow the policy.
    pub async fn is_safe(&self, image_reference: &str) -> bool {
        let backend = self.moderator.backend_name();
        let started = std::time::Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.moderator.moderate(image_reference)).await;
        metrics::moderation::call_duration(started.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(ModerationVerdict::Approved)) => true,
            Ok(Ok(ModerationVerdict::Flagged)) => {
                debug!(backend, image = %image_reference, "Image flagged by moderation");
                false
            }
            Ok(Err(e)) => {
                metrics::moderation::backend_error(backend);
                let safe = self.on_error == FailurePolicy::FailOpen;
                warn!(
                    backend,
                    image = %image_reference,
                    policy = ?self.on_error,
                    "Image moderation failed: {}", e
                );
                safe
            }
            Err(_) => {
                metrics::moderation::timeout(backend);
                warn!(
                    backend,
                    image = %image_reference,
                    timeout_secs = self.timeout.as_secs(),
                    "Image moderation timed out, treating as unsafe"
                );
                false
            }
        }
    }
}

/// Placeholder backend that approves every image
pub struct AllowAllModerator;

#[async_trait]
impl ImageModerationPort for AllowAllModerator {
    fn backend_name(&self) -> &'static str {
        "allow_all"
    }

    async fn moderate(&self, _image_reference: &str) -> Result<ModerationVerdict> {
        Ok(ModerationVerdict::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;

    struct FixedModerator(ModerationVerdict);

    #[async_trait]
    impl ImageModerationPort for FixedModerator {
        fn backend_name(&self) -> &'static str {
            "fixed"
        }

        async fn moderate(&self, _image_reference: &str) -> Result<ModerationVerdict> {
            Ok(self.0)
        }
    }

    struct FailingModerator;

    #[async_trait]
    impl ImageModerationPort for FailingModerator {
        fn backend_name(&self) -> &'static str {
            "failing"
        }

        async fn moderate(&self, _image_reference: &str) -> Result<ModerationVerdict> {
            Err(FeedError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    struct SlowModerator;

    #[async_trait]
    impl ImageModerationPort for SlowModerator {
        fn backend_name(&self) -> &'static str {
            "slow"
        }

        async fn moderate(&self, _image_reference: &str) -> Result<ModerationVerdict> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ModerationVerdict::Approved)
        }
    }

    fn gate(moderator: impl ImageModerationPort + 'static, on_error: FailurePolicy) -> MediaGate {
        MediaGate::new(Arc::new(moderator), Duration::from_millis(50), on_error)
    }

    #[tokio::test]
    async fn test_allow_all_approves() {
        assert!(MediaGate::allow_all().is_safe("https://example.com/a.jpg").await);
    }

    #[tokio::test]
    async fn test_flagged_is_unsafe() {
        let gate = gate(FixedModerator(ModerationVerdict::Flagged), FailurePolicy::FailOpen);
        assert!(!gate.is_safe("https://example.com/a.jpg").await);
    }

    #[tokio::test]
    async fn test_backend_error_fail_closed() {
        let gate = gate(FailingModerator, FailurePolicy::FailClosed);
        assert!(!gate.is_safe("https://example.com/a.jpg").await);
    }

    #[tokio::test]
    async fn test_backend_error_fail_open() {
        let gate = gate(FailingModerator, FailurePolicy::FailOpen);
        assert!(gate.is_safe("https://example.com/a.jpg").await);
    }

    #[tokio::test]
    async fn test_timeout_is_unsafe_even_when_failing_open() {
        let gate = gate(SlowModerator, FailurePolicy::FailOpen);
        assert!(!gate.is_safe("https://example.com/a.jpg").await);
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: FailurePolicy = serde_json::from_str("\"fail_open\"").unwrap();
        assert_eq!(policy, FailurePolicy::FailOpen);
        assert_eq!(FailurePolicy::default(), FailurePolicy::FailClosed);
    }
}
