//! Out-of-band delivery of confirmation codes
//!
//! The coordinator never assumes a confirmation code is safe to hand back to
//! whoever asked for the destruction. Codes go through a [`Notifier`], which a
//! deployment backs with e-mail, SMS or a pager. [`LogNotifier`] writes the
//! code to the service log and is meant for local development only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A confirmation code addressed to a gadget's owner
#[derive(Clone)]
pub struct DestructionNotice {
    pub gadget_id: Uuid,
    pub gadget_name: String,
    /// Owner of the gadget, if one is recorded
    pub recipient: Option<Uuid>,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for DestructionNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestructionNotice")
            .field("gadget_id", &self.gadget_id)
            .field("gadget_name", &self.gadget_name)
            .field("recipient", &self.recipient)
            .field("code", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &DestructionNotice) -> Result<(), NotifyError>;
}

/// Development notifier that writes codes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &DestructionNotice) -> Result<(), NotifyError> {
        tracing::info!(
            gadget_id = %notice.gadget_id,
            gadget = %notice.gadget_name,
            recipient = ?notice.recipient,
            code = %notice.code,
            expires_at = %notice.expires_at,
            "Destruction confirmation code issued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> DestructionNotice {
        DestructionNotice {
            gadget_id: Uuid::new_v4(),
            gadget_name: "Silent Falcon".to_string(),
            recipient: None,
            code: "482913".to_string(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_debug_redacts_code() {
        let debug = format!("{:?}", notice());

        assert!(!debug.contains("482913"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("Silent Falcon"));
    }

    #[tokio::test]
    async fn test_log_notifier_always_delivers() {
        assert!(LogNotifier.notify(&notice()).await.is_ok());
    }
}
