//! Pending destruction records and the policy that bounds them

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Default validity window of a confirmation code (5 minutes)
pub const DEFAULT_CODE_TTL_SECS: i64 = 5 * 60;

/// Default number of confirmation attempts per code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Expiry window and attempt budget applied to every pending destruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestructionPolicy {
    pub code_ttl: Duration,
    pub max_attempts: u32,
}

impl Default for DestructionPolicy {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(DEFAULT_CODE_TTL_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl DestructionPolicy {
    pub fn code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// An issued, not yet confirmed destruction of one gadget
#[derive(Clone)]
pub struct PendingDestruction {
    pub item_id: Uuid,
    code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Confirmation attempts made against this record
    pub attempts: u32,
}

impl PendingDestruction {
    pub fn new(item_id: Uuid, code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            item_id,
            code,
            issued_at,
            expires_at: issued_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            attempts: 0,
        }
    }

    /// Strictly after `expires_at`; a confirmation exactly at the deadline is still valid
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, supplied: &str) -> bool {
        self.code == supplied
    }

    /// Whether this record was issued with `code` at `issued_at`
    pub(crate) fn is_issue(&self, code: &str, issued_at: DateTime<Utc>) -> bool {
        self.issued_at == issued_at && self.code == code
    }
}

impl std::fmt::Debug for PendingDestruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingDestruction")
            .field("item_id", &self.item_id)
            .field("code", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("attempts", &self.attempts)
            .finish()
    }
}
