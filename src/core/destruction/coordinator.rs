//! Two-phase destruction coordinator
//!
//! Destroying a gadget takes two calls. [`DestructionCoordinator::begin`]
//! checks the gadget, mints a confirmation code and sends it through the
//! [`Notifier`]. [`DestructionCoordinator::confirm`] checks the supplied code
//! against the pending record and, on a match, applies the irreversible
//! `Destroyed` transition through the [`ItemStore`].
//!
//! # Record lifecycle
//!
//! ```text
//! Absent --begin--> Pending --confirm(ok)--------------> Confirmed (removed)
//!                   Pending --confirm(wrong code)-------> Pending (attempts + 1)
//!                   Pending --confirm(after expiry)-----> Expired (removed)
//!                   Pending --confirm(budget spent)-----> Exhausted (removed)
//!                   Pending --begin------------------------> Pending (superseded)
//! ```
//!
//! # Concurrency
//!
//! Pending records live in a [`DashMap`] keyed by gadget id. Every
//! read-modify-write on a record happens while holding that key's entry, so
//! racing confirmations for the same gadget are serialized while different
//! gadgets proceed in parallel. A matching confirmation removes the record
//! before the item store is called, which makes it the only caller allowed to
//! destroy. No entry is held across an `.await`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::code::{CodeGenerator, NumericCodeGenerator};
use super::notifier::{DestructionNotice, Notifier};
use super::pending::{DestructionPolicy, PendingDestruction};
use super::store::{ItemStore, ItemStoreError};
use crate::core::db::models::{Gadget, GadgetStatus, StatusTimestamp};

/// Destruction workflow errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DestructionError {
    #[error("Gadget not found")]
    GadgetNotFound,

    #[error("No pending destruction request found or the request has expired")]
    NoPendingDestruction,

    #[error("Gadget is already destroyed")]
    AlreadyDestroyed,

    #[error("Please provide the confirmation code")]
    MissingCode,

    #[error("Confirmation code has expired. Please initiate a new destruction request")]
    Expired,

    #[error("Too many failed attempts. Please initiate a new destruction request")]
    AttemptsExhausted,

    #[error("Invalid confirmation code")]
    CodeMismatch { remaining_attempts: u32 },

    #[error("Item store error: {0}")]
    Store(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<ItemStoreError> for DestructionError {
    fn from(err: ItemStoreError) -> Self {
        DestructionError::Store(err.0)
    }
}

/// Result of a successful [`DestructionCoordinator::begin`]
#[derive(Clone)]
pub struct DestructionTicket {
    pub item_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in_seconds: i64,
}

impl std::fmt::Debug for DestructionTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestructionTicket")
            .field("item_id", &self.item_id)
            .field("code", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}

/// Owns every pending destruction and is the only component that destroys gadgets
#[derive(Clone)]
pub struct DestructionCoordinator {
    pending: Arc<DashMap<Uuid, PendingDestruction>>,
    store: Arc<dyn ItemStore>,
    notifier: Arc<dyn Notifier>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    policy: DestructionPolicy,
}

impl DestructionCoordinator {
    /// Create a coordinator with random 6-digit codes, the wall clock and the default policy
    pub fn new(store: Arc<dyn ItemStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            store,
            notifier,
            codes: Arc::new(NumericCodeGenerator),
            clock: Arc::new(SystemClock),
            policy: DestructionPolicy::default(),
        }
    }

    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: DestructionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DestructionPolicy {
        self.policy
    }

    /// Start destroying a gadget.
    ///
    /// Replaces any pending request for the same gadget, which invalidates its code.
    pub async fn begin(&self, item_id: Uuid) -> Result<DestructionTicket, DestructionError> {
        let gadget = self
            .store
            .find_by_id(item_id)
            .await?
            .ok_or(DestructionError::GadgetNotFound)?;

        if gadget.status.is_terminal() {
            return Err(DestructionError::AlreadyDestroyed);
        }

        let code = self.codes.generate();
        let issued_at = self.clock.now();
        let record = PendingDestruction::new(item_id, code.clone(), issued_at, self.policy.code_ttl);
        let expires_at = record.expires_at;

        if self.pending.insert(item_id, record).is_some() {
            tracing::info!(%item_id, "Superseded previous pending destruction");
        }

        let notice = DestructionNotice {
            gadget_id: item_id,
            gadget_name: gadget.name,
            recipient: gadget.owner_id,
            code: code.clone(),
            expires_at,
        };

        if let Err(e) = self.notifier.notify(&notice).await {
            // Withdraw the record unless a newer request already replaced it
            self.pending
                .remove_if(&item_id, |_, record| record.is_issue(&code, issued_at));
            tracing::error!(%item_id, "Failed to deliver destruction code: {}", e);
            return Err(DestructionError::Notification(e.to_string()));
        }

        tracing::info!(%item_id, %expires_at, "Destruction initiated");

        Ok(DestructionTicket {
            item_id,
            code,
            expires_at,
            expires_in_seconds: self.policy.code_ttl.num_seconds(),
        })
    }

    /// Confirm a pending destruction and destroy the gadget.
    pub async fn confirm(
        &self,
        item_id: Uuid,
        supplied_code: Option<&str>,
    ) -> Result<Gadget, DestructionError> {
        let now = self.clock.now();
        let claimed = self.check_and_claim(item_id, supplied_code, now)?;

        match self.destroy(item_id, now).await {
            Ok(gadget) => {
                tracing::info!(%item_id, "Gadget destroyed");
                Ok(gadget)
            }
            Err(DestructionError::Store(e)) => {
                // The code was right, so the attempt is given back along with the record
                let mut claimed = claimed;
                claimed.attempts = claimed.attempts.saturating_sub(1);
                self.pending.entry(item_id).or_insert(claimed);
                tracing::error!(%item_id, "Destruction could not be applied: {}", e);
                Err(DestructionError::Store(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Validate a confirmation against the pending record, all under the record's lock.
    ///
    /// Returns the removed record when the code matches.
    fn check_and_claim(
        &self,
        item_id: Uuid,
        supplied_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PendingDestruction, DestructionError> {
        let Entry::Occupied(mut entry) = self.pending.entry(item_id) else {
            return Err(DestructionError::NoPendingDestruction);
        };

        let supplied = supplied_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(DestructionError::MissingCode)?;

        if entry.get().is_expired(now) {
            entry.remove();
            tracing::warn!(%item_id, "Confirmation attempted after expiry");
            return Err(DestructionError::Expired);
        }

        let attempts = {
            let record = entry.get_mut();
            record.attempts += 1;
            record.attempts
        };

        if attempts > self.policy.max_attempts {
            entry.remove();
            tracing::warn!(%item_id, "Confirmation attempts exhausted");
            return Err(DestructionError::AttemptsExhausted);
        }

        if !entry.get().matches(supplied) {
            let remaining_attempts = self.policy.max_attempts - attempts;
            tracing::warn!(%item_id, remaining_attempts, "Confirmation code mismatch");
            return Err(DestructionError::CodeMismatch { remaining_attempts });
        }

        Ok(entry.remove())
    }

    async fn destroy(&self, item_id: Uuid, now: DateTime<Utc>) -> Result<Gadget, DestructionError> {
        let gadget = self
            .store
            .find_by_id(item_id)
            .await?
            .ok_or(DestructionError::GadgetNotFound)?;

        if gadget.status.is_terminal() {
            return Err(DestructionError::AlreadyDestroyed);
        }

        self.store
            .update_status(
                item_id,
                GadgetStatus::Destroyed,
                StatusTimestamp::DestroyedAt,
                now,
            )
            .await?
            .ok_or(DestructionError::GadgetNotFound)
    }

    /// Drop every record past its expiry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.pending.len();
        self.pending.retain(|_, record| !record.is_expired(now));
        before.saturating_sub(self.pending.len())
    }

    pub fn has_pending(&self, item_id: &Uuid) -> bool {
        self.pending.contains_key(item_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Attempts recorded against the pending record for `item_id`
    pub fn attempts(&self, item_id: &Uuid) -> Option<u32> {
        self.pending.get(item_id).map(|record| record.attempts)
    }
}

// ============================================================================
// Tests
// ============================================================================
