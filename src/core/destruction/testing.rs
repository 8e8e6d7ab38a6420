//! In-memory collaborators for coordinator tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use super::clock::Clock;
use super::code::{CodeGenerator, NumericCodeGenerator};
use super::notifier::{DestructionNotice, Notifier, NotifyError};
use super::store::{ItemStore, ItemStoreError};
use crate::core::db::models::{Gadget, GadgetStatus, StatusTimestamp};

pub struct MemoryItemStore {
    gadgets: Mutex<HashMap<Uuid, Gadget>>,
    update_calls: AtomicUsize,
    failing_reads: AtomicBool,
    failing_updates: AtomicBool,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self {
            gadgets: Mutex::new(HashMap::new()),
            update_calls: AtomicUsize::new(0),
            failing_reads: AtomicBool::new(false),
            failing_updates: AtomicBool::new(false),
        }
    }

    pub fn insert(&self, status: GadgetStatus) -> Gadget {
        let now = Utc::now();
        let gadget = Gadget {
            id: Uuid::new_v4(),
            name: format!("Gadget {}", self.gadgets.lock().unwrap().len() + 1),
            status,
            owner_id: Some(Uuid::new_v4()),
            decommissioned_at: None,
            destroyed_at: (status == GadgetStatus::Destroyed).then_some(now),
            created_at: now,
            updated_at: now,
        };
        self.gadgets
            .lock()
            .unwrap()
            .insert(gadget.id, gadget.clone());
        gadget
    }

    pub fn get(&self, id: Uuid) -> Option<Gadget> {
        self.gadgets.lock().unwrap().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) {
        self.gadgets.lock().unwrap().remove(&id);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_updates(&self, failing: bool) {
        self.failing_updates.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gadget>, ItemStoreError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(ItemStoreError("connection refused".to_string()));
        }
        Ok(self.get(id))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: GadgetStatus,
        timestamp: StatusTimestamp,
        at: DateTime<Utc>,
    ) -> Result<Option<Gadget>, ItemStoreError> {
        if self.failing_updates.load(Ordering::SeqCst) {
            return Err(ItemStoreError("connection reset".to_string()));
        }
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut gadgets = self.gadgets.lock().unwrap();
        Ok(gadgets.get_mut(&id).map(|gadget| {
            gadget.status = status;
            match timestamp {
                StatusTimestamp::DecommissionedAt => gadget.decommissioned_at = Some(at),
                StatusTimestamp::DestroyedAt => gadget.destroyed_at = Some(at),
            }
            gadget.updated_at = at;
            gadget.clone()
        }))
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Hands out the given codes in order, then falls back to random ones
pub struct ScriptedCodes {
    codes: Mutex<VecDeque<String>>,
}

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| NumericCodeGenerator.generate())
    }
}

pub struct RecordingNotifier {
    notices: Mutex<Vec<DestructionNotice>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn notices(&self) -> Vec<DestructionNotice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &DestructionNotice) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("mail relay unreachable".to_string()));
        }
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
