//! Two-phase gadget destruction
//!
//! A destruction is requested first and applied only after the requester
//! presents the confirmation code that was delivered out of band. Codes are
//! valid for a fixed window and a limited number of attempts.

pub mod clock;
pub mod code;
pub mod coordinator;
pub mod notifier;
pub mod pending;
pub mod store;
pub mod sweeper;
#[cfg(test)]
mod testing;

pub use clock::{Clock, SystemClock};
pub use code::{CodeGenerator, NumericCodeGenerator};
pub use coordinator::{DestructionCoordinator, DestructionError, DestructionTicket};
pub use notifier::{DestructionNotice, LogNotifier, Notifier, NotifyError};
pub use pending::{DestructionPolicy, PendingDestruction};
pub use store::{ItemStore, ItemStoreError};
pub use sweeper::{DEFAULT_SWEEP_INTERVAL, ExpirySweeper};
