//! Database repositories for GadgetVault
//!
//! Repositories encapsulate data access logic and give the API layer and the
//! destruction coordinator a typed view of the database.

pub mod gadget;
pub mod user;

pub use gadget::{GadgetRepository, GadgetRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
