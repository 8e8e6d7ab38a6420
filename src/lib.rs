//! GadgetVault - Gadget inventory service
//!
//! A REST backend for tracking field gadgets. Gadgets are destroyed through a
//! two-phase request/confirm sequence guarded by a short-lived code.

pub mod core;
