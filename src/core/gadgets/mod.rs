//! Gadget inventory endpoints and codename generation

pub mod api;
pub mod names;

pub use api::{GadgetApiError, GadgetApiState, gadget_api_router};
