//! Core domain: persistence, authentication, gadget inventory and the
//! two-phase destruction workflow

pub mod auth;
pub mod config;
pub mod db;
pub mod destruction;
pub mod gadgets;
pub mod server;
