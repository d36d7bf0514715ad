//! Delivery Agent API Library Crate
//!
//! This library contains the web-facing pieces of the delivery agent:
//! configuration, shared state, the HTTP tool handlers and routing. The
//! binaries in `bin/` are thin wrappers around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
