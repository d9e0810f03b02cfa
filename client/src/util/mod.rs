//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate reactive/browser glue from the session and gateway
//! logic to improve reuse and testability.

pub mod auth;
