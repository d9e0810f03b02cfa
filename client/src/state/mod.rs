//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! The token store persists a single credential; the session builds on it and
//! is the sole writer of the authenticated user.

pub mod auth;
pub mod token_store;
