//! Networking modules for the PromptWorks REST service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` is the only place that talks to a [`transport::Transport`]; `api`
//! layers typed endpoints on top, and `types` defines the shared wire schema.

pub mod api;
pub mod error;
pub mod gateway;
pub mod transport;
pub mod types;
