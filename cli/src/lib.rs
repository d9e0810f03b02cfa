//! # promptworks-cli
//!
//! Command-line front end for the PromptWorks service. Reuses the `client`
//! crate's gateway and session with a `reqwest` transport and a file-backed
//! token store.

pub mod commands;
pub mod error;
pub mod token_file;
pub mod transport;

pub use commands::{Cli, Command, build_session, run};
pub use error::CliError;
