//! # client
//!
//! Session and request gateway for the PromptWorks browser client.
//!
//! This crate owns the access-token store, the authenticated request gateway,
//! typed resource calls, the session state machine, and the navigation guard.
//! Views are built elsewhere on top of these modules.

pub mod config;
pub mod guard;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;

#[cfg(test)]
mod testing;

/// WASM entry point: install logging, then confirm any persisted token.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    let session = state::auth::global();
    wasm_bindgen_futures::spawn_local(async move {
        session.load_user().await;
    });
}
