//! Navigation guard evaluated before every route change.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard must decide synchronously, before the session has finished
//! hydrating, so it reads the token store rather than `AuthState`. Token
//! presence is only a proxy; the session demotes to anonymous afterwards if the
//! token turns out to be invalid.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::routes::{self, FALLBACK_PATH, LOGIN_ROUTE, RouteMatch};
use crate::state::token_store::TokenStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigate to this location instead.
    Redirect(String),
}

/// Decide whether `target` may be entered.
pub fn guard(target: &RouteMatch, store: &TokenStore) -> GuardDecision {
    if !target.route.requires_auth {
        return GuardDecision::Allow;
    }
    if store.get().is_some() {
        return GuardDecision::Allow;
    }
    if target.route.name == LOGIN_ROUTE {
        return GuardDecision::Allow;
    }
    log::debug!("guard: no token, redirecting {} to login", target.full_path);
    GuardDecision::Redirect(routes::login_location(&target.full_path))
}

/// Resolve `full_path` and guard it; unknown paths redirect to the fallback.
pub fn navigate_decision(full_path: &str, store: &TokenStore) -> GuardDecision {
    match routes::resolve(full_path) {
        Some(target) => guard(&target, store),
        None => GuardDecision::Redirect(FALLBACK_PATH.to_owned()),
    }
}
