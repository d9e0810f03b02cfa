//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical guard behavior and read the same
//! reactive copy of the session.
//!
//! DESIGN
//! ======
//! [`RouteGate`] decides while it renders, so a protected view is never built
//! for a location the guard rejects.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;

use crate::guard::{GuardDecision, navigate_decision};
use crate::state::auth::{AuthState, Session};
use crate::state::token_store::{self, TokenStore};

/// Mirror `session` into a signal and provide it as context.
pub fn provide_session_context(session: &Session) -> RwSignal<AuthState> {
    let auth = RwSignal::new(session.state());
    session.subscribe(move |state| auth.set(state.clone()));
    provide_context(auth);
    auth
}

/// Guard decision for the current value of `location`. Tracks `location`.
pub fn route_decision(location: Signal<String>, store: &TokenStore) -> GuardDecision {
    navigate_decision(&location.get(), store)
}

/// Render `children` only when the guard allows `location`; otherwise
/// replace the current entry with the redirect target.
#[component]
pub fn RouteGate(location: Signal<String>, children: ChildrenFn) -> impl IntoView {
    move || match route_decision(location, &token_store::global()) {
        GuardDecision::Allow => children().into_any(),
        GuardDecision::Redirect(target) => {
            let options = NavigateOptions { replace: true, ..NavigateOptions::default() };
            view! { <Redirect path=target options=options /> }.into_any()
        }
    }
}
