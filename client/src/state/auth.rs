//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. [`Session`] owns the only
//! mutable copy of [`AuthState`]; everyone else reads snapshots or subscribes.
//!
//! DESIGN
//! ======
//! `is_authenticated` is derived from a user fetched with the current token,
//! never from token presence alone. A failed hydration always lands in the
//! logged-out state so "invalid token" and "never logged in" look the same.
//! Concurrent `load_user` calls are not de-duplicated; the last one to finish
//! decides `user`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::net::api;
use crate::net::error::{AuthFailure, user_message};
use crate::net::gateway::{self, Gateway};
use crate::net::types::{Credentials, User};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed, check username and password";
pub const SIGNUP_FAILED_MESSAGE: &str = "Sign-up failed, please try again later";

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Loading,
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

type Observer = Rc<dyn Fn(&AuthState)>;

struct Inner {
    gateway: Gateway,
    state: RefCell<AuthState>,
    token: RefCell<Option<String>>,
    observers: RefCell<Vec<Observer>>,
}

/// Handle to the session state machine. Clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Rc<Inner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl Session {
    /// Start anonymous, remembering whatever token the store already holds.
    pub fn new(gateway: Gateway) -> Self {
        let token = gateway.token_store().get();
        Self {
            inner: Rc::new(Inner {
                gateway,
                state: RefCell::new(AuthState::default()),
                token: RefCell::new(token),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// In-memory token reference (not a store read).
    pub fn token(&self) -> Option<String> {
        self.inner.token.borrow().clone()
    }

    /// Call `observer` with a snapshot after every state change.
    pub fn subscribe(&self, observer: impl Fn(&AuthState) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    fn update(&self, apply: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        let observers = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(&snapshot);
        }
    }

    /// Log in and hydrate with the issued token.
    ///
    /// On success the token is written before hydration starts. A blank issued
    /// token or a hydration failure after a successful login is absorbed (the
    /// session ends up anonymous) and still returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] when the login call itself fails; session
    /// state is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthFailure> {
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        let issued = match api::login(&self.inner.gateway, &credentials).await {
            Ok(token) => token.access_token,
            Err(source) => {
                log::warn!("auth: login failed: {source}");
                let message = user_message(&source, true, LOGIN_FAILED_MESSAGE);
                return Err(AuthFailure { message, source });
            }
        };
        let Some(token) = non_blank(Some(issued)) else {
            log::warn!("auth: login for {username} returned a blank token");
            self.logout();
            return Ok(());
        };

        *self.inner.token.borrow_mut() = Some(token.clone());
        self.inner.gateway.token_store().set(Some(&token));
        self.hydrate(&token).await;
        if self.is_authenticated() {
            log::info!("auth: logged in as {username}");
        }
        Ok(())
    }

    /// Register an account. Never touches session state and does not log in.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] with the service's `detail` message when
    /// present, otherwise a generic one.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        api::signup(&self.inner.gateway, &credentials).await.map_err(|source| {
            log::warn!("auth: signup failed: {source}");
            let message = user_message(&source, false, SIGNUP_FAILED_MESSAGE);
            AuthFailure { message, source }
        })
    }

    /// Confirm the current token with the service and populate `user`.
    pub async fn load_user(&self) {
        let token = non_blank(self.token()).or_else(|| self.inner.gateway.token_store().get());
        let Some(token) = token else {
            self.update(|state| state.user = None);
            return;
        };
        self.hydrate(&token).await;
    }

    async fn hydrate(&self, token: &str) {
        self.update(|state| state.loading = true);
        match api::fetch_current_user_with_token(&self.inner.gateway, token).await {
            Ok(user) => self.update(|state| {
                state.user = Some(user);
                state.loading = false;
            }),
            Err(e) => {
                log::warn!("auth: load current user failed: {e}");
                self.logout();
                self.update(|state| state.loading = false);
            }
        }
    }

    /// Drop the token everywhere and forget the user. Safe to repeat.
    pub fn logout(&self) {
        *self.inner.token.borrow_mut() = None;
        self.inner.gateway.token_store().clear();
        self.update(|state| state.user = None);
    }
}

fn non_blank(token: Option<String>) -> Option<String> {
    token.filter(|token| !token.trim().is_empty())
}

thread_local! {
    static GLOBAL_SESSION: Session = Session::new(gateway::global());
}

/// The process-wide session, created on first access.
pub fn global() -> Session {
    GLOBAL_SESSION.with(Session::clone)
}
