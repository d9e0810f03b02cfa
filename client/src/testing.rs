//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::config::ClientConfig;
use crate::net::error::TransportError;
use crate::net::gateway::Gateway;
use crate::net::transport::{Method, RawResponse, RequestDescriptor, Transport};
use crate::state::token_store::{MemoryBackend, TokenStore};

pub const BASE_URL: &str = "http://api.test/api/v1";

enum Reply {
    Ready(Result<RawResponse, TransportError>),
    Deferred(oneshot::Receiver<RawResponse>),
}

struct Route {
    method: Method,
    url: String,
    reply: Reply,
    hook: Option<Box<dyn Fn()>>,
}

/// Replies are one-shot and matched by method + exact URL, in registration
/// order. Unmatched requests fail as transport errors.
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<RequestDescriptor>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes.borrow_mut().push(Route { method, url: format!("{BASE_URL}{path}"), reply, hook: None });
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Reply::Ready(Ok(RawResponse::new(status, body))));
    }

    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: &serde_json::Value) {
        self.respond(method, path, status, &body.to_string());
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Reply::Ready(Err(TransportError::new(message))));
    }

    /// Reply with whatever is later sent on the returned channel.
    pub fn defer(&self, method: Method, path: &str) -> oneshot::Sender<RawResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Deferred(rx));
        tx
    }

    /// Run `hook` when the most recently registered route is hit, before it replies.
    pub fn on_last(&self, hook: impl Fn() + 'static) {
        if let Some(route) = self.routes.borrow_mut().last_mut() {
            route.hook = Some(Box::new(hook));
        }
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<RequestDescriptor> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: RequestDescriptor) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
        let matched = {
            let mut routes = self.routes.borrow_mut();
            routes
                .iter()
                .position(|route| route.method == request.method && route.url == request.url)
                .map(|index| routes.remove(index))
        };
        let label = format!("{} {}", request.method, request.url);
        self.requests.borrow_mut().push(request);

        Box::pin(async move {
            let Some(route) = matched else {
                return Err(TransportError::new(format!("no mock route for {label}")));
            };
            if let Some(hook) = route.hook {
                hook();
            }
            match route.reply {
                Reply::Ready(result) => result,
                Reply::Deferred(rx) => rx.await.map_err(|_| TransportError::new("mock reply dropped")),
            }
        })
    }
}

/// Gateway over a fresh in-memory store and the given mock.
pub fn gateway(mock: &Rc<MockTransport>) -> (Gateway, TokenStore, MemoryBackend) {
    let backend = MemoryBackend::new();
    let store = TokenStore::new(Rc::new(backend.clone()));
    let gateway = Gateway::new(ClientConfig::new(Some(BASE_URL)), store.clone(), mock.clone());
    (gateway, store, backend)
}

pub fn user_json(id: i64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "is_active": true,
        "is_superuser": false,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    })
}

/// Yield once to the executor.
pub fn yield_now() -> impl Future<Output = ()> {
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    YieldNow(false)
}
