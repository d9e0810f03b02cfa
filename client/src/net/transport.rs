//! Raw HTTP exchange beneath the gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway owns URL/header/body policy; a `Transport` only moves one
//! `RequestDescriptor` over the wire and hands back status + body text.
//! Client-side (hydrate) this is `gloo-net`; the CLI plugs in `reqwest`;
//! non-browser builds of this crate get [`UnavailableTransport`].

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::fmt;

use futures::future::LocalBoxFuture;

use super::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace `name`, keeping its original position on replace.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            *slot = (name, value);
        } else {
            self.0.push((name, value));
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Apply every header in `other` over `self`; `other` wins.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One fully resolved outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<String>,
}

/// Status and body text of a response, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// Perform the exchange. `Err` only when no response was produced.
    fn send(&self, request: RequestDescriptor) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>>;
}

/// Transport for builds without a network layer (SSR, plain unit tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTransport;

impl Transport for UnavailableTransport {
    fn send(&self, _request: RequestDescriptor) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
        Box::pin(async { Err(TransportError::new("not available on server")) })
    }
}

/// `fetch`-backed transport via `gloo-net`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

#[cfg(feature = "hydrate")]
impl Transport for BrowserTransport {
    fn send(&self, request: RequestDescriptor) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
        use gloo_net::http::{Method as GlooMethod, RequestBuilder};

        Box::pin(async move {
            let method = match request.method {
                Method::Get => GlooMethod::GET,
                Method::Post => GlooMethod::POST,
                Method::Put => GlooMethod::PUT,
                Method::Patch => GlooMethod::PATCH,
                Method::Delete => GlooMethod::DELETE,
            };
            let mut builder = RequestBuilder::new(&request.url).method(method);
            for (name, value) in request.headers.iter() {
                builder = builder.header(name, value);
            }
            let built = match request.body {
                Some(body) => builder.body(body),
                None => builder.build(),
            }
            .map_err(|e| TransportError::new(e.to_string()))?;

            let resp = built.send().await.map_err(|e| TransportError::new(e.to_string()))?;
            let status = resp.status();
            let body = resp.text().await.map_err(|e| TransportError::new(e.to_string()))?;
            Ok(RawResponse { status, body })
        })
    }
}

/// The transport the process-wide gateway uses.
pub fn default_transport() -> std::rc::Rc<dyn Transport> {
    #[cfg(feature = "hydrate")]
    {
        std::rc::Rc::new(BrowserTransport)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::rc::Rc::new(UnavailableTransport)
    }
}
