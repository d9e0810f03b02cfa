//! Native HTTP transport.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plugs `reqwest` in beneath the shared gateway so the CLI sends exactly the
//! requests the browser client would.

use client::net::error::TransportError;
use client::net::transport::{Method, RawResponse, RequestDescriptor, Transport};
use futures::future::LocalBoxFuture;

#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: RequestDescriptor) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let RequestDescriptor { url, method, headers, body } = request;
            tracing::debug!(%method, %url, "sending request");

            let mut builder = self.client.request(reqwest_method(method), &url);
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| TransportError::new(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| TransportError::new(e.to_string()))?;
            tracing::debug!(status, %url, "response received");
            Ok(RawResponse::new(status, body))
        })
    }
}
