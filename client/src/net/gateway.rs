//! Request gateway: the single path every API call takes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Resource clients in `net::api` describe *what* to call; the gateway decides
//! *how*: absolute URL, default headers, bearer token, and one error shape for
//! every non-2xx response. Nothing else in the crate talks to a `Transport`.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures pass through untouched. Non-2xx responses always become
//! `ApiError::Http` with the status and a best-effort decoded body. A 2xx body
//! that is not JSON is not an error; it degrades to a JSON string.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, HttpError};
use super::transport::{Headers, Method, RequestDescriptor, Transport, default_transport};
use crate::config::{ClientConfig, join_url};
use crate::state::token_store::{self, TokenStore};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const NO_CONTENT: u16 = 204;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Encoded as `application/x-www-form-urlencoded`. The caller must set the
    /// matching `Content-Type`; the gateway default stays JSON.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Result<Self, ApiError> {
        serde_json::to_value(payload).map(Self::Json).map_err(ApiError::Encode)
    }

    fn encode(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Form(pairs) => encode_form(pairs),
        }
    }
}

/// Per-call method, extra headers, and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Headers,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Send `token` instead of whatever the store holds.
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION, bearer_value(token))
    }
}

pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn encode_form(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// JSON when parseable, raw text otherwise, `None` for an empty body.
pub fn decode_body(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("gateway: response is not JSON, keeping raw text: {e}");
            Some(Value::String(text.to_owned()))
        }
    }
}

#[derive(Clone)]
pub struct Gateway {
    base_url: String,
    store: TokenStore,
    transport: Rc<dyn Transport>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(config: ClientConfig, store: TokenStore, transport: Rc<dyn Transport>) -> Self {
        Self { base_url: config.base_url, store, transport }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Resolve URL and headers for one call without sending it.
    pub fn build_request(&self, path: &str, options: RequestOptions) -> RequestDescriptor {
        let mut headers = Headers::new().with(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if !options.headers.contains(AUTHORIZATION) {
            if let Some(token) = self.store.get() {
                headers.set(AUTHORIZATION, bearer_value(&token));
            }
        }
        headers.merge(&options.headers);

        RequestDescriptor {
            url: join_url(&self.base_url, path),
            method: options.method,
            headers,
            body: options.body.as_ref().map(RequestBody::encode),
        }
    }

    /// Send one call. `Ok(None)` for 204 or an empty 2xx body.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Option<Value>, ApiError> {
        let request = self.build_request(path, options);
        log::debug!(
            "gateway: {} {} (authorized: {})",
            request.method,
            request.url,
            request.headers.contains(AUTHORIZATION)
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let payload = decode_body(&response.body);
            return Err(HttpError::from_response(response.status, payload).into());
        }
        if response.status == NO_CONTENT {
            return Ok(None);
        }
        Ok(decode_body(&response.body))
    }

    /// Send one call and decode the body into `T`.
    ///
    /// A 204/empty body is decoded from `null`, so `T = Option<_>` or `()` sees
    /// nothing while a struct type gets `ApiError::Decode`.
    pub async fn request_as<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        let value = self.request(path, options).await?;
        serde_json::from_value(value.unwrap_or(Value::Null)).map_err(ApiError::Decode)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_as(path, RequestOptions::new(Method::Get)).await
    }

    pub async fn send_json<T, B>(&self, method: Method, path: &str, payload: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(method).body(RequestBody::json(payload)?);
        self.request_as(path, options).await
    }

    /// `DELETE` whose response body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(path, RequestOptions::new(Method::Delete)).await?;
        Ok(())
    }
}

thread_local! {
    static GLOBAL_GATEWAY: Gateway =
        Gateway::new(ClientConfig::from_build_env(), token_store::global(), default_transport());
}

/// The process-wide gateway, created on first access.
pub fn global() -> Gateway {
    GLOBAL_GATEWAY.with(Gateway::clone)
}
