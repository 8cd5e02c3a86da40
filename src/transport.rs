//! The seam to the layer that physically intercepts outgoing HTTP calls.
//!
//! A [Transport] is installed by the [Registry](crate::Registry) when its first mock server is
//! created and uninstalled when the registry is disposed. Once installed, the transport hands
//! every intercepted request to the [RequestHook] it received and emits the returned
//! [MockResponse] to the caller instead of touching the network.
use crate::common::{
    data::{MockResponse, RequestPayload},
    error::Error,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Resolves an intercepted request to the response that should be emitted.
pub type RequestHook = Arc<dyn Fn(RequestPayload) -> MockResponse + Send + Sync>;

pub trait Transport: Send + Sync {
    /// Starts intercepting requests. Must not call `hook` before returning.
    fn install(&self, hook: RequestHook) -> Result<(), Error>;

    /// Stops intercepting requests and drops the hook.
    fn uninstall(&self);
}

/// A transport that intercepts nothing on its own. Requests are passed to the registry
/// explicitly, e.g. through [Registry::handle](crate::Registry::handle).
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTransport;

impl Transport for ManualTransport {
    fn install(&self, _hook: RequestHook) -> Result<(), Error> {
        tracing::trace!("Installed manual transport");
        Ok(())
    }

    fn uninstall(&self) {
        tracing::trace!("Uninstalled manual transport");
    }
}

/// An intercepted request whose headers and body are read lazily. The registry reads them only
/// for requests that target a registered mock server.
#[async_trait]
pub trait RequestSource: Send + Sync {
    fn method(&self) -> String;
    fn url(&self) -> String;
    async fn headers(&self) -> Vec<(String, String)>;
    async fn body(&self) -> Bytes;
}

#[async_trait]
impl RequestSource for RequestPayload {
    fn method(&self) -> String {
        RequestPayload::method(self).to_string()
    }

    fn url(&self) -> String {
        RequestPayload::url(self).to_string()
    }

    async fn headers(&self) -> Vec<(String, String)> {
        RequestPayload::headers(self).clone()
    }

    async fn body(&self) -> Bytes {
        RequestPayload::body(self).clone()
    }
}

#[async_trait]
impl RequestSource for http::Request<Bytes> {
    fn method(&self) -> String {
        http::Request::method(self).to_string()
    }

    fn url(&self) -> String {
        self.uri().to_string()
    }

    async fn headers(&self) -> Vec<(String, String)> {
        http::Request::headers(self)
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect()
    }

    async fn body(&self) -> Bytes {
        http::Request::body(self).clone()
    }
}
