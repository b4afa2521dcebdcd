//! Remote cart API client.
//!
//! The server keeps its own copy of a logged-in user's cart. The controller
//! mirrors local mutations into it through three calls:
//!
//! - `POST /api/cart` with `{product_id, quantity}` - upsert one line
//! - `DELETE /api/cart/{product_id}` - remove one line
//! - `DELETE /api/cart/clear` - remove every line
//!
//! Success is an HTTP 2xx status; response bodies are ignored.

use std::future::Future;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use storecart_core::{Price, ProductId, ServerLineId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::RemoteApiConfig;

/// Errors that can occur when talking to the remote cart.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Server returned {status} for {method} {path}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Session cookie is not a valid header value.
    #[error("Invalid session cookie: {0}")]
    InvalidCookie(String),
}

/// Server-side cart operations used for mirroring.
pub trait RemoteCart {
    /// Create or replace the line for `product_id` with `quantity`.
    fn upsert(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove the line for `product_id`.
    fn remove(&self, product_id: ProductId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove every line.
    fn clear(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

impl<T: RemoteCart + ?Sized> RemoteCart for &T {
    fn upsert(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).upsert(product_id, quantity)
    }

    fn remove(&self, product_id: ProductId) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).remove(product_id)
    }

    fn clear(&self) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).clear()
    }
}

/// Body of an upsert request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A line of the server's cart as returned by `GET /api/cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLineItem {
    pub id: ServerLineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
}

// =============================================================================
// HttpRemoteCart
// =============================================================================

/// `reqwest` client for the storefront's cart API.
#[derive(Clone)]
pub struct HttpRemoteCart {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRemoteCart {
    /// Create a client from API configuration.
    ///
    /// The session cookie, when configured, is sent with every request.
    ///
    /// # Errors
    ///
    /// Returns error if the cookie is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &RemoteApiConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();

        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie.expose_secret())
                .map_err(|e| RemoteError::InvalidCookie(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base_url.join(path)?)
    }

    fn check(
        method: &'static str,
        url: &Url,
        response: &reqwest::Response,
    ) -> Result<(), RemoteError> {
        let status = response.status();
        if status.is_success() {
            debug!(method, path = url.path(), status = status.as_u16(), "Remote cart call succeeded");
            return Ok(());
        }
        Err(RemoteError::Status {
            method,
            path: url.path().to_string(),
            status: status.as_u16(),
        })
    }

    /// Fetch the server's current cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the status is not a success, or
    /// the body is not a list of cart lines.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<RemoteLineItem>, RemoteError> {
        let url = self.endpoint("api/cart")?;
        let response = self.client.get(url.clone()).send().await?;
        Self::check("GET", &url, &response)?;
        Ok(response.json().await?)
    }
}

impl RemoteCart for HttpRemoteCart {
    #[instrument(skip(self))]
    async fn upsert(&self, product_id: ProductId, quantity: u32) -> Result<(), RemoteError> {
        let url = self.endpoint("api/cart")?;
        let response = self
            .client
            .post(url.clone())
            .json(&UpsertRequest {
                product_id,
                quantity,
            })
            .send()
            .await?;
        Self::check("POST", &url, &response)
    }

    #[instrument(skip(self))]
    async fn remove(&self, product_id: ProductId) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("api/cart/{product_id}"))?;
        let response = self.client.delete(url.clone()).send().await?;
        Self::check("DELETE", &url, &response)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), RemoteError> {
        let url = self.endpoint("api/cart/clear")?;
        let response = self.client.delete(url.clone()).send().await?;
        Self::check("DELETE", &url, &response)
    }
}

// =============================================================================
// Offline
// =============================================================================

/// Remote for anonymous sessions: every call succeeds without I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RemoteCart for Offline {
    async fn upsert(&self, _product_id: ProductId, _quantity: u32) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn remove(&self, _product_id: ProductId) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(base: &str) -> RemoteApiConfig {
        RemoteApiConfig::anonymous(Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoints_resolve_against_base() {
        let remote = HttpRemoteCart::new(&config("http://shop.test/")).unwrap();
        assert_eq!(
            remote.endpoint("api/cart").unwrap().as_str(),
            "http://shop.test/api/cart"
        );
        assert_eq!(
            remote.endpoint("api/cart/7").unwrap().as_str(),
            "http://shop.test/api/cart/7"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path_prefix() {
        let remote = HttpRemoteCart::new(&config("http://shop.test/store/")).unwrap();
        assert_eq!(
            remote.endpoint("api/cart/clear").unwrap().as_str(),
            "http://shop.test/store/api/cart/clear"
        );
    }

    #[test]
    fn test_invalid_cookie_rejected() {
        let mut cfg = config("http://shop.test/");
        cfg.session_cookie = Some(SecretString::from("session=bad\nvalue"));
        assert!(matches!(
            HttpRemoteCart::new(&cfg),
            Err(RemoteError::InvalidCookie(_))
        ));
    }

    #[test]
    fn test_upsert_body_shape() {
        let body = serde_json::to_value(UpsertRequest {
            product_id: ProductId::new(4),
            quantity: 3,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"product_id": 4, "quantity": 3}));
    }

    #[test]
    fn test_remote_line_item_decodes_server_shape() {
        let raw = r#"{"id": 11, "product_id": 4, "name": "Mug", "price": 8.5, "image_url": null, "quantity": 2}"#;
        let line: RemoteLineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(line.id, ServerLineId::new(11));
        assert_eq!(line.product_id, ProductId::new(4));
        assert_eq!(line.price, Price::from_cents(850).unwrap());
        assert!(line.image_url.is_none());
    }

    #[tokio::test]
    async fn test_offline_never_fails() {
        let remote = Offline;
        remote.upsert(ProductId::new(1), 2).await.unwrap();
        remote.remove(ProductId::new(1)).await.unwrap();
        remote.clear().await.unwrap();
    }
}
