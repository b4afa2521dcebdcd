//! Integration test support for Storecart.
//!
//! [`MockCartApi`] is an in-process `axum` server speaking the storefront's
//! cart API. Tests point an `HttpRemoteCart` (or a whole `CartController`)
//! at it and then inspect what the server received.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storecart-integration-tests
//! ```
//!
//! # Routes
//!
//! - `GET /api/cart` - list lines
//! - `POST /api/cart` - set a product's quantity
//! - `DELETE /api/cart/clear` - remove every line
//! - `DELETE /api/cart/{product_id}` - remove one line

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::COOKIE};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use parking_lot::Mutex;
use secrecy::SecretString;
use storecart_core::{Price, ProductId, ServerLineId};
use storecart_storefront::RemoteApiConfig;
use storecart_storefront::remote::{RemoteLineItem, UpsertRequest};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Session cookie the mock accepts when started with
/// [`MockCartApi::start_authenticated`].
pub const TEST_SESSION_COOKIE: &str = "session=integration-test";

/// A request the mock server received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Upsert { product_id: ProductId, quantity: u32 },
    Remove(ProductId),
    Clear,
}

#[derive(Debug, Clone)]
struct ServerLine {
    id: ServerLineId,
    quantity: u32,
}

#[derive(Debug, Default)]
struct MockState {
    lines: BTreeMap<ProductId, ServerLine>,
    catalog: BTreeMap<ProductId, (String, Price)>,
    calls: Vec<ApiCall>,
    next_line_id: i32,
    required_cookie: Option<String>,
    fail_from: Option<usize>,
}

impl MockState {
    /// Record a call and decide how to answer it.
    fn admit(&mut self, call: ApiCall, headers: &HeaderMap) -> Result<(), StatusCode> {
        let index = self.calls.len();
        self.calls.push(call);

        if let Some(expected) = &self.required_cookie {
            let sent = headers.get(COOKIE).and_then(|v| v.to_str().ok());
            if sent != Some(expected.as_str()) {
                return Err(StatusCode::UNAUTHORIZED);
            }
        }
        if self.fail_from.is_some_and(|from| index >= from) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }

    fn listing(&self) -> Vec<RemoteLineItem> {
        self.lines
            .iter()
            .map(|(&product_id, line)| {
                let (name, price) = self
                    .catalog
                    .get(&product_id)
                    .cloned()
                    .unwrap_or_else(|| (format!("Product {product_id}"), Price::ZERO));
                RemoteLineItem {
                    id: line.id,
                    product_id,
                    name,
                    price,
                    image_url: None,
                    quantity: line.quantity,
                }
            })
            .collect()
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// In-process mock of the remote cart API.
///
/// The server task is aborted when the value is dropped.
pub struct MockCartApi {
    base_url: Url,
    state: SharedState,
    task: JoinHandle<()>,
}

impl MockCartApi {
    /// Start a server that accepts every request.
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        Self::spawn(MockState::default()).await
    }

    /// Start a server that answers 401 unless the request carries
    /// [`TEST_SESSION_COOKIE`].
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn start_authenticated() -> std::io::Result<Self> {
        Self::spawn(MockState {
            required_cookie: Some(TEST_SESSION_COOKIE.to_string()),
            ..MockState::default()
        })
        .await
    }

    async fn spawn(state: MockState) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/")).map_err(std::io::Error::other)?;
        let state = Arc::new(Mutex::new(state));
        let app = router(Arc::clone(&state));

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            state,
            task,
        })
    }

    /// Base URL the `/api/cart` routes live under.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// API configuration of a logged-in user pointing at this server.
    #[must_use]
    pub fn authenticated_config(&self) -> RemoteApiConfig {
        RemoteApiConfig {
            base_url: self.base_url(),
            session_cookie: Some(SecretString::from(TEST_SESSION_COOKIE)),
            timeout: Duration::from_secs(5),
        }
    }

    /// API configuration without a session cookie.
    #[must_use]
    pub fn anonymous_config(&self) -> RemoteApiConfig {
        RemoteApiConfig {
            timeout: Duration::from_secs(5),
            ..RemoteApiConfig::anonymous(self.base_url())
        }
    }

    /// Register the name and price the server reports for a product.
    pub fn add_product(&self, product_id: ProductId, name: &str, price: Price) {
        self.state
            .lock()
            .catalog
            .insert(product_id, (name.to_string(), price));
    }

    /// Put a line into the server cart without recording a call.
    pub fn seed(&self, product_id: ProductId, quantity: u32) {
        let mut state = self.state.lock();
        state.next_line_id += 1;
        let id = ServerLineId::new(state.next_line_id);
        state.lines.insert(product_id, ServerLine { id, quantity });
    }

    /// Answer 500 to the call at `index` (zero-based, counting every call
    /// received so far) and every call after it.
    pub fn fail_from(&self, index: usize) {
        self.state.lock().fail_from = Some(index);
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Product quantities currently held by the server.
    #[must_use]
    pub fn quantities(&self) -> BTreeMap<ProductId, u32> {
        self.state
            .lock()
            .lines
            .iter()
            .map(|(&product_id, line)| (product_id, line.quantity))
            .collect()
    }
}

impl Drop for MockCartApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/cart", get(list_cart).post(upsert_line))
        .route("/api/cart/clear", delete(clear_cart))
        .route("/api/cart/{product_id}", delete(remove_line))
        .with_state(state)
}

async fn list_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    if let Err(status) = state.admit(ApiCall::List, &headers) {
        return status.into_response();
    }
    Json(state.listing()).into_response()
}

async fn upsert_line(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<UpsertRequest>,
) -> StatusCode {
    let mut state = state.lock();
    let call = ApiCall::Upsert {
        product_id: request.product_id,
        quantity: request.quantity,
    };
    if let Err(status) = state.admit(call, &headers) {
        return status;
    }

    if request.quantity == 0 {
        state.lines.remove(&request.product_id);
        return StatusCode::OK;
    }
    if let Some(line) = state.lines.get_mut(&request.product_id) {
        line.quantity = request.quantity;
        return StatusCode::OK;
    }
    state.next_line_id += 1;
    let id = ServerLineId::new(state.next_line_id);
    state.lines.insert(
        request.product_id,
        ServerLine {
            id,
            quantity: request.quantity,
        },
    );
    StatusCode::CREATED
}

async fn remove_line(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product_id): Path<ProductId>,
) -> StatusCode {
    let mut state = state.lock();
    if let Err(status) = state.admit(ApiCall::Remove(product_id), &headers) {
        return status;
    }
    if state.lines.remove(&product_id).is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    let mut state = state.lock();
    if let Err(status) = state.admit(ApiCall::Clear, &headers) {
        return status;
    }
    state.lines.clear();
    StatusCode::OK
}
