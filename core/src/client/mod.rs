//! Backend client context
//!
//! All dashboard data comes from the backend API as `{ success, data, error }`
//! envelopes. `ApiContext` owns everything a front end needs to talk to it:
//! the transport, the persisted device id, a query cache with a stale time,
//! and a subscription to the session bus so a logout in one context clears
//! every other context's cache.
//!
//! Contexts are explicit values with an `init` / `dispose` lifecycle, so tests
//! and multiple front ends can run independent instances side by side.

mod cache;
mod envelope;
mod session;
mod transport;

pub use cache::QueryCache;
pub use envelope::{ApiEnvelope, ClientError};
pub use session::{SessionBus, SessionEvent};
pub use transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::UreqTransport;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::store::{load_or_create_device_id, StorageBackend};
use crate::validation::{validate_file_extension, validate_file_size, SizeLimits};

/// Header carrying the persisted device id.
pub const DEVICE_ID_HEADER: &str = "X-Device-Id";

pub const LOGOUT_PATH: &str = "/auth/logout";
pub const UPLOAD_PATH: &str = "/builds/upload";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API root, e.g. `https://api.betadrop.app/api`
    pub base_url: String,
    /// How long a cached query result is served without refetching
    pub stale_time: Duration,
    pub request_timeout: Duration,
    /// Upload ceilings checked before any bytes are sent
    pub size_limits: SizeLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.betadrop.app/api".to_string(),
            stale_time: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            size_limits: SizeLimits::default(),
        }
    }
}

pub struct ApiContext {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    device_id: String,
    cache: QueryCache,
    bus: SessionBus,
    session_rx: Mutex<broadcast::Receiver<SessionEvent>>,
    disposed: AtomicBool,
}

impl ApiContext {
    /// Create a context: load (or mint) the device id and join the session bus.
    pub fn init(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: &dyn StorageBackend,
        bus: &SessionBus,
    ) -> Result<Self, ClientError> {
        let device_id = load_or_create_device_id(storage)?;
        tracing::debug!("API context ready for {} (device {})", config.base_url, device_id);

        Ok(Self {
            cache: QueryCache::new(config.stale_time),
            config,
            transport,
            device_id,
            bus: bus.clone(),
            session_rx: Mutex::new(bus.subscribe()),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Clear the cache and refuse every later call. Safe to call twice.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.cache.clear();
            tracing::debug!("API context for device {} disposed", self.device_id);
        }
    }

    /// Send one request and decode the envelope.
    pub fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        self.ensure_active()?;

        let request = HttpRequest {
            method,
            url: join_url(&self.config.base_url, path),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                (DEVICE_ID_HEADER.to_string(), self.device_id.clone()),
            ],
            body,
        };
        self.send(request)
    }

    /// `GET` and unwrap the envelope.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.fetch(Method::Get, path, None)?.into_result()
    }

    /// Cached `GET`. A fresh cached value under `key` is returned without I/O.
    pub fn query<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T, ClientError> {
        self.ensure_active()?;

        if let Some(value) = self.cache.get_fresh(key) {
            tracing::debug!("Query cache hit: {}", key);
            return serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()));
        }

        tracing::debug!("Query cache miss: {}", key);
        let value: serde_json::Value = self.get(path)?;
        let decoded = serde_json::from_value(value.clone())
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.cache.insert(key, value);
        Ok(decoded)
    }

    /// Drop cached queries whose key starts with `prefix`.
    pub fn invalidate(&self, prefix: &str) -> usize {
        self.cache.invalidate_prefix(prefix)
    }

    /// Validate locally, then upload the artifact.
    ///
    /// An invalid file never reaches the transport.
    pub fn upload_build(
        &self,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<serde_json::Value, ClientError> {
        self.ensure_active()?;

        let platform = validate_file_extension(file_name)?;
        validate_file_size(platform, data.len() as u64, &self.config.size_limits)?;

        let request = HttpRequest {
            method: Method::Post,
            url: join_url(&self.config.base_url, UPLOAD_PATH),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                (DEVICE_ID_HEADER.to_string(), self.device_id.clone()),
                ("X-File-Name".to_string(), file_name.to_string()),
                ("X-Platform".to_string(), platform.as_str().to_string()),
            ],
            body: Some(RequestBody::Bytes {
                content_type: "application/octet-stream".to_string(),
                data,
            }),
        };

        let result = self.send::<serde_json::Value>(request)?.into_result()?;
        self.cache.invalidate_prefix("builds");
        Ok(result)
    }

    /// Log out on the backend, then clear this and every other context's cache.
    ///
    /// Local state is cleared even when the backend call fails.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.ensure_active()?;

        let result = self.fetch::<serde_json::Value>(Method::Post, LOGOUT_PATH, None);
        self.cache.clear();
        self.bus.publish(SessionEvent::LoggedOut);

        match result {
            Ok(envelope) if !envelope.success => Err(ClientError::Api(
                envelope.error.unwrap_or_else(|| "Logout failed".to_string()),
            )),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<ApiEnvelope<T>, ClientError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.execute(request)?;

        if response.status == 401 {
            tracing::warn!("{} {} rejected: session expired", method.as_str(), url);
            self.cache.clear();
            self.bus.publish(SessionEvent::SessionExpired);
        }

        // 204 and other bodiless successes carry no envelope.
        if (200..300).contains(&response.status)
            && response.body.iter().all(u8::is_ascii_whitespace)
        {
            return Ok(ApiEnvelope {
                success: true,
                data: None,
                error: None,
            });
        }

        serde_json::from_slice(&response.body).map_err(|_| {
            tracing::warn!("{} {} returned non-envelope body (HTTP {})", method.as_str(), url, response.status);
            ClientError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }
        })
    }

    /// Fail if disposed, and apply session events published by other contexts.
    fn ensure_active(&self) -> Result<(), ClientError> {
        if self.is_disposed() {
            return Err(ClientError::Disposed);
        }
        self.sync_session();
        Ok(())
    }

    fn sync_session(&self) {
        let mut rx = self.session_rx.lock();
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    tracing::debug!("Session event {:?}: clearing query cache", event);
                    self.cache.clear();
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!("Missed {} session events: clearing query cache", skipped);
                    self.cache.clear();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

impl Drop for ApiContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Join the API root and a path with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
