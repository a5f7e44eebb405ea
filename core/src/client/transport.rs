// HTTP transport seam
//
// The context builds requests; a `Transport` only moves bytes. Native builds
// use `UreqTransport`; tests plug in a mock.

use super::envelope::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes { content_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string().into_bytes(),
        }
    }
}

/// Executes a single HTTP exchange. Non-2xx statuses are responses, not errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::UreqTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use std::io::Read;
    use std::time::Duration;

    /// Blocking transport with a cookie store, so session cookies set by the
    /// backend ride along on later requests.
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            let mut req = self.agent.request(request.method.as_str(), &request.url);
            for (name, value) in &request.headers {
                req = req.set(name, value);
            }

            let result = match request.body {
                None => req.call(),
                Some(RequestBody::Json(value)) => req.send_json(value),
                Some(RequestBody::Bytes { content_type, data }) => {
                    req.set("Content-Type", &content_type).send_bytes(&data)
                }
            };

            let response = match result {
                Ok(response) => response,
                Err(ureq::Error::Status(_, response)) => response,
                Err(ureq::Error::Transport(e)) => return Err(ClientError::Network(e.to_string())),
            };

            let status = response.status();
            let mut body = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut body)
                .map_err(|e| ClientError::Network(e.to_string()))?;

            Ok(HttpResponse { status, body })
        }
    }
}
