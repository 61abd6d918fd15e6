// crates/suggest-contract-core/tests/common/mod.rs
// ============================================================================
// Module: Test Stubs
// Description: Loopback HTTP stubs for the registry and the service under test.
// Purpose: Exercise real HTTP clients without external services.
// Dependencies: tiny_http, tempfile
// ============================================================================

//! ## Overview
//! [`StubServer`] answers every request through a handler closure and keeps
//! a transcript of what it received. The server shuts down on drop.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test binaries.")]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only helpers favor direct unwrap/expect for clarity."
)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Request headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Returns the first header value with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned stub response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl StubResponse {
    /// JSON response with the given status.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Empty response with the given status.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Loopback HTTP server driven by a handler closure.
pub struct StubServer {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Starts the server on an ephemeral loopback port.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("stub server"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut body = Vec::new();
                    let _ = request.as_reader().read_to_end(&mut body);
                    let recorded = RecordedRequest {
                        method: request.method().as_str().to_string(),
                        url: request.url().to_string(),
                        headers: request
                            .headers()
                            .iter()
                            .map(|header| {
                                (header.field.as_str().to_string(), header.value.to_string())
                            })
                            .collect(),
                        body,
                    };
                    let reply = handler(&recorded);
                    requests.lock().unwrap().push(recorded);
                    let response = Response::from_string(reply.body)
                        .with_status_code(reply.status)
                        .with_header(
                            Header::from_bytes("Content-Type", "application/json").unwrap(),
                        );
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            server,
            handle: Some(handle),
            requests,
        }
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.server.server_addr())
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Writes a registry data file into `dir`.
pub fn write_data_file(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Registry body for a record with a published attachment.
pub fn record_body(record_id: &str, location: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": record_id,
            "last_modified": 1_700_000_000_000_u64,
            "attachment": {
                "location": location,
                "filename": format!("{record_id}.png"),
                "mimetype": "image/png",
                "hash": "abc123",
                "size": 512
            }
        }
    })
}
