//! In-process HTTP fake shared by unit tests.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::http::{HttpResponse, HttpTransport, TransportError};

/// CURLE_COULDNT_CONNECT
const COULDNT_CONNECT: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Recorded {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Routes keyed by method and exact URL; anything unrouted fails like a
/// refused connection.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), HttpResponse>>,
    log: Mutex<Vec<Recorded>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: Method, url: &str, status: u32, content_type: &str, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            (method, url.to_string()),
            HttpResponse {
                status,
                content_type: Some(content_type.to_string()),
                body: body.to_vec(),
            },
        );
    }

    pub fn html(&self, url: &str, html: &str) {
        self.route(Method::Get, url, 200, "text/html; charset=utf-8", html.as_bytes());
    }

    pub fn json(&self, method: Method, url: &str, status: u32, body: Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.route(method, url, status, "application/json", &bytes);
    }

    /// Make every request to `url` take at least `delay`.
    pub fn slow(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    fn answer(&self, method: Method, url: &str, body: Option<Value>) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(Recorded {
            method,
            url: url.to_string(),
            body,
        });
        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.routes
            .lock()
            .unwrap()
            .get(&(method, url.to_string()))
            .cloned()
            .ok_or_else(|| TransportError::Curl(curl::Error::new(COULDNT_CONNECT as _)))
    }
}

impl HttpTransport for FakeTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.answer(Method::Get, url, None)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        self.answer(Method::Post, url, Some(body.clone()))
    }
}

/// A legal-looking document long enough to pass extraction.
pub(crate) fn policy_html(title: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body><h1>{title}</h1><p>{}</p></body></html>",
        "You agree that any dispute will be resolved by binding arbitration. ".repeat(5)
    )
}
