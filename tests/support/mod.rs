//! A tiny HTTP/1.1 stub backend for integration tests.
//!
//! Routes are matched on method plus path (query included first, then the
//! bare path). Every request is recorded so tests can assert on what the
//! client actually sent.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn json(method: &'static str, path: &'static str, body: serde_json::Value) -> Self {
        Route {
            method,
            path,
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub cookie: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn start(routes: Vec<Route>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &routes, &log);
            }
        });

        StubServer { url, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests with the given method, in arrival order
    pub fn requests_with(&self, method: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

fn handle(stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Recorded>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut cookie = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "cookie" => cookie = Some(value.to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);

    let bare = path.split('?').next().unwrap_or_default();
    let route = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .or_else(|| routes.iter().find(|r| r.method == method && r.path == bare));
    let (status, payload) = match route {
        Some(r) => (r.status, r.body.clone()),
        None => (404, r#"{"message":"not found"}"#.to_string()),
    };

    log.lock().unwrap().push(Recorded {
        method,
        path,
        cookie,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Three top-level categories plus one child of the first
pub fn bakery_categories() -> serde_json::Value {
    serde_json::json!({
        "data": [
            {"id": 1, "name": "Bread", "parent_id": null, "sort": 10, "status": "active"},
            {"id": 2, "name": "Cakes", "parent_id": null, "sort": 20, "status": "active"},
            {"id": 3, "name": "Cookies", "parent_id": null, "sort": 30, "status": "inactive"},
            {"id": 4, "name": "Toast", "parent_id": 1, "sort": 10, "status": "active"}
        ]
    })
}
