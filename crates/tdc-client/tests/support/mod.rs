use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Route {
    method: String,
    target: String,
    status: u16,
    body: String,
}

pub fn route(method: &str, target: &str, status: u16, body: impl Into<String>) -> Route {
    Route {
        method: method.to_string(),
        target: target.to_string(),
        status,
        body: body.into(),
    }
}

/// Minimal HTTP/1.1 server answering canned responses, one request per connection.
///
/// A route matches on the full request target first and on the path without
/// the query string second. Unknown requests get a 404.
pub struct FakeServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve(stream, &routes, &recorded);
            }
        });
        Self {
            base_url: format!("http://{addr}/api/v1"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

fn serve(stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<Recorded>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let full_target = parts.next().unwrap_or_default().to_string();
    let target = full_target
        .strip_prefix("/api/v1")
        .unwrap_or(&full_target)
        .to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    let mut content_type = None;
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
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value),
                "content-type" => content_type = Some(value),
                _ => {}
            }
        }
    }
    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let path = target.split('?').next().unwrap_or_default().to_string();
    let reply = routes
        .iter()
        .find(|r| r.method == method && r.target == target)
        .or_else(|| routes.iter().find(|r| r.method == method && r.target == path))
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"error": "not found"}"#.to_string()));

    recorded.lock().expect("lock").push(Recorded {
        method,
        target,
        authorization,
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, payload) = reply;
    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        reason(status),
        payload.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Unknown",
    }
}
