//! Minimal HTTP/1.1 upload server for integration tests.
//!
//! Implements the session API under `/api/` (initiate, batch, complete, abort)
//! and accepts part PUTs at `/parts/<n>`, answering with a quoted ETag. One
//! request per connection (`Connection: close`).

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

#[derive(Default)]
pub struct ServerState {
    pub part_size: u64,
    pub batch_size: usize,
    pub total_parts: u32,
    pub parts: BTreeMap<u32, Vec<u8>>,
    /// `parts` body of the last complete-upload request.
    pub completed_with: Option<Value>,
    pub aborted: Vec<String>,
    /// Part number whose first PUT is answered with 503.
    pub flaky_part: Option<u32>,
    pub flaky_tripped: bool,
    pub authorization: Option<String>,
}

pub struct UploadServer {
    pub base_url: String,
    pub state: Arc<Mutex<ServerState>>,
}

impl UploadServer {
    /// Assembled object: stored parts concatenated in part-number order.
    pub fn assembled(&self) -> Vec<u8> {
        let st = self.state.lock().unwrap();
        st.parts.values().flat_map(|b| b.iter().copied()).collect()
    }
}

/// Start a server in a background thread. `base_url` points at the API root
/// (e.g. "http://127.0.0.1:12345/api/"). Runs until the process exits.
pub fn start(part_size: u64, batch_size: usize, flaky_part: Option<u32>) -> UploadServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(ServerState {
        part_size,
        batch_size,
        flaky_part,
        ..ServerState::default()
    }));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, port, &state));
        }
    });
    UploadServer {
        base_url: format!("http://127.0.0.1:{}/api/", port),
        state,
    }
}

struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);
    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn respond_json(stream: &mut TcpStream, value: &Value) {
    let body = serde_json::to_vec(value).unwrap();
    respond(stream, "200 OK", "Content-Type: application/json\r\n", &body);
}

fn handle(mut stream: TcpStream, port: u16, state: &Mutex<ServerState>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let req = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();

    if req.method == "PUT" {
        if let ["parts", n] = segments.as_slice() {
            let n: u32 = match n.parse() {
                Ok(n) => n,
                Err(_) => return respond(&mut stream, "400 Bad Request", "", b""),
            };
            let mut st = state.lock().unwrap();
            if st.flaky_part == Some(n) && !st.flaky_tripped {
                st.flaky_tripped = true;
                drop(st);
                return respond(&mut stream, "503 Service Unavailable", "", b"");
            }
            st.parts.insert(n, req.body);
            drop(st);
            let etag = format!("ETag: \"etag-{}\"\r\n", n);
            return respond(&mut stream, "200 OK", &etag, b"");
        }
        return respond(&mut stream, "404 Not Found", "", b"");
    }

    if req.method != "POST" {
        return respond(&mut stream, "405 Method Not Allowed", "", b"");
    }
    let body: Value = match serde_json::from_slice(&req.body) {
        Ok(v) => v,
        Err(_) => return respond(&mut stream, "400 Bad Request", "", b"bad json"),
    };
    let mut st = state.lock().unwrap();
    if let Some((_, v)) = req.headers.iter().find(|(k, _)| k == "authorization") {
        st.authorization = Some(v.clone());
    }

    match segments.as_slice() {
        ["api", "uploads", "initiate"] => {
            let file_size = body["fileSize"].as_u64().unwrap_or(0);
            st.total_parts = file_size.div_ceil(st.part_size) as u32;
            let value = json!({
                "uploadId": "srv-1",
                "bucket": body["bucket"],
                "objectKey": format!("{}/{}", body["path"].as_str().unwrap_or(""), body["fileName"].as_str().unwrap_or("")),
                "multipartUploadInfo": {
                    "partSizeBytes": st.part_size,
                    "totalParts": st.total_parts,
                    "presignedUrlsBatchSize": st.batch_size,
                    "totalBatches": (st.total_parts as usize).div_ceil(st.batch_size),
                }
            });
            drop(st);
            respond_json(&mut stream, &value);
        }
        ["api", "uploads", _, "presigned-urls", "batch"] => {
            let confirmed: Vec<u32> = body["confirmedETags"]
                .as_array()
                .map(|a| a.iter().filter_map(|r| r["partNumber"].as_u64()).map(|n| n as u32).collect())
                .unwrap_or_default();
            let total = st.total_parts;
            let is_complete = (1..=total).all(|n| confirmed.contains(&n));
            let urls: Vec<Value> = (1..=total)
                .filter(|n| !confirmed.contains(n))
                .take(st.batch_size)
                .map(|n| json!({ "partNumber": n, "url": format!("http://127.0.0.1:{}/parts/{}", port, n) }))
                .collect();
            let value = json!({
                "progress": {
                    "completedParts": confirmed.len(),
                    "totalParts": total,
                    "percentComplete": 0.0,
                    "isComplete": is_complete,
                },
                "presignedUrls": urls,
            });
            drop(st);
            respond_json(&mut stream, &value);
        }
        ["api", "complete-upload"] => {
            st.completed_with = Some(body["parts"].clone());
            let id = body["uploadId"].as_str().unwrap_or("").to_string();
            drop(st);
            respond_json(&mut stream, &json!({ "fileUrl": format!("https://files.example/{}", id) }));
        }
        ["api", "abort-upload"] => {
            let id = body["uploadId"].as_str().unwrap_or("").to_string();
            st.aborted.push(id);
            drop(st);
            respond_json(&mut stream, &json!({ "ok": true }));
        }
        _ => {
            drop(st);
            respond(&mut stream, "404 Not Found", "", b"");
        }
    }
}
