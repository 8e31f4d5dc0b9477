#![allow(dead_code)]

use serde_json::json;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::Command;
use std::thread::{self, JoinHandle};

pub const NEWTON_PAYLOAD: &str = r#"{"definition":"A body keeps its state of motion unless a net force acts on it.","keyPoints":["Law of inertia","Mass measures inertia","Valid in inertial frames"],"example":{"title":"Inertia on a bus","content":"Passengers lurch forward when the bus brakes."}}"#;

/// Answers one request with a canned JSON response; the handle yields the
/// raw request text.
pub fn serve_once(status_line: &'static str, body: String) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .expect("response should be written");
        request
    });
    (addr, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = stream.read(&mut chunk).expect("request read should succeed");
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
        if let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn gemini_body(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
}

pub fn commons_body(url: &str) -> String {
    json!({"query": {"pages": {"42": {"index": 1, "imageinfo": [{"url": url}]}}}}).to_string()
}

/// The binary with every variable it reads cleared, so the caller's shell
/// and `.env` cannot leak into a test.
pub fn scholarsync_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scholarsync"));
    for key in [
        "GEMINI_API_KEY",
        "API_KEY",
        "MODEL_PROVIDER",
        "MODEL",
        "MODEL_BASE_URL",
        "IMAGE_SEARCH",
        "IMAGE_SEARCH_URL",
        "LOG_FORMAT",
        "LOG_OUTPUT",
        "LOG_FILE_PATH",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("RUST_LOG", "scholarsync=info");
    cmd
}
