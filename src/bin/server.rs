//! HTTP API for Ask360.
//!
//! Minimal HTTP/1.1 handling directly over tokio: POST /ask answers a
//! question, GET / and GET /health are liveness endpoints. Handler failures
//! are returned as a JSON error envelope rather than a dropped connection.

use ask360::Assistant;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let port = std::env::var("ASK360_PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let assistant = Arc::new(Assistant::new());
    let listener = TcpListener::bind(&addr).await?;
    info!("Ask360 API listening on http://{}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("New connection from {}", peer);
        let assistant = Arc::clone(&assistant);
        tokio::spawn(handle_connection(stream, assistant));
    }
}

async fn handle_connection(mut stream: TcpStream, assistant: Arc<Assistant>) {
    let request = match read_request(&mut stream).await {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to read request: {}", e);
            return;
        }
    };

    let response = handle_request(&request, &assistant).await;
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        error!("Failed to write response: {}", e);
    }
}

/// Read until the headers are complete and, if Content-Length says so, the
/// full body has arrived. Capped at MAX_REQUEST_BYTES.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut data: Vec<u8> = Vec::new();
    let mut buffer = [0u8; 4096];

    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            break;
        }

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .take_while(|line| !line.is_empty())
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    if key.trim().eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&data).into_owned())
}

async fn handle_request(request: &str, assistant: &Assistant) -> String {
    let request_line = request.lines().next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return create_response(400, "Bad Request", r#"{"error":"Malformed request"}"#);
    };

    // Strip query string and trailing slash.
    let path = path.split('?').next().unwrap_or(path);
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    info!("Request: {} {}", method, path);

    match (method, path) {
        ("GET", "/") => create_response(
            200,
            "OK",
            r#"{"message":"Ask360 API - POST /ask with {'question': 'your question'}"}"#,
        ),
        ("GET", "/health") => create_response(200, "OK", r#"{"status":"ok"}"#),
        ("POST", "/ask") => {
            let question = extract_question(request);
            if question.is_empty() {
                return create_response(400, "Bad Request", r#"{"error":"Question is required"}"#);
            }

            match assistant.answer(&question) {
                Ok(answer) => match serde_json::to_string(&answer) {
                    Ok(body) => create_response(200, "OK", &body),
                    Err(e) => {
                        error!("Failed to serialize answer: {}", e);
                        create_response(
                            500,
                            "Internal Server Error",
                            r#"{"error":"Failed to serialize response"}"#,
                        )
                    }
                },
                Err(e) => {
                    error!("Failed to answer question '{}': {}", question, e);
                    let envelope = serde_json::json!({ "error": e.to_string() });
                    create_response(
                        500,
                        "Internal Server Error",
                        &envelope.to_string(),
                    )
                }
            }
        }
        ("OPTIONS", _) => create_response(200, "OK", ""),
        _ => create_response(
            404,
            "Not Found",
            &format!(r#"{{"error":"Endpoint not found: {} {}"}}"#, method, path),
        ),
    }
}

fn extract_question(request: &str) -> String {
    let body_start = request.find("\r\n\r\n").unwrap_or(request.len());
    let body = request[body_start..].trim();

    let Some(json_start) = body.find('{') else {
        return String::new();
    };
    match serde_json::from_str::<serde_json::Value>(&body[json_start..]) {
        Ok(json) => json
            .get("question")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        Err(_) => String::new(),
    }
}

fn create_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        status,
        status_text,
        body.len(),
        body
    )
}
