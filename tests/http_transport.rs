//! HttpTransport against a local server serving canned responses
use reqwest::Method;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use uhoo_api::{Error, HttpTransport, Transport};

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Read one request, headers plus a Content-Length body
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Answer a single request; the receiver yields the raw request text
async fn serve_once(
    status: &str,
    content_type: Option<&str>,
    body: &str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    if let Some(content_type) = content_type {
        response.push_str(&format!("Content-Type: {}\r\n", content_type));
    }
    response.push_str("\r\n");
    response.push_str(body);

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        let _ = tx.send(request);
    });

    (format!("http://{}", addr), rx)
}

#[tokio::test]
async fn decodes_json_without_auth_header() {
    let (base_url, request) =
        serve_once("200 OK", Some("application/json"), r#"{"success": true}"#).await;
    let transport = HttpTransport::default();

    let result = transport
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap();

    assert_eq!(result, json!({"success": true}));
    let request = request.await.unwrap();
    assert!(request.starts_with("GET /test HTTP/1.1"));
    assert!(!request.to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn sends_bearer_token() {
    let (base_url, request) = serve_once("200 OK", Some("application/json"), "{}").await;
    let mut transport = HttpTransport::new(reqwest::Client::new());
    transport.set_bearer_token(Some("test-token".into()));

    transport
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap();

    let request = request.await.unwrap().to_lowercase();
    assert!(request.contains("authorization: bearer test-token"));
}

#[tokio::test]
async fn sends_form_body() {
    let (base_url, request) =
        serve_once("200 OK", Some("application/json"), r#"{"data": []}"#).await;
    let transport = HttpTransport::default();

    let form = vec![
        ("serialNumber", "UHOO12345".to_string()),
        ("mode", "minute".to_string()),
        ("limit", "5".to_string()),
    ];
    let result = transport
        .request(Method::POST, &base_url, "getdata", Some(form))
        .await
        .unwrap();

    assert_eq!(result, json!({"data": []}));
    let request = request.await.unwrap();
    assert!(request.starts_with("POST /getdata HTTP/1.1"));
    assert!(request
        .to_lowercase()
        .contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.ends_with("serialNumber=UHOO12345&mode=minute&limit=5"));
}

#[tokio::test]
async fn returns_text_for_other_content_types() {
    let (base_url, _request) = serve_once("200 OK", Some("text/plain"), "pong").await;

    let result = HttpTransport::default()
        .request(Method::GET, &base_url, "ping", None)
        .await
        .unwrap();

    assert_eq!(result, Value::String("pong".into()));
}

#[tokio::test]
async fn empty_json_body_is_null() {
    let (base_url, _request) = serve_once("200 OK", Some("application/json"), "").await;

    let result = HttpTransport::default()
        .request(Method::POST, &base_url, "generatetoken", None)
        .await
        .unwrap();

    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn maps_401_to_unauthorized() {
    let (base_url, _request) = serve_once(
        "401 Unauthorized",
        Some("application/json"),
        r#"{"error": "Unauthorized"}"#,
    )
    .await;

    let err = HttpTransport::default()
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Unauthorized(ref body) if body.contains("Unauthorized")));
}

#[tokio::test]
async fn maps_403_to_forbidden() {
    let (base_url, _request) = serve_once("403 Forbidden", Some("text/plain"), "Forbidden").await;

    let err = HttpTransport::default()
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Forbidden(ref body) if body == "Forbidden"));
}

#[tokio::test]
async fn maps_other_statuses_to_request_error() {
    let (base_url, _request) = serve_once(
        "500 Internal Server Error",
        Some("application/json"),
        r#"{"error": "Server Error"}"#,
    )
    .await;

    let err = HttpTransport::default()
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { status: Some(500), .. }));
    assert!(err.to_string().contains("Error requesting data"));
}

#[tokio::test]
async fn malformed_json_is_request_error() {
    let (base_url, _request) = serve_once("200 OK", Some("application/json"), "{not json").await;

    let err = HttpTransport::default()
        .request(Method::GET, &base_url, "test", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { status: None, .. }));
}

#[tokio::test]
async fn connection_failure_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpTransport::default()
        .request(Method::GET, &format!("http://{}", addr), "test", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { .. }));
}
