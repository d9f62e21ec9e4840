use std::sync::Arc;

use relay_core::{EndpointClient, Mode, ReplySource, RequestError, Role, SessionController};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Talk to the stub directly even when a proxy is configured in the environment.
fn local_client(url: &str, mode: Mode) -> EndpointClient {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    EndpointClient::with_client(client, url, mode, "12345")
}

/// Serve exactly one HTTP request with a canned response. The handle yields
/// the request line and the parsed JSON body.
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<(String, Value)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/endpoint", listener.local_addr().unwrap());

    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let (head_end, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (pos + 4, length);
            }
        };
        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending body");
            buf.extend_from_slice(&chunk[..n]);
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let request_line = head.lines().next().unwrap_or_default().to_string();
        let body: Value =
            serde_json::from_slice(&buf[head_end..head_end + content_length]).unwrap();
        (request_line, body)
    });

    (url, handle)
}

#[tokio::test]
async fn chat_request_posts_user_id_and_message() {
    let (url, server) = serve_once("200 OK", r#"{"response":"Hello"}"#).await;
    let client = local_client(&url, Mode::Chat);

    let reply = client.fetch("hi there").await.unwrap();
    assert_eq!(reply, "Hello");

    let (request_line, body) = server.await.unwrap();
    assert!(request_line.starts_with("POST /endpoint "));
    assert_eq!(body, json!({ "user_id": "12345", "message": "hi there" }));
}

#[tokio::test]
async fn research_request_posts_topic_and_prefers_markdown() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"markdown":"| a | b |\n|---|---|\n| 1 | 2 |","content":"ignored"}"#,
    )
    .await;
    let client = local_client(&url, Mode::Research);

    let reply = client.fetch("rust async").await.unwrap();
    assert!(reply.starts_with("| a | b |"));

    let (_, body) = server.await.unwrap();
    assert_eq!(body, json!({ "topic": "rust async" }));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (url, server) = serve_once("503 Service Unavailable", r#"{"response":"busy"}"#).await;
    let client = local_client(&url, Mode::Chat);

    let err = client.fetch("hi").await.unwrap_err();
    assert!(matches!(err, RequestError::Status(s) if s.as_u16() == 503));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop so the port is very likely closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/endpoint", listener.local_addr().unwrap());
    drop(listener);

    let client = local_client(&url, Mode::Chat);
    let err = client.fetch("hi").await.unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)));
}

#[tokio::test]
async fn session_over_http_shows_fallback_on_malformed_reply() {
    let (url, server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
    let client = local_client(&url, Mode::Chat);
    let mut controller = SessionController::new(Arc::new(client), "fallback text");

    controller.set_draft("hello");
    assert!(controller.submit());
    assert!(controller.wait_reply().await);
    server.await.unwrap();

    let transcript = controller.session().transcript();
    assert_eq!(transcript.len(), 2);
    let reply = transcript.last().unwrap();
    assert_eq!(reply.role, Role::Bot);
    assert_eq!(reply.text, "fallback text");
}
