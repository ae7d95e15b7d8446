//! Integration tests for the HTTP server.
//!
//! These tests start a real server on an ephemeral port and speak raw
//! HTTP/1.1 to it over TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use shop_dispatch::audit::NullAuditLogger;
use shop_dispatch::auth::MemorySessionStore;
use shop_dispatch::controller::{ControllerEnv, Dispatcher};
use shop_dispatch::error::DispatchError;
use shop_dispatch::server::{HttpServer, ServerOptions};
use shop_dispatch::services::ServiceRegistry;
use shop_dispatch::templates::ViewRenderer;

struct NameViews;

impl ViewRenderer for NameViews {
    fn render(&self, view: &str, _model: &serde_json::Value) -> Result<String, DispatchError> {
        Ok(format!("<p>{}</p>", view))
    }
}

/// Test server instance.
struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    handle: JoinHandle<Result<(), DispatchError>>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let services = ServiceRegistry::in_memory(&dir.path().join("uploads")).unwrap();
        services.seed_admin("admin@example.com", "Admin1234").unwrap();

        let env = ControllerEnv {
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
            views: Arc::new(NameViews),
            audit: Arc::new(NullAuditLogger::new()),
            login_path: "/user/login".to_string(),
            cookie_name: "SESSIONID".to_string(),
        };
        let dispatcher = Arc::new(Dispatcher::standard(&services, env));
        let options = ServerOptions {
            cookie_name: "SESSIONID".to_string(),
            max_body_bytes: 64 * 1024,
        };

        let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), dispatcher, options)
            .await
            .expect("Failed to bind server");
        let addr = server.local_addr().unwrap();

        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(server.run(Arc::clone(&shutdown)));

        Self {
            addr,
            shutdown,
            handle,
            _dir: dir,
        }
    }

    /// Send one raw request and return the raw response.
    async fn send(&self, request: &str) -> String {
        self.try_send(request).await.expect("Request failed")
    }

    async fn try_send(&self, request: &str) -> std::io::Result<String> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(request.as_bytes()).await?;

        let mut buf = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
            .await
            .expect("Response timed out")?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    async fn stop(self) {
        self.shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("Server did not stop")
            .unwrap()
            .unwrap();
    }
}

fn get(path: &str, extra_headers: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{}\r\n",
        path, extra_headers
    )
}

fn post_form(path: &str, body: &str, extra_headers: &str) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n{}\r\n{}",
        path,
        body.len(),
        extra_headers,
        body
    )
}

fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    response
        .split("\r\n\r\n")
        .next()?
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

#[tokio::test]
async fn test_renders_public_page() {
    let server = TestServer::start().await;

    let response = server.send(&get("/user/login", "")).await;
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("<p>user/login</p>"));
    assert_eq!(header(&response, "cache-control"), Some("no-cache, no-store, must-revalidate"));

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::start().await;

    let response = server.send(&get("/no/such/page", "")).await;
    assert!(response.starts_with("HTTP/1.1 404"), "{}", response);

    server.stop().await;
}

#[tokio::test]
async fn test_login_cookie_round_trip() {
    let server = TestServer::start().await;

    let response = server.send(&get("/user/order/list.do", "")).await;
    assert!(response.starts_with("HTTP/1.1 302"), "{}", response);
    assert_eq!(
        header(&response, "location"),
        Some("/user/login?next=%2Fuser%2Forder%2Flist.do")
    );

    let response = server
        .send(&post_form(
            "/user/login",
            "email=admin%40example.com&password=Admin1234&next=%2Fuser%2Forder%2Flist.do",
            "",
        ))
        .await;
    assert!(response.starts_with("HTTP/1.1 302"), "{}", response);
    assert_eq!(header(&response, "location"), Some("/user/order/list.do"));
    let cookie = header(&response, "set-cookie").expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let response = server
        .send(&get("/user/order/list.do", &format!("Cookie: {}\r\n", pair)))
        .await;
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("<p>order/list</p>"));

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = TestServer::start().await;

    let body = format!("email={}", "a".repeat(128 * 1024));
    // The server may also reset the connection before the body is sent.
    if let Ok(response) = server.try_send(&post_form("/user/join", &body, "")).await {
        assert!(response.starts_with("HTTP/1.1 4"), "{}", response);
    }

    server.stop().await;
}
