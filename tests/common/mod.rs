//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use questionnaire_router::config::{DevServerConfig, ProxyRuleConfig};
use questionnaire_router::lifecycle::{startup, Shutdown};
use questionnaire_router::DevServer;

/// Start a backend that answers every request with its request line and
/// Host header: `GET /exercises/ex42?x=1 | host=127.0.0.1:1234`.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let mut lines = head.lines();
                let request_line = lines.next().unwrap_or_default();
                let request_line = request_line
                    .rsplit_once(' ')
                    .map(|(rest, _version)| rest)
                    .unwrap_or(request_line);
                let host = lines
                    .find_map(|l| {
                        l.split_once(':')
                            .filter(|(k, _)| k.eq_ignore_ascii_case("host"))
                            .map(|(_, v)| v.trim().to_string())
                    })
                    .unwrap_or_default();

                let body = format!("{} | host={}", request_line, host);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a backend that reads each request head, waits `delay`, then writes
/// `response` verbatim and closes the connection.
pub async fn start_fixed_backend(delay: Duration, response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_head(&mut socket).await;
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Read up to the end of the request head.
async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config bound to an ephemeral loopback port, proxying `/api` to `backend`.
pub fn test_config(backend: SocketAddr) -> DevServerConfig {
    let mut config = DevServerConfig::default();
    config.server.host = "127.0.0.1".into();
    config.server.port = 0;
    config.proxy = vec![ProxyRuleConfig {
        prefix: "/api".into(),
        target: format!("http://{}", backend),
        change_origin: true,
        rewrite: true,
    }];
    config.timeouts.upstream_secs = 2;
    config
}

/// Start the dev server; returns its address and the shutdown handle.
pub async fn start_dev_server(config: DevServerConfig) -> (SocketAddr, Shutdown) {
    let routes = startup::build_router(config.router.snapshot).unwrap();
    let listener = startup::bind_listener(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = DevServer::new(config, routes).unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
