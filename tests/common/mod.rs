//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream that answers 200 "ok" and counts requests.
pub async fn start_mock_upstream(addr: SocketAddr) -> Arc<AtomicU32> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let _ = socket.read(&mut buf).await;
                        counter.fetch_add(1, Ordering::SeqCst);

                        let body = "ok";
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    hits
}

/// Start a mock upstream recording each request target (path + query).
#[allow(dead_code)]
pub async fn start_recording_upstream(addr: SocketAddr) -> Arc<Mutex<Vec<String>>> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let targets = Arc::new(Mutex::new(Vec::new()));
    let recorder = targets.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let recorder = recorder.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);

                        // Request line: "GET /path?query HTTP/1.1"
                        let head = String::from_utf8_lossy(&buf[..n]);
                        if let Some(target) = head.lines().next().and_then(|l| l.split(' ').nth(1))
                        {
                            recorder.lock().unwrap().push(target.to_string());
                        }

                        let response =
                            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    targets
}
