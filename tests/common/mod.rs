//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read the request head (request line and headers) from a socket.
async fn read_head(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8(buf).ok()
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        418 => "418 I'm a teapot",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Start a backend that records each request head and answers 200 "ok".
pub async fn start_capturing_backend(addr: SocketAddr) -> Arc<Mutex<Vec<String>>> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let store = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let store = store.clone();
                    tokio::spawn(async move {
                        if let Some(head) = read_head(&mut socket).await {
                            store.lock().unwrap().push(head);
                            write_response(&mut socket, 200, "ok").await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    captured
}

/// Start a programmable backend with async support.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        if read_head(&mut socket).await.is_some() {
                            let (status, body) = f().await;
                            write_response(&mut socket, status, &body).await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that drops the first `fail_first` connections after
/// reading the request, then answers 200 "recovered".
///
/// A dropped connection looks like a backend dying mid-restart: the
/// request goes out but no response ever comes back. Returns the
/// connection counter.
#[allow(dead_code)]
pub async fn start_flaky_backend(addr: SocketAddr, fail_first: u32) -> Arc<AtomicU32> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        if read_head(&mut socket).await.is_some() {
                            let seen = counter.fetch_add(1, Ordering::SeqCst);
                            if seen < fail_first {
                                // close without a response
                                drop(socket);
                            } else {
                                write_response(&mut socket, 200, "recovered").await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    hits
}

/// Start a backend that never responds and tracks open connections.
///
/// The gauge increments on accept and decrements when the peer closes
/// the connection. Used to verify that an abandoned caller releases
/// the upstream connection.
#[allow(dead_code)]
pub async fn start_tracking_backend(addr: SocketAddr) -> Arc<AtomicU32> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let open = Arc::new(AtomicU32::new(0));
    let gauge = open.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let gauge = gauge.clone();
                    tokio::spawn(async move {
                        gauge.fetch_add(1, Ordering::SeqCst);
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) => {}
                            }
                        }
                        gauge.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                Err(_) => break,
            }
        }
    });

    open
}
