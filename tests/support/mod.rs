//! Canned local HTTP server for client tests.

#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned response for requests whose path contains `path_fragment`.
pub struct Route {
    pub path_fragment: &'static str,
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Route {
    pub fn json(path_fragment: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            path_fragment,
            status,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn event_stream(path_fragment: &'static str, body: impl Into<String>) -> Self {
        Self {
            path_fragment,
            status: 200,
            content_type: "text/event-stream",
            body: body.into(),
        }
    }
}

/// Serve `routes` on an ephemeral port until the test runtime shuts down.
///
/// Returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn serve(routes: Vec<Route>) -> String {
    let listener_result = TcpListener::bind("127.0.0.1:0").await;
    assert!(listener_result.is_ok());
    let listener = match listener_result {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };

    let addr_result = listener.local_addr();
    assert!(addr_result.is_ok());
    let addr = match addr_result {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let path = read_request_path(&mut socket).await;
            let (status, content_type, body) = routes
                .iter()
                .find(|route| path.contains(route.path_fragment))
                .map_or((404, "text/plain", "no route"), |route| {
                    (route.status, route.content_type, route.body.as_str())
                });

            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// Read one request (head and body) and return its path.
async fn read_request_path(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::new(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos.saturating_add(4);
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let mut remaining = content_length.saturating_sub(buf.len().saturating_sub(header_end));
    while remaining > 0 {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => remaining = remaining.saturating_sub(n),
        }
    }

    head.split_whitespace().nth(1).unwrap_or_default().to_owned()
}
