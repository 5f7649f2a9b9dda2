//! In-process HTTP mock for driving the dispatcher against scripted
//! responses. Each canned response answers exactly one connection (replies
//! carry `Connection: close`, so reqwest reconnects per request), and every
//! request is recorded for assertions on method, path, headers, and body.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// (status code, reason phrase, body)
pub(crate) type CannedResponse = (u16, &'static str, String);

/// A successful `access/ticket` response.
pub(crate) fn auth_ok(ticket: &str, csrf_token: &str) -> CannedResponse {
    (
        200,
        "OK",
        format!(r#"{{"data":{{"ticket":"{ticket}","CSRFPreventionToken":"{csrf_token}"}}}}"#),
    )
}

/// A 200 response wrapping the given JSON payload in the `data` envelope.
pub(crate) fn data_ok(payload: &str) -> CannedResponse {
    (200, "OK", format!(r#"{{"data":{payload}}}"#))
}

/// The shape an expired ticket actually produces: a 401 whose body is the
/// HTML login page, not JSON.
pub(crate) fn expired_ticket() -> CannedResponse {
    (
        401,
        "Unauthorized",
        "<html><body>401 No ticket</body></html>".into(),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

pub(crate) struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    /// Bind on an ephemeral port and serve the canned responses in order,
    /// one connection each.
    pub async fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            for (code, reason, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                recorded.lock().await.push(request);

                let reply = format!(
                    "HTTP/1.1 {code} {reason}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api2/json", self.addr)
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().await.clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let header_end = loop {
        let mut chunk = [0u8; 1024];
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request headers completed");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body_bytes = buf[header_end + 4..].to_vec();
    while body_bytes.len() < content_length {
        let mut chunk = [0u8; 1024];
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body_bytes.extend_from_slice(&chunk[..n]);
    }

    Recorded {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body_bytes).to_string(),
    }
}
