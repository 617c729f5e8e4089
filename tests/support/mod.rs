//! Scripted JSON-RPC servers for exercising the gateway end to end.
//!
//! Each mock binds an ephemeral port, answers one HTTP request per
//! connection from the supplied handler, and records every method/params
//! pair it sees so tests can assert on call order and wire shapes.

#![allow(dead_code)]

use monero_agent_gateway::GatewayConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What a scripted server answers for one request.
pub struct MockResponse {
    pub status: u16,
    pub body: Value,
}

impl MockResponse {
    /// JSON-RPC success envelope.
    pub fn result(value: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "jsonrpc": "2.0", "id": "0", "result": value }),
        }
    }

    /// JSON-RPC error envelope.
    pub fn error(message: &str) -> Self {
        Self {
            status: 200,
            body: json!({
                "jsonrpc": "2.0",
                "id": "0",
                "error": { "code": -13, "message": message },
            }),
        }
    }

    /// Plain HTTP failure with no usable body.
    pub fn http_error(status: u16) -> Self {
        Self {
            status,
            body: json!({}),
        }
    }
}

type Handler = dyn Fn(&str, &Value) -> MockResponse + Send + Sync + 'static;
type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

/// Minimal in-process JSON-RPC HTTP server with a call log.
pub struct MockRpcServer {
    addr: SocketAddr,
    calls: CallLog,
}

impl MockRpcServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().unwrap();
        let calls: CallLog = Arc::default();
        let handler: Arc<Handler> = Arc::new(handler);

        let log = calls.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve_one(stream, handler, log).await;
                });
            }
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> String {
        format!("http://{}/json_rpc", self.addr)
    }

    /// Methods received so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Params of the first call to `method`.
    pub fn params_of(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

async fn serve_one(mut stream: TcpStream, handler: Arc<Handler>, log: CallLog) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(body_start + content_length);
    let request: Value = serde_json::from_slice(&buf[body_start..body_end]).unwrap_or(json!({}));
    let method = request["method"].as_str().unwrap_or("").to_string();
    log.lock().unwrap().push((method.clone(), request["params"].clone()));

    let response = handler(&method, &request["params"]);
    let body = response.body.to_string();
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        if response.status == 200 { "OK" } else { "Error" },
        body.len(),
        body
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// A URL that refuses connections: bind an ephemeral port, then drop it.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/json_rpc")
}

/// Gateway configuration pointed at mock servers, with short timeouts.
pub fn test_config(wallet_rpc_url: String, nodes: Vec<String>, api_key: &str) -> GatewayConfig {
    GatewayConfig {
        api_key: api_key.to_string(),
        auth_enabled: !api_key.is_empty(),
        wallet_rpc_url,
        wallet_name: "agent_stagenet".to_string(),
        wallet_password: "super_secret_password".to_string(),
        height_nodes: nodes,
        network: "stagenet".to_string(),
        listen_addr: "127.0.0.1".parse().unwrap(),
        listen_port: 0,
        rpc_timeout: Duration::from_secs(5),
        node_timeout: Duration::from_secs(2),
    }
}
