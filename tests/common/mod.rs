//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use contract_router::config::AppConfig;
use contract_router::contract::ContractRoutingHandler;
use contract_router::filter::Filter;
use contract_router::http::{response, HttpHandler, HttpServer};
use contract_router::lifecycle::Shutdown;

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri)
}

pub async fn body_string(response: Response<Body>) -> String {
    response::body_text(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
}

/// Handler answering 200 with a fixed body.
pub fn text_handler(body: &'static str) -> HttpHandler {
    HttpHandler::new(move |_| async move { Ok(response::text(StatusCode::OK, body)) })
}

pub type Trace = Arc<Mutex<Vec<String>>>;

/// Filter appending `"{name} before"` / `"{name} after"` around the next stage.
pub fn marker(name: &'static str, trace: &Trace) -> Filter {
    let trace = trace.clone();
    Filter::around(move |request, next| {
        let trace = trace.clone();
        async move {
            trace.lock().unwrap().push(format!("{name} before"));
            let result = next.call(request).await;
            trace.lock().unwrap().push(format!("{name} after"));
            result
        }
    })
}

/// Serve `contract` on an ephemeral port. Trigger the returned `Shutdown` to stop.
pub async fn start_server(contract: ContractRoutingHandler) -> (SocketAddr, Arc<Shutdown>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut config = AppConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config, contract);
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, signal).await.unwrap();
    });
    (addr, shutdown)
}

/// Send a bare HTTP/1.1 request and return the raw response text.
pub async fn raw_request(addr: SocketAddr, method: &str, path: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    socket.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    socket.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}
