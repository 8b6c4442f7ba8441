#![allow(dead_code)]

use hubkit::Client;
use wiremock::{MockServer, Request};

pub async fn setup() -> (MockServer, Client) {
    let _ = env_logger::builder().is_test(true).try_init();

    let server = MockServer::start().await;
    let client = Client::builder().base_url(server.uri()).build().unwrap();

    (server, client)
}

pub async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
