//! End-to-end behavior against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background thread, then
//! drives `RestClient` over real HTTP through the default `ureq` transport.

use std::net::SocketAddr;

use mock_server::{Echo, DOWNLOAD_BYTES, SAMPLE_JSON};
use rest_core::{BodyRetention, ClientOptions, HttpMethod, RestClient, TRANSPORT_FAILURE_STATUS};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn echo_of(client: &RestClient) -> Echo {
    serde_json::from_str(&client.text()).unwrap()
}

#[test]
fn get_json_and_extract_fields() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/json"), HttpMethod::Get, 5, "", "");
    assert_eq!(client.execute(), 200);
    assert_eq!(client.error(), "");
    assert_eq!(client.text(), SAMPLE_JSON);
    assert_eq!(client.field_i64("a", None).unwrap(), 1);
    assert_eq!(client.field_string("b", None).unwrap(), "x");
    assert!(client.field_value("c", None).is_err());
}

#[test]
fn not_found_is_a_status_not_an_error() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/status/404"), HttpMethod::Get, 0, "", "");
    assert_eq!(client.execute(), 404);
    assert_eq!(client.error(), "");
    assert_eq!(client.field_string("message", None).unwrap(), "Not Found");
}

#[test]
fn only_ok_retention_drops_error_body() {
    let addr = start_server();
    let options = ClientOptions {
        body_retention: BodyRetention::OnlyOk,
        ..ClientOptions::default()
    };
    let mut client = RestClient::with_options(options);

    client.set_request(&format!("http://{addr}/status/500"), HttpMethod::Get, 0, "", "");
    assert_eq!(client.execute(), 500);
    assert_eq!(client.text(), "");

    client.set_request(&format!("http://{addr}/json"), HttpMethod::Get, 0, "", "");
    assert_eq!(client.execute(), 200);
    assert_eq!(client.text(), SAMPLE_JSON);
}

#[test]
fn unreachable_host_reports_transport_failure() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = RestClient::new();

    client.set_request(&format!("http://127.0.0.1:{port}/json"), HttpMethod::Get, 2, "", "");
    assert_eq!(client.execute(), TRANSPORT_FAILURE_STATUS);
    assert!(!client.error().is_empty());
    assert_eq!(client.text(), "");
}

#[test]
fn configured_timeout_aborts_slow_request() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/slow/5"), HttpMethod::Get, 1, "", "");
    let started = std::time::Instant::now();
    assert_eq!(client.execute(), TRANSPORT_FAILURE_STATUS);
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
    assert!(!client.error().is_empty());
    assert_eq!(client.text(), "");
}

#[test]
fn redirects_resolve_to_final_status() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/redirect"), HttpMethod::Get, 0, "", "");
    assert_eq!(client.execute(), 200);
    assert_eq!(client.text(), SAMPLE_JSON);

    client.set_request(&format!("http://{addr}/redirect/3"), HttpMethod::Get, 0, "", "");
    assert_eq!(client.execute(), 200);
    assert_eq!(client.field_i64("a", None).unwrap(), 1);
}

#[test]
fn post_sends_body_content_type_and_headers() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(
        &format!("http://{addr}/echo"),
        HttpMethod::Post,
        5,
        "application/x-www-form-urlencoded",
        "X-Api-Key: secret",
    );
    client.add_header("X-Signature", "abc123");
    client.set_form_body("amount", "5");
    assert_eq!(client.execute(), 200);

    let echo = echo_of(&client);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "amount=5");
    assert_eq!(
        echo.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(echo.headers.get("x-api-key").map(String::as_str), Some("secret"));
    assert_eq!(echo.headers.get("x-signature").map(String::as_str), Some("abc123"));
}

#[test]
fn get_transmits_no_body() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/echo"), HttpMethod::Get, 0, "", "");
    client.set_body("this must stay local");
    assert_eq!(client.execute(), 200);

    let echo = echo_of(&client);
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_empty());
}

#[test]
fn post_with_empty_body_sends_no_payload() {
    let addr = start_server();
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/echo"), HttpMethod::Post, 0, "", "");
    client.set_body("");
    assert_eq!(client.execute(), 200);

    let echo = echo_of(&client);
    assert_eq!(echo.method, "POST");
    assert!(echo.body.is_empty());
}

#[test]
fn save_to_file_streams_body() {
    let addr = start_server();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("download.bin");
    let mut client = RestClient::new();

    client.set_request(&format!("http://{addr}/download"), HttpMethod::Get, 0, "", "");
    client.save_to_file(&path);
    assert_eq!(client.execute(), 200);

    assert_eq!(std::fs::read(&path).unwrap(), DOWNLOAD_BYTES);
    assert!(client.bytes().is_empty());
}

#[test]
fn signed_request_round_trip() {
    let addr = start_server();
    let mut client = RestClient::new();

    let payload = format!("q={}", client.encode("a b&c"));
    let signature = client.sign("secret", &payload, Default::default());

    client.set_request(&format!("http://{addr}/echo"), HttpMethod::Post, 0, "", "");
    client.add_header("X-Signature", &signature);
    client.set_body(&payload);
    assert_eq!(client.execute(), 200);

    let echo = echo_of(&client);
    assert_eq!(echo.body, "q=a%20b%26c");
    assert_eq!(echo.headers.get("x-signature"), Some(&signature));
}
