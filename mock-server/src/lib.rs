use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Fixed payload served by `/json`.
pub const SAMPLE_JSON: &str = r#"{"a":1,"b":"x","ok":true,"ratio":0.5}"#;

/// Fixed payload served by `/download`.
pub const DOWNLOAD_BYTES: &[u8] = b"line one\nline two\n\x00\x01\x02binary tail";

/// What the server saw for a request sent to `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: u16,
    pub message: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(sample_json))
        .route("/echo", get(echo).post(echo))
        .route("/status/{code}", get(status).post(status))
        .route("/redirect", get(redirect))
        .route("/redirect/{hops}", get(redirect_chain))
        .route("/download", get(download))
        .route("/slow/{secs}", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn sample_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], SAMPLE_JSON)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers = headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        content_type,
        body,
        headers,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<StatusBody>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let message = status.canonical_reason().unwrap_or("unknown").to_string();
    Ok((status, Json(StatusBody { status: code, message })))
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/json")])
}

async fn redirect_chain(Path(hops): Path<u32>) -> impl IntoResponse {
    let location = match hops {
        0 => "/json".to_string(),
        n => format!("/redirect/{}", n - 1),
    };
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

async fn download() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], DOWNLOAD_BYTES)
}

/// Holds the response back for `secs` seconds, then answers like `/json`.
async fn slow(Path(secs): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    sample_json().await
}
