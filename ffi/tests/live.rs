//! Drive the C surface end to end against the live mock server.

use std::ffi::{CStr, CString};
use std::net::SocketAddr;
use std::os::raw::c_char;

use rest_ffi::types::{FfiErrorCode, FfiHttpMethod};
use rest_ffi::*;

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

fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    rest_free_string(ptr);
    s
}

#[test]
fn get_json_and_read_field() {
    let addr = start_server();
    let client = rest_client_new();

    let url = CString::new(format!("http://{addr}/json")).unwrap();
    rest_set_request(client, url.as_ptr(), FfiHttpMethod::Get, 5, std::ptr::null(), std::ptr::null());
    assert_eq!(rest_execute(client), 200);
    assert_eq!(take_string(rest_get_error(client)), "");
    assert_eq!(take_string(rest_get_text(client)), mock_server::SAMPLE_JSON);

    let field = CString::new("b").unwrap();
    let result = rest_get_field(client, field.as_ptr(), std::ptr::null());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(unsafe { CStr::from_ptr(r.json) }.to_str().unwrap(), "\"x\"");
    rest_free_field_result(result);

    rest_client_free(client);
}

#[test]
fn empty_override_reads_stored_body() {
    let addr = start_server();
    let client = rest_client_new();

    let url = CString::new(format!("http://{addr}/json")).unwrap();
    rest_set_request(client, url.as_ptr(), FfiHttpMethod::Get, 5, std::ptr::null(), std::ptr::null());
    assert_eq!(rest_execute(client), 200);

    let field = CString::new("a").unwrap();
    let empty = CString::new("").unwrap();
    let result = rest_get_field(client, field.as_ptr(), empty.as_ptr());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(unsafe { CStr::from_ptr(r.json) }.to_str().unwrap(), "1");
    rest_free_field_result(result);

    rest_client_free(client);
}

#[test]
fn post_form_body_is_echoed() {
    let addr = start_server();
    let client = rest_client_new();

    let url = CString::new(format!("http://{addr}/echo")).unwrap();
    let ct = CString::new("application/x-www-form-urlencoded").unwrap();
    rest_set_request(client, url.as_ptr(), FfiHttpMethod::Post, 0, ct.as_ptr(), std::ptr::null());
    let name = CString::new("title").unwrap();
    let value = CString::new("hello").unwrap();
    rest_set_form_body(client, name.as_ptr(), value.as_ptr());
    assert_eq!(rest_execute(client), 200);

    let echo: mock_server::Echo = serde_json::from_str(&take_string(rest_get_text(client))).unwrap();
    assert_eq!(echo.body, "title=hello");
    assert_eq!(
        echo.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );

    rest_client_free(client);
}

#[test]
fn unreachable_host_sets_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = rest_client_new();

    let url = CString::new(format!("http://127.0.0.1:{port}/")).unwrap();
    rest_set_request(client, url.as_ptr(), FfiHttpMethod::Get, 2, std::ptr::null(), std::ptr::null());
    assert_eq!(rest_execute(client), -1);
    assert!(!take_string(rest_get_error(client)).is_empty());

    rest_client_free(client);
}
