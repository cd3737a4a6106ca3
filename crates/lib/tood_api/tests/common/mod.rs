//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tood_api::{AppState, config::ApiConfig};
use tood_core::auth::credential::StaticKeySource;
use tood_core::reviews::memory::InMemoryReviewStore;
use tower::ServiceExt;

pub const TEST_KEY_PEM: &str = include_str!("../fixtures/rsa_test_key.pem");
pub const TEST_JWKS: &str = include_str!("../fixtures/jwks.json");
pub const TEST_KID: &str = "tood-test-key";
pub const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";
pub const BOUNDARY: &str = "tood-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryReviewStore>,
}

pub fn test_config(backend_url: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        google_client_id: CLIENT_ID.into(),
        jwks_url: "http://127.0.0.1:9/certs".into(),
        credential_issuers: vec![
            "accounts.google.com".into(),
            "https://accounts.google.com".into(),
        ],
        session_secret: "test-session-secret".into(),
        backend_url: backend_url.into(),
        site_url: "https://tood.example".into(),
        upstream_timeout: Duration::from_secs(2),
        cookie_secure: false,
        database_url: None,
    }
}

/// App whose backend calls go to `backend_url`.
pub fn test_app_with_backend(backend_url: &str) -> TestApp {
    let store = Arc::new(InMemoryReviewStore::new());
    let keys = Arc::new(StaticKeySource::from_json(TEST_JWKS).expect("jwks fixture"));
    let state = AppState::new(test_config(backend_url), keys, store.clone()).expect("app state");
    TestApp {
        router: tood_api::router(state),
        store,
    }
}

/// App with an unreachable backend. Nothing listens on the discard port,
/// so backend calls fail fast.
pub fn test_app() -> TestApp {
    test_app_with_backend("http://127.0.0.1:9")
}

pub fn credential(aud: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "iss": "https://accounts.google.com",
        "aud": aud,
        "sub": "110248495921238986420",
        "email": "minsu@example.com",
        "name": "김민수",
        "picture": "https://example.com/p.png",
        "iat": now - 10,
        "exp": now + 3600,
    });
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.into());
    let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM.as_bytes()).expect("pem fixture");
    encode(&header, &claims, &key).expect("sign credential")
}

pub async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let resp = app.router.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, set_cookie, json)
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name`, optional (file name, content type), value.
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub fn multipart_request(uri: &str, cookie: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Log in and return the `Cookie` header value for the new session.
pub async fn login(app: &TestApp) -> String {
    let req = json_request("POST", "/login", None, json!({ "credential": credential(CLIENT_ID) }));
    let (status, set_cookie, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = set_cookie.expect("session cookie set");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

