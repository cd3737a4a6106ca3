//! Integration tests: build the router over an in-memory review store and a
//! fixed key set, then drive it request by request.

mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use tood_core::reviews::ReviewStore;
use tower::ServiceExt;

use common::*;

fn review_body(taste: Value, price: Value, service: Value, comment: &str) -> Value {
    json!({
        "tasteRating": taste,
        "priceRating": price,
        "serviceRating": service,
        "comment": comment,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, _, json) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn login_sets_session_cookie_and_returns_claims() {
    let app = test_app();
    let req = json_request("POST", "/login", None, json!({ "credential": credential(CLIENT_ID) }));
    let (status, set_cookie, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    let set_cookie = set_cookie.expect("session cookie set");
    assert!(set_cookie.starts_with("session_user="), "{set_cookie}");
    assert!(set_cookie.contains("HttpOnly"), "{set_cookie}");
    assert!(set_cookie.contains("Max-Age=86400"), "{set_cookie}");
    assert_eq!(json["subject"], "110248495921238986420");
    assert_eq!(json["displayName"], "김민수");
    assert_eq!(json["email"], "minsu@example.com");
}

#[tokio::test]
async fn login_with_wrong_audience_is_rejected_without_cookie() {
    let app = test_app();
    let req = json_request(
        "POST",
        "/login",
        None,
        json!({ "credential": credential("someone-else.apps.googleusercontent.com") }),
    );
    let (status, set_cookie, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(set_cookie.is_none());
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid credential");
}

#[tokio::test]
async fn login_with_garbage_credential_is_rejected() {
    let app = test_app();
    let req = json_request("POST", "/login", None, json!({ "credential": "not-a-token" }));
    let (status, set_cookie, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(set_cookie.is_none());
}

#[tokio::test]
async fn me_requires_a_session() {
    let app = test_app();

    let (status, _, json) = send(&app, get("/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthenticated");

    let (status, _, _) = send(&app, get("/me", Some("session_user=forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = login(&app).await;
    let (status, _, json) = send(&app, get("/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["subject"], "110248495921238986420");
}

#[tokio::test]
async fn logout_clears_cookie_and_revokes_session() {
    let app = test_app();
    let cookie = login(&app).await;

    let req = json_request("POST", "/logout", Some(&cookie), json!({}));
    let (status, set_cookie, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let set_cookie = set_cookie.expect("clearing cookie");
    assert!(set_cookie.starts_with("session_user=;"), "{set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "{set_cookie}");

    // A client that kept the old token is still turned away.
    let (status, _, _) = send(&app, get("/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_session_succeeds() {
    let app = test_app();
    let req = json_request("POST", "/logout", None, json!({}));
    let (status, set_cookie, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.is_some());
}

#[tokio::test]
async fn unauthenticated_review_leaves_store_untouched() {
    let app = test_app();
    let body = review_body(json!(5), json!(5), json!(5), "great");
    let (status, _, _) = send(&app, json_request("POST", "/reviews/1", None, body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_reviews_are_rejected() {
    let app = test_app();
    let cookie = login(&app).await;

    for body in [
        review_body(json!(6), json!(5), json!(5), "too high"),
        review_body(json!(0), json!(5), json!(5), "too low"),
        review_body(json!(4.5), json!(5), json!(5), "fractional"),
        review_body(json!("4"), json!(5), json!(5), "text"),
        review_body(json!(4), json!(5), json!(5), "   "),
        json!({ "tasteRating": 4, "priceRating": 5, "comment": "missing service" }),
        json!({ "buffetId": 2, "tasteRating": 4, "priceRating": 5, "serviceRating": 5, "comment": "wrong venue" }),
    ] {
        let (status, _, json) =
            send(&app, json_request("POST", "/reviews/1", Some(&cookie), body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["error"], "invalid_review", "{body}");
    }

    for uri in ["/reviews/abc", "/reviews/0", "/reviews/-3"] {
        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                uri,
                Some(&cookie),
                review_body(json!(4), json!(4), json!(4), "bad venue"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    assert!(app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn review_flow_list_and_stats() {
    let app = test_app();
    let cookie = login(&app).await;

    let first = review_body(json!(4), json!(5), json!(4), "  맛있어요  ");
    let (status, _, json) = send(&app, json_request("POST", "/reviews/1", Some(&cookie), first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["review"]["venueId"], 1);
    assert_eq!(json["review"]["authorName"], "김민수");
    assert_eq!(json["review"]["comment"], "맛있어요");
    let first_id = json["review"]["id"].as_i64().unwrap();

    let mut second = review_body(json!(5), json!(4), json!(5), "good");
    second["buffetId"] = json!("1");
    let (status, _, json) =
        send(&app, json_request("POST", "/reviews/1", Some(&cookie), second)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["review"]["id"].as_i64().unwrap() > first_id);

    // Listing is public and ordered by submission.
    let (status, _, json) = send(&app, get("/reviews/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = json["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["comment"], "맛있어요");
    assert_eq!(reviews[1]["comment"], "good");

    let (status, _, json) = send(&app, get("/reviews/2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reviews"], json!([]));

    let (status, _, json) = send(&app, get("/reviews/stats?venueId=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &json["stats"];
    assert_eq!(stats["reviewCount"], 2);
    assert_eq!(stats["tasteRating"], 4.5);
    assert_eq!(stats["priceRating"], 4.5);
    assert_eq!(stats["serviceRating"], 4.5);
    assert_eq!(stats["overallRating"], 4.5);

    let (_, _, alias) = send(&app, get("/reviews/stats?buffetId=1", None)).await;
    assert_eq!(alias["stats"], json["stats"]);

    let (status, _, json) = send(&app, get("/reviews/stats?venueId=7", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stats"]["reviewCount"], 0);
    assert_eq!(json["stats"]["overallRating"], 0.0);

    let (status, _, json) = send(&app, get("/reviews/stats", None)).await;
    assert_eq!(status, StatusCode::OK);
    let all = json["stats"].as_object().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["1"]["reviewCount"], 2);

    for uri in [
        "/reviews/stats?venueId=abc",
        "/reviews/stats?venueId=0",
        "/reviews/stats?venueId=-1",
        "/reviews/0",
    ] {
        let (status, _, _) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn upload_and_menu_require_a_session() {
    let app = test_app();
    let image: Part<'_> = ("image", Some(("a.png", "image/png")), b"png");

    let (status, _, _) = send(&app, multipart_request("/upload/image", None, &[image])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let parts: [Part<'_>; 3] = [
        ("buffetId", None, b"1"),
        ("title", None, b"Lunch"),
        ("content", None, b"Kimchi"),
    ];
    let (status, _, _) = send(&app, multipart_request("/menu/register", None, &parts)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_rejects_bad_files_before_calling_backend() {
    let app = test_app();
    let cookie = login(&app).await;

    let text: Part<'_> = ("image", Some(("notes.txt", "text/plain")), b"hello");
    let (status, _, json) =
        send(&app, multipart_request("/upload/image", Some(&cookie), &[text])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_upload");

    let empty: Part<'_> = ("image", Some(("a.png", "image/png")), b"");
    let (status, _, _) =
        send(&app, multipart_request("/upload/image", Some(&cookie), &[empty])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other: Part<'_> = ("title", None, b"no file");
    let (status, _, _) =
        send(&app, multipart_request("/upload/image", Some(&cookie), &[other])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn menu_requires_all_fields() {
    let app = test_app();
    let cookie = login(&app).await;

    let parts: [Part<'_>; 2] = [("buffetId", None, b"1"), ("title", None, b"Lunch")];
    let (status, _, json) =
        send(&app, multipart_request("/menu/register", Some(&cookie), &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_menu");
}

#[tokio::test]
async fn unreachable_backend_is_a_server_error() {
    let app = test_app();
    let cookie = login(&app).await;

    let image: Part<'_> = ("image", Some(("a.png", "image/png")), b"\x89PNG");
    let (status, _, json) =
        send(&app, multipart_request("/upload/image", Some(&cookie), &[image])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);

    let parts: [Part<'_>; 3] = [
        ("buffetId", None, b"1"),
        ("title", None, b"Lunch"),
        ("content", None, b"Kimchi"),
    ];
    let (status, _, _) =
        send(&app, multipart_request("/menu/register", Some(&cookie), &parts)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn sitemap_falls_back_to_home_page() {
    let app = test_app();
    let resp = app
        .router
        .clone()
        .oneshot(get("/sitemap.xml", None))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/xml");
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let xml = String::from_utf8(body.to_vec()).expect("utf-8");
    assert!(xml.contains("<loc>https://tood.example/</loc>"));
    assert_eq!(xml.matches("<url>").count(), 1);
}
