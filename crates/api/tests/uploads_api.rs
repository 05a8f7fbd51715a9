//! HTTP surface tests for the upload-and-publish flow.
//!
//! These exercise validation and error mapping on the paths that do not
//! require ffmpeg or a reachable database.

mod common;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn upload_with_wrong_content_type_is_rejected() {
    let app = common::build_test_app();

    let request = common::multipart_upload("notes.txt", "text/plain", b"not a video");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "UNSUPPORTED_MEDIA");
}

#[tokio::test]
async fn upload_with_non_mp4_payload_is_rejected() {
    let app = common::build_test_app();

    // Declared mp4 but the payload lacks an ftyp box.
    let request = common::multipart_upload("clip.mp4", "video/mp4", &[0u8; 64]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "UNSUPPORTED_MEDIA");
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let app = common::build_test_app();

    let boundary = "clipvault-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhi\r\n--{boundary}--\r\n"
    );
    let request = Request::post("/api/v1/uploads")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn status_of_unknown_session_is_not_found() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::get(format!("/api/v1/uploads/{}/status", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn select_on_unknown_session_is_not_found() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::post(format!("/api/v1/uploads/{}/select", Uuid::new_v4()))
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"index":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn discard_of_unknown_session_is_not_found() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::delete(format!("/api/v1/uploads/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn publish_with_short_title_fails_validation() {
    let app = common::build_test_app();

    // Payload validation runs before the session lookup.
    let response = app
        .oneshot(
            Request::post(format!("/api/v1/uploads/{}/publish", Uuid::new_v4()))
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"uid":"user-1","display_name":"User One","title":"ab"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn user_clips_with_invalid_sort_is_bad_request() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::get("/api/v1/users/user-1/clips?sort=sideways")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_maps_store_failure_to_bad_gateway() {
    let app = common::build_test_app();

    let response = app
        .oneshot(Request::get("/api/v1/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "PAGE_FETCH_FAILED");
}
