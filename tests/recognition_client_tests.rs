// Integration tests for the HTTP recognition client
//
// Each test stands up a small axum app on an ephemeral port playing the recognition service.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use gesture_capture::error::{CaptureError, NetworkError, ServiceError};
use gesture_capture::media::{FramePayload, FrameSampler, RawFrame};
use gesture_capture::recognition::{HttpPredictionClient, RecognitionConfig, Recognizer};
use serde_json::json;
use std::sync::{Arc, Mutex};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: String) -> HttpPredictionClient {
    HttpPredictionClient::new(&RecognitionConfig {
        base_url,
        timeout_ms: 2000,
    })
}

fn payload() -> FramePayload {
    let frame = RawFrame {
        pixels: vec![90; 8 * 8 * 3],
        width: 8,
        height: 8,
        timestamp_ms: 0,
    };
    FrameSampler::default().encode(&frame).unwrap()
}

#[tokio::test]
async fn test_predict_posts_multipart_frame() {
    let seen: Arc<Mutex<Option<(String, Vec<u8>)>>> = Arc::new(Mutex::new(None));
    let captured = Arc::clone(&seen);

    let app = Router::new().route(
        "/predict_frame",
        post(move |headers: HeaderMap, body: Bytes| {
            let captured = Arc::clone(&captured);
            async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *captured.lock().unwrap() = Some((content_type, body.to_vec()));
                Json(json!({ "predicted_text": "A" }))
            }
        }),
    );

    let recognizer = client(serve(app).await);
    let frame = payload();
    let result = recognizer.predict(&frame).await.unwrap();
    assert_eq!(result.text, "A");

    let (content_type, body) = seen.lock().unwrap().take().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Content-Disposition: form-data; name=\"frame\"; filename=\"frame.jpg\""));
    assert!(text.contains("Content-Type: image/jpeg"));
    assert!(
        body.windows(frame.bytes.len()).any(|w| w == frame.bytes.as_slice()),
        "JPEG bytes must be embedded verbatim"
    );
}

#[tokio::test]
async fn test_predict_without_text_is_no_detection() {
    let app = Router::new()
        .route("/predict_frame", post(|| async { Json(json!({})) }));

    let result = client(serve(app).await).predict(&payload()).await.unwrap();
    assert!(!result.is_detection());

    let app = Router::new().route(
        "/predict_frame",
        post(|| async { Json(json!({ "predicted_text": null })) }),
    );

    let result = client(serve(app).await).predict(&payload()).await.unwrap();
    assert_eq!(result.text, "");
}

#[tokio::test]
async fn test_predict_error_status_is_service_error() {
    let app = Router::new().route(
        "/predict_frame",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );

    let err = client(serve(app).await).predict(&payload()).await.unwrap_err();
    match err {
        CaptureError::Service(ServiceError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected service status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_predict_non_200_success_is_rejected() {
    let app = Router::new().route(
        "/predict_frame",
        post(|| async { (StatusCode::ACCEPTED, Json(json!({ "predicted_text": "A" }))) }),
    );

    let err = client(serve(app).await).predict(&payload()).await.unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Service(ServiceError::Status { status: 202, .. })
    ));
}

#[tokio::test]
async fn test_predict_malformed_body_is_service_error() {
    let app = Router::new().route("/predict_frame", post(|| async { "definitely not json" }));

    let err = client(serve(app).await).predict(&payload()).await.unwrap_err();
    assert!(matches!(err, CaptureError::Service(ServiceError::MalformedBody(_))));
    assert_eq!(err.kind(), "service");
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Reserve a port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let recognizer = client(format!("http://{}", addr));

    let err = recognizer.predict(&payload()).await.unwrap_err();
    assert!(matches!(err, CaptureError::Network(NetworkError::Transport { .. })));

    let err = recognizer.reset_session().await.unwrap_err();
    assert_eq!(err.kind(), "network");
}

#[tokio::test]
async fn test_reset_returns_message() {
    let app = Router::new().route(
        "/reset_capture",
        get(|| async { Json(json!({ "message": "Capture reset" })) }),
    );

    let ack = client(serve(app).await).reset_session().await.unwrap();
    assert_eq!(ack.message, "Capture reset");
}

#[tokio::test]
async fn test_reset_missing_route_is_service_error() {
    let app = Router::new();

    let err = client(serve(app).await).reset_session().await.unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Service(ServiceError::Status { status: 404, .. })
    ));
}
