//! End-to-end submission against a local axum stub of the analysis service.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use emolens::adapters::analysis::HttpAnalysisAdapter;
use emolens::domain::{
    AnalysisPayload, AudioArtifact, DomainError, EmotionScore, ImageArtifact, MlPredictions,
};
use emolens::usecases::{InputAggregate, SubmissionService};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct CapturedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
struct Stub {
    calls: Arc<AtomicUsize>,
    parts: Arc<Mutex<Vec<CapturedPart>>>,
}

fn scenario_a_body() -> serde_json::Value {
    json!({
        "text": {"label": "joy", "score": 0.92},
        "image": {"label": "happy", "score": 0.87},
        "audio": {"label": "joy", "score": 0.78},
        "ml_predictions": {"decision_tree": "joy", "knn": "happy"},
        "total_records": 42
    })
}

fn scenario_a_payload() -> AnalysisPayload {
    AnalysisPayload {
        text: EmotionScore {
            label: "joy".into(),
            score: 0.92,
        },
        image: EmotionScore {
            label: "happy".into(),
            score: 0.87,
        },
        audio: EmotionScore {
            label: "joy".into(),
            score: 0.78,
        },
        chart: None,
        ml_predictions: MlPredictions {
            decision_tree: "joy".into(),
            knn: "happy".into(),
        },
        total_records: 42,
        timestamp: None,
        success: None,
    }
}

async fn record_parts(stub: &Stub, mut multipart: Multipart) {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        stub.parts.lock().unwrap().push(CapturedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
}

async fn analyze_ok(State(stub): State<Stub>, multipart: Multipart) -> Json<serde_json::Value> {
    record_parts(&stub, multipart).await;
    Json(scenario_a_body())
}

async fn analyze_500(State(stub): State<Stub>, multipart: Multipart) -> (StatusCode, String) {
    record_parts(&stub, multipart).await;
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "model crashed"}).to_string(),
    )
}

async fn analyze_partial(State(stub): State<Stub>, multipart: Multipart) -> Json<serde_json::Value> {
    record_parts(&stub, multipart).await;
    Json(json!({"text": {"label": "joy", "score": 0.92}}))
}

async fn analyze_slow(State(stub): State<Stub>, multipart: Multipart) -> Json<serde_json::Value> {
    record_parts(&stub, multipart).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(scenario_a_body())
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn stub_service<H, T>(handler: H) -> (Stub, String)
where
    H: axum::handler::Handler<T, Stub>,
    T: 'static,
{
    let stub = Stub::default();
    let router = Router::new()
        .route("/analyze", post(handler))
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "models_loaded": true})) }),
        )
        .with_state(stub.clone());
    let url = serve(router).await;
    (stub, url)
}

fn ready_inputs(text: &str) -> InputAggregate {
    let mut inputs = InputAggregate::new();
    inputs.set_text(text);
    inputs.set_image(Some(ImageArtifact::new(
        vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10],
        "image/jpeg",
        "photo.jpg",
    )));
    inputs.set_audio(Some(AudioArtifact {
        bytes: b"RIFF\x24\x00\x00\x00WAVE".to_vec(),
        mime_type: "audio/wav".into(),
        file_name: "recording.wav".into(),
        duration: Duration::from_secs(2),
        recorded_at: chrono::Utc::now(),
    }));
    inputs
}

fn service(url: &str, timeout: Duration) -> SubmissionService {
    SubmissionService::new(Arc::new(HttpAnalysisAdapter::new(url, timeout).unwrap()))
}

#[tokio::test]
async fn scenario_a_success_payload_reaches_presentation_state() {
    let (stub, url) = stub_service(analyze_ok).await;
    let service = service(&url, Duration::from_secs(5));

    service.submit(&ready_inputs("I feel great")).await.unwrap();

    let state = service.snapshot();
    assert_eq!(state.result, Some(scenario_a_payload()));
    assert!(state.error.is_none());
    assert!(!state.loading);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn multipart_carries_three_named_parts() {
    let (stub, url) = stub_service(analyze_ok).await;
    let service = service(&url, Duration::from_secs(5));

    service.submit(&ready_inputs("I feel great")).await.unwrap();

    let parts = stub.parts.lock().unwrap().clone();
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["text", "image", "audio"]);

    assert_eq!(parts[0].data, b"I feel great");
    assert!(parts[0].file_name.is_none());

    assert_eq!(parts[1].file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(parts[1].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(parts[1].data.len(), 6);

    assert_eq!(parts[2].file_name.as_deref(), Some("recording.wav"));
    assert_eq!(parts[2].content_type.as_deref(), Some("audio/wav"));
}

#[tokio::test]
async fn scenario_b_http_500_is_analysis_failed() {
    let (stub, url) = stub_service(analyze_500).await;
    let service = service(&url, Duration::from_secs(5));

    let err = service.submit(&ready_inputs("I feel great")).await.unwrap_err();
    assert!(matches!(err, DomainError::AnalysisFailed(_)));

    let state = service.snapshot();
    assert!(state.result.is_none());
    assert!(state.error.unwrap().contains("Error analyzing emotions"));
    assert!(!state.loading);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_c_missing_text_never_calls_service() {
    let (stub, url) = stub_service(analyze_ok).await;
    let service = service(&url, Duration::from_secs(5));

    let err = service.submit(&ready_inputs("")).await.unwrap_err();
    assert_eq!(err, DomainError::MissingText);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    assert!(service.snapshot().result.is_none());
}

#[tokio::test]
async fn partial_payload_is_rejected() {
    let (_stub, url) = stub_service(analyze_partial).await;
    let service = service(&url, Duration::from_secs(5));

    let err = service.submit(&ready_inputs("meh")).await.unwrap_err();
    assert!(matches!(err, DomainError::AnalysisFailed(_)));
    assert!(service.snapshot().result.is_none());
}

#[tokio::test]
async fn timeout_behaves_like_transport_failure() {
    let (_stub, url) = stub_service(analyze_slow).await;
    let service = service(&url, Duration::from_millis(300));

    let err = service.submit(&ready_inputs("sleepy")).await.unwrap_err();
    assert!(matches!(err, DomainError::AnalysisFailed(_)));
    let state = service.snapshot();
    assert!(!state.loading);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn unreachable_service_is_analysis_failed() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let service = service(&url, Duration::from_secs(2));

    let err = service.submit(&ready_inputs("anyone?")).await.unwrap_err();
    assert!(matches!(err, DomainError::AnalysisFailed(_)));
    assert!(service.check_backend().await.is_err());
}

#[tokio::test]
async fn health_check_succeeds_against_stub() {
    let (_stub, url) = stub_service(analyze_ok).await;
    let service = service(&url, Duration::from_secs(5));
    service.check_backend().await.unwrap();
}
