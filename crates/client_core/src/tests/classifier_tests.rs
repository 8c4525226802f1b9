use super::*;

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    routing::post,
    Router,
};
use shared::domain::{Gender, ImagePayload, LesionSite};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};
use url::Url;

#[derive(Debug)]
struct ReceivedField {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct PredictServerState {
    status: StatusCode,
    body: String,
    delay: Duration,
    tx: Arc<Mutex<Option<oneshot::Sender<HashMap<String, ReceivedField>>>>>,
}

async fn handle_predict(
    State(state): State<PredictServerState>,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.insert(
            name,
            ReceivedField {
                file_name,
                content_type,
                bytes,
            },
        );
    }
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(fields);
    }
    tokio::time::sleep(state.delay).await;
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_predict_server(
    status: StatusCode,
    body: &str,
    delay: Duration,
) -> (String, oneshot::Receiver<HashMap<String, ReceivedField>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = PredictServerState {
        status,
        body: body.to_string(),
        delay,
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/predict", post(handle_predict))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

fn settings_for(endpoint: &str, request_timeout: Duration) -> ClassifierSettings {
    ClassifierSettings {
        endpoint: Url::parse(endpoint).expect("endpoint"),
        request_timeout,
    }
}

fn sample_record() -> PatientRecord {
    PatientRecord {
        first_name: "Ana".to_string(),
        last_name: "Lopez".to_string(),
        age: 42,
        gender: Gender::Female,
        lesion_site: LesionSite::UpperExtremity,
        lesion_label: "Right arm".to_string(),
        image: ImagePayload {
            file_name: "lesion.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
        },
    }
}

#[tokio::test]
async fn posts_every_form_field_and_parses_prediction() {
    let (endpoint, fields_rx) = spawn_predict_server(
        StatusCode::OK,
        r#"{"diagnosis":"nv","confidence":0.93}"#,
        Duration::ZERO,
    )
    .await;
    let classifier =
        HttpClassifier::new(&settings_for(&endpoint, Duration::from_secs(5))).expect("client");

    let raw = classifier
        .classify(&sample_record())
        .await
        .expect("classify");
    assert_eq!(raw.diagnosis, "nv");
    assert_eq!(raw.confidence, 0.93);

    let fields = fields_rx.await.expect("fields");
    let text = |name: &str| String::from_utf8(fields[name].bytes.clone()).expect("utf8");
    assert_eq!(text("firstName"), "Ana");
    assert_eq!(text("lastName"), "Lopez");
    assert_eq!(text("age"), "42");
    assert_eq!(text("gender"), "female");
    assert_eq!(text("lesionArea"), "upper extremity");

    let file = &fields["file"];
    assert_eq!(file.bytes, sample_record().image.bytes);
    assert_eq!(file.file_name.as_deref(), Some("lesion.png"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn non_success_status_surfaces_body_as_detail() {
    let (endpoint, _fields_rx) = spawn_predict_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        "model unavailable",
        Duration::ZERO,
    )
    .await;
    let classifier =
        HttpClassifier::new(&settings_for(&endpoint, Duration::from_secs(5))).expect("client");

    let err = classifier
        .classify(&sample_record())
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ClassifierError::ClassificationFailed {
            status: 500,
            detail: "model unavailable".to_string(),
        }
    );
    let notice = err.notice();
    assert_eq!(notice.kind, ErrorKind::ClassificationFailed);
    assert!(notice.message.contains("model unavailable"));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let classifier = HttpClassifier::new(&settings_for(
        &format!("http://{addr}"),
        Duration::from_secs(5),
    ))
    .expect("client");

    let err = classifier
        .classify(&sample_record())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClassifierError::Transport(_)), "got {err:?}");
    assert_eq!(err.notice().kind, ErrorKind::Transport);
}

#[tokio::test]
async fn elapsed_timeout_is_a_transport_error() {
    let (endpoint, _fields_rx) = spawn_predict_server(
        StatusCode::OK,
        r#"{"diagnosis":"nv","confidence":0.5}"#,
        Duration::from_secs(2),
    )
    .await;
    let classifier = HttpClassifier::new(&settings_for(&endpoint, Duration::from_millis(200)))
        .expect("client");

    let err = classifier
        .classify(&sample_record())
        .await
        .expect_err("must time out");
    assert!(matches!(err, ClassifierError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn out_of_range_confidence_or_bad_json_is_malformed() {
    for body in [
        r#"{"diagnosis":"mel","confidence":81}"#,
        r#"{"label":"mel"}"#,
        "not json",
    ] {
        let (endpoint, _fields_rx) =
            spawn_predict_server(StatusCode::OK, body, Duration::ZERO).await;
        let classifier = HttpClassifier::new(&settings_for(&endpoint, Duration::from_secs(5)))
            .expect("client");

        let err = classifier
            .classify(&sample_record())
            .await
            .expect_err("must fail");
        assert!(
            matches!(err, ClassifierError::MalformedResponse(_)),
            "body {body} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn invalid_mime_type_fails_before_any_request() {
    let mut record = sample_record();
    record.image.mime_type = "not a mime".to_string();
    let classifier = HttpClassifier::new(&settings_for(
        "http://127.0.0.1:9",
        Duration::from_secs(5),
    ))
    .expect("client");

    let err = classifier.classify(&record).await.expect_err("must fail");
    assert!(matches!(err, ClassifierError::InvalidRequest(_)), "got {err:?}");
    let notice = err.notice();
    assert_eq!(notice.kind, ErrorKind::InvalidRequest);
    assert!(notice.message.contains("not a mime"));
}
