#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use repsys_core::memory::StoredMessage;
use repsys_core::MsgClass;
use repsys_relay::obs::RelayMetrics;
use repsys_relay::ops::{self, OpsState};
use repsys_relay::poller::{PollOutcome, Poller};
use repsys_relay::queue::MessageQueue;
use repsys_relay::{MessageProcessor, ProcessorSettings};

use test_support::{CollectingSink, RecordingStore};

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_is_always_ok() {
    let resp = ops::healthz().await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");
}

#[tokio::test]
async fn readyz_turns_unavailable_after_stop() {
    let store = Arc::new(RecordingStore::new());
    let metrics = Arc::new(RelayMetrics::default());
    let p = MessageProcessor::new(store, ProcessorSettings::default(), Arc::new(CollectingSink::default()))
        .with_metrics(Arc::clone(&metrics));
    let state = OpsState::new(Arc::clone(&metrics));

    let resp = ops::readyz(State(state.clone())).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ready");

    p.stop();

    let resp = ops::readyz(State(state)).await.into_response();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(resp).await, "stopping");
}

#[tokio::test]
async fn metrics_renders_relay_counters() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(MessageQueue::new());
    let metrics = Arc::new(RelayMetrics::default());
    let mut poller = Poller::new(
        Arc::clone(&store),
        queue,
        ProcessorSettings::default(),
        Arc::clone(&metrics),
    );
    let h = store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 1, 1, "guard open"));
    assert_eq!(poller.poll_once(), PollOutcome::Enqueued(h));

    let resp = ops::metrics(State(OpsState::new(Arc::clone(&metrics)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/plain"), "content type {content_type}");

    let body = body_text(resp).await;
    assert!(body.contains("repsys_polls_total{outcome=\"enqueued\"} 1"), "{body}");
    assert!(body.contains("repsys_reclassified_total{class=\"Class15\"} 1"), "{body}");
    assert!(body.contains("repsys_queue_depth 1"), "{body}");
    assert!(body.contains("repsys_stopping 0"), "{body}");
}
