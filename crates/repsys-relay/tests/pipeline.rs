//! Poller -> queue -> display scenarios, driven one round at a time.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use repsys_core::memory::StoredMessage;
use repsys_core::{ApiState, MsgClass, MsgHandle, MsgState};
use repsys_relay::display::DisplayConsumer;
use repsys_relay::obs::RelayMetrics;
use repsys_relay::poller::{PollOutcome, Poller};
use repsys_relay::queue::MessageQueue;
use repsys_relay::ProcessorSettings;

use test_support::{CollectingSink, RecordingStore};

struct Rig {
    store: Arc<RecordingStore>,
    queue: Arc<MessageQueue>,
    sink: Arc<CollectingSink>,
    metrics: Arc<RelayMetrics>,
    poller: Poller<RecordingStore>,
    display: DisplayConsumer<RecordingStore>,
}

fn rig() -> Rig {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(MessageQueue::new());
    let sink = Arc::new(CollectingSink::default());
    let metrics = Arc::new(RelayMetrics::default());
    let settings = ProcessorSettings::default();

    let poller = Poller::new(Arc::clone(&store), Arc::clone(&queue), settings, Arc::clone(&metrics));
    let display = DisplayConsumer::new(
        Arc::clone(&store),
        Arc::clone(&queue),
        sink.clone(),
        settings.content_len,
        Arc::clone(&metrics),
    );
    Rig { store, queue, sink, metrics, poller, display }
}

#[test]
fn tracked_warning_is_reclassified_queued_and_displayed() {
    let mut r = rig();
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 1, 4242, "safety door open"));

    assert_eq!(r.poller.last_seen(), MsgHandle::NONE);
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(h));
    assert_eq!(r.poller.last_seen(), h);

    let published = r.store.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].class, MsgClass::Class15);
    assert_eq!(published[0].comp_nr, 100);
    assert_eq!(published[0].inst_nr, 1);
    assert_eq!(published[0].msg_nr, 4242);
    assert_eq!(published[0].format, "%s");
    assert_eq!(published[0].args, vec!["safety door open".to_string()]);
    assert_eq!(r.queue.len(), 1);

    assert_eq!(r.display.drain_once(), 1);
    assert_eq!(r.sink.lines(), vec![(h, "safety door open".to_string())]);
    assert!(r.queue.is_empty());
    assert_eq!(r.metrics.reclassified.get(&[("class", "Class15")]), 1);
}

#[test]
fn untracked_origin_advances_last_seen_without_side_effects() {
    let mut r = rig();
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 999, 1, 4242, "conveyor jam"));

    assert_eq!(r.poller.poll_once(), PollOutcome::Filtered(h));
    assert_eq!(r.poller.last_seen(), h);
    assert!(r.store.published().is_empty());
    assert!(r.queue.is_empty());

    // Same top message next round: nothing new.
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(r.display.drain_once(), 0);
    assert!(r.sink.lines().is_empty());
}

#[test]
fn unchanged_message_is_queued_once() {
    let mut r = rig();
    let h = r.store.inner.insert(
        StoredMessage::new(MsgClass::Info, 100, 1, 1, "lubrication due").with_state(MsgState::Undefined),
    );

    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(h));
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);

    // Info/Undefined needs no new class: queued, never republished.
    assert!(r.store.published().is_empty());
    assert_eq!(r.queue.len(), 1);
}

#[test]
fn empty_store_is_a_store_error_round() {
    let mut r = rig();
    assert_eq!(r.poller.poll_once(), PollOutcome::StoreError(ApiState::NotOk));
    assert_eq!(r.poller.last_seen(), MsgHandle::NONE);
    assert_eq!(r.metrics.polls.get(&[("outcome", "store_error")]), 1);
}

#[test]
fn failed_republish_still_queues() {
    let mut r = rig();
    r.store.fail_publish(true);
    let h = r.store.inner.insert(
        StoredMessage::new(MsgClass::Error, 100, 3, 12, "estop pressed").with_state(MsgState::ToReset),
    );

    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(h));
    assert_eq!(r.store.published().len(), 1);
    assert_eq!(r.store.published()[0].class, MsgClass::Class14);
    assert_eq!(r.metrics.store_failures.get(&[("op", "publish")]), 1);

    let queued = r.queue.drain_all();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].class(), MsgClass::Class14);
}

#[test]
fn display_shows_backlog_newest_first() {
    let mut r = rig();
    let a = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Class8, 100, 1, 1, "first"));
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(a));

    let b = r.store.inner.insert(
        StoredMessage::new(MsgClass::Info, 100, 2, 2, "second").with_state(MsgState::ToQuit),
    );
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(b));

    assert_eq!(r.display.drain_once(), 2);
    assert_eq!(
        r.sink.lines(),
        vec![(b, "second".to_string()), (a, "first".to_string())]
    );
    assert_eq!(r.metrics.displayed.get(&[]), 2);
}

#[test]
fn display_truncates_to_content_len() {
    let mut r = rig();
    let long = "x".repeat(200);
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 1, 1, long.clone()));
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(h));

    // The republished text is already cut to the buffer size.
    assert_eq!(r.store.published()[0].args[0].len(), 59);

    r.display.drain_once();
    let lines = r.sink.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1.len(), 59);
}

#[test]
fn older_message_surfacing_after_reclassification_is_not_requeued() {
    let mut r = rig();
    let info = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Info, 100, 1, 1, "lubrication due"));
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(info));

    let warning = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 2, 2, "guard open"));
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(warning));

    // The warning now sits in Class15, outside the range; the older info
    // message is the newest in range again.
    assert_eq!(r.store.inner.get(warning).unwrap().class, MsgClass::Class15);
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(r.poller.last_seen(), warning);

    let handles: Vec<MsgHandle> = r.queue.drain_all().iter().map(|m| m.handle()).collect();
    assert_eq!(handles, vec![warning, info]);
}

#[test]
fn unknown_class_code_is_rejected_once() {
    let mut r = rig();
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 1, 1, "odd class"));
    r.store.report_raw_codes(h, 0x18, MsgState::Undefined.code());

    assert_eq!(r.poller.poll_once(), PollOutcome::Rejected(h));
    assert_eq!(r.poller.last_seen(), h);
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);

    assert!(r.queue.is_empty());
    assert!(r.store.published().is_empty());
    assert_eq!(r.metrics.polls.get(&[("outcome", "rejected")]), 1);
    assert_eq!(r.metrics.store_failures.get(&[("op", "metadata")]), 0);
}

#[test]
fn unknown_state_code_is_rejected_once() {
    let mut r = rig();
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Error, 100, 1, 1, "odd state"));
    r.store.report_raw_codes(h, MsgClass::Error.bits(), 42);

    assert_eq!(r.poller.poll_once(), PollOutcome::Rejected(h));
    assert_eq!(r.poller.last_seen(), h);
    assert_eq!(r.poller.poll_once(), PollOutcome::Unchanged);
    assert!(r.queue.is_empty());
}

#[test]
fn metadata_failure_is_retried_next_round() {
    let mut r = rig();
    let h = r
        .store
        .inner
        .insert(StoredMessage::new(MsgClass::Warning, 100, 1, 1, "retry me"));

    r.store.fail_metadata(true);
    assert_eq!(r.poller.poll_once(), PollOutcome::StoreError(ApiState::ComNotRunning));
    assert_eq!(r.poller.last_seen(), MsgHandle::NONE);
    assert_eq!(r.metrics.store_failures.get(&[("op", "metadata")]), 1);
    assert!(r.queue.is_empty());

    r.store.fail_metadata(false);
    assert_eq!(r.poller.poll_once(), PollOutcome::Enqueued(h));
    assert_eq!(r.poller.last_seen(), h);
    assert_eq!(r.queue.len(), 1);
}
