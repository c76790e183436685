#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use repsys_core::memory::StoredMessage;
use repsys_core::{ClassMask, MsgClass, MsgHandle, MsgState};
use repsys_relay::obs::RelayMetrics;
use repsys_relay::scanner::{BulkScanner, ScanReport};
use repsys_relay::ProcessorSettings;

use test_support::RecordingStore;

fn scanner(store: &Arc<RecordingStore>) -> (BulkScanner<RecordingStore>, Arc<RelayMetrics>) {
    let metrics = Arc::new(RelayMetrics::default());
    let s = BulkScanner::new(Arc::clone(store), ProcessorSettings::default(), Arc::clone(&metrics));
    (s, metrics)
}

#[test]
fn empty_range_returns_empty_report() {
    let store = Arc::new(RecordingStore::new());
    let (s, _) = scanner(&store);
    assert_eq!(s.scan_and_reclassify_all(ClassMask::DEFAULT_RANGE), ScanReport::default());
    assert!(store.published().is_empty());
}

#[test]
fn only_tracked_origin_is_reclassified() {
    let store = Arc::new(RecordingStore::new());
    let inner = &store.inner;
    let a = inner.insert(StoredMessage::new(MsgClass::Warning, 100, 1, 1, "a"));
    let b = inner.insert(StoredMessage::new(MsgClass::Warning, 50, 1, 1, "b"));
    let c = inner.insert(StoredMessage::new(MsgClass::Info, 100, 2, 2, "c").with_state(MsgState::ToResetAndQuit));
    let d = inner.insert(StoredMessage::new(MsgClass::Info, 100, 3, 3, "d"));
    // Outside the scanned range.
    let e = inner.insert(StoredMessage::new(MsgClass::Class20, 100, 4, 4, "e"));

    let (s, metrics) = scanner(&store);
    let report = s.scan_and_reclassify_all(ClassMask::DEFAULT_RANGE);

    assert_eq!(report.visited, 4);
    assert_eq!(report.tracked, 3);
    assert_eq!(report.reclassified, 2);
    assert_eq!(report.failures, 0);
    assert_eq!(report.last_handle, Some(d));

    assert_eq!(inner.get(a).unwrap().class, MsgClass::Class15);
    assert_eq!(inner.get(b).unwrap().class, MsgClass::Warning);
    assert_eq!(inner.get(c).unwrap().class, MsgClass::Class14);
    assert_eq!(inner.get(d).unwrap().class, MsgClass::Info);
    assert_eq!(inner.get(e).unwrap().class, MsgClass::Class20);

    let published: Vec<(MsgClass, u32)> = store.published().iter().map(|p| (p.class, p.comp_nr)).collect();
    assert_eq!(published, vec![(MsgClass::Class15, 100), (MsgClass::Class14, 100)]);
    assert_eq!(metrics.scanned.get(&[]), 4);

    // Reclassified messages left the range; a second pass finds nothing to do.
    let again = s.scan_and_reclassify_all(ClassMask::DEFAULT_RANGE);
    assert_eq!(again.visited, 2);
    assert_eq!(again.reclassified, 0);
}

#[test]
fn publish_failures_do_not_stop_the_scan() {
    let store = Arc::new(RecordingStore::new());
    for i in 1..=3 {
        store
            .inner
            .insert(StoredMessage::new(MsgClass::Class11, 100, i, i, format!("m{i}")));
    }
    store.fail_publish(true);

    let (s, metrics) = scanner(&store);
    let report = s.scan_and_reclassify_all(ClassMask::DEFAULT_RANGE);

    assert_eq!(report.visited, 3);
    assert_eq!(report.tracked, 3);
    assert_eq!(report.reclassified, 0);
    assert_eq!(report.failures, 3);
    assert_eq!(report.last_handle, Some(MsgHandle(3)));
    assert_eq!(store.published().len(), 3);
    assert_eq!(metrics.store_failures.get(&[("op", "publish")]), 3);
}
