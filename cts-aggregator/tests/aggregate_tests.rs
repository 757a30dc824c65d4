// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use cts_aggregator::{EventReader, MetricsKey, MetricsStore, ReportConfig, ResultAggregator};
use cts_results::TestStatus;
use indoc::indoc;
use pretty_assertions::assert_eq;

static EVENTS: &str = indoc! {r#"
    {"event": "run-started", "run-name": "CtsAppTestCases", "device-serial": "emulator-5554", "abi": "arm64-v8a", "timestamp-ms": 1718452800000}
    {"event": "test-started", "test": "android.app.cts.ActivityTest#testCreate", "timestamp-ms": 1718452801000}
    {"event": "test-ended", "test": "android.app.cts.ActivityTest#testCreate", "timestamp-ms": 1718452802000}
    {"event": "test-started", "test": "android.app.cts.ActivityTest#testDestroy", "timestamp-ms": 1718452802000}
    {"event": "test-failed", "test": "android.app.cts.ActivityTest#testDestroy", "trace": "java.lang.AssertionError: expected <1>\n\tat android.app.cts.ActivityTest.testDestroy(ActivityTest.java:42)"}
    {"event": "test-ended", "test": "android.app.cts.ActivityTest#testDestroy", "timestamp-ms": 1718452803000}
    {"event": "test-started", "test": "android.uihost.TaskSwitchingTest#testTaskswitching", "timestamp-ms": 1718452803000}
    {"event": "test-ended", "test": "android.uihost.TaskSwitchingTest#testTaskswitching", "timestamp-ms": 1718452833000, "metrics": {"COMPATIBILITY_TEST_RESULT": "{\"summary\": {\"name\": \"task switching time\", \"values\": [120.5], \"score-type\": \"lower_better\", \"unit\": \"ms\"}}"}}
    {"event": "test-started", "test": "android.app.cts.ServiceTest#testBind", "timestamp-ms": 1718452833000}
    {"event": "run-failed", "message": "Instrumentation run failed due to 'Process crashed.'"}
    {"event": "run-ended", "timestamp-ms": 1718452860000}
"#};

#[test]
fn aggregate_event_stream() {
    let config = ReportConfig::from_sources(Utf8Path::new("/nonexistent"), None)
        .expect("default config is valid");
    let store = MetricsStore::new();
    let mut aggregator = ResultAggregator::new(&config, &store);

    for event in EventReader::new(EVENTS.as_bytes()) {
        aggregator.write_event(event.expect("event is valid"));
    }

    let dir = camino_tempfile::tempdir().expect("created temp dir");
    let path = config.report_path(dir.path());
    let report = aggregator.finish(&path).expect("report written");

    let summary = report.summary();
    assert_eq!(summary.count(TestStatus::Pass), 2);
    assert_eq!(summary.count(TestStatus::Fail), 2);
    assert_eq!(summary.count(TestStatus::NotExecuted), 0);

    let android = report.root.child_suite("android").expect("android suite");
    let suite_names: Vec<_> = android.child_suites().filter_map(|s| s.name()).collect();
    assert_eq!(suite_names, ["app", "uihost"]);

    let xml = std::fs::read_to_string(&path).expect("report exists");
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains(r#"deviceSerial="emulator-5554""#));
    assert!(xml.contains(r#"<RunFailure message="Instrumentation run failed due to &apos;Process crashed.&apos;"/>"#));
    assert!(xml.contains(r#"<FailedScene message="java.lang.AssertionError: expected &lt;1&gt;">"#));

    let key: MetricsKey =
        "emulator-5554/arm64-v8a/android.uihost.TaskSwitchingTest#testTaskswitching"
            .parse()
            .expect("valid key");
    let log = store.get_result(&key).expect("report log stored");
    let summary = log.summary.expect("summary exists");
    assert_eq!(summary.values, [120.5]);
    assert_eq!(store.len(), 1);
}
