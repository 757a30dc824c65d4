// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use cts_results::{Report, ReportLog, ResultUnit, ScoreType, TestResult};
use goldenfile::Mint;

// 2024-06-15T12:00:00Z
const START: i64 = 1_718_452_800_000;

#[test]
fn fixtures() {
    let mut mint = Mint::new("tests/fixtures");

    let f = mint
        .new_goldenfile("basic_report.xml")
        .expect("creating new goldenfile succeeds");

    let basic_report = basic_report();
    basic_report
        .serialize(f)
        .expect("serializing basic_report succeeds");
}

fn at(seconds: i64) -> i64 {
    START + seconds * 1000
}

fn basic_report() -> Report {
    let mut report = Report::new("cts-tests");
    report
        .set_device_serial("emulator-5554")
        .set_abi("arm64-v8a")
        .set_start_time(at(0))
        .set_end_time(at(60));

    let app_cts = ["android", "app", "cts"];

    let mut result = TestResult::new("ActivityTest", "testCreate");
    let _ = result.passed(None);
    result.set_start_time(at(1)).set_end_time(at(2));
    report
        .root
        .insert_test(&app_cts, "ActivityTest", "testCreate", result);

    let mut result = TestResult::new("ActivityTest", "testDestroy");
    result.failed(
        "junit.framework.AssertionFailedError: expected:<1> but was:<2>\n\
         \tat android.app.cts.ActivityTest.testDestroy(ActivityTest.java:42)",
    );
    // A report log that arrives after a failure is dropped.
    let _ = result.passed(Some(ReportLog::new()));
    result
        .set_start_time(at(2))
        .set_end_time(at(3))
        .set_bug_report("file:///tmp/bugreport.zip")
        .set_log("file:///tmp/logcat.txt");
    report
        .root
        .insert_test(&app_cts, "ActivityTest", "testDestroy", result);

    let mut report_log = ReportLog::new();
    report_log
        .set_summary(
            "task switching time",
            120.5,
            ScoreType::LowerBetter,
            ResultUnit::Ms,
        )
        .add_values(
            "switch samples",
            [118.0, 123.25],
            ScoreType::Neutral,
            ResultUnit::Ms,
        );
    let mut result = TestResult::new("TaskSwitchingTest", "testTaskswitching");
    let _ = result.passed(Some(report_log));
    result.set_start_time(at(3)).set_end_time(at(33));
    report.root.insert_test(
        &["android", "uihost"],
        "TaskSwitchingTest",
        "testTaskswitching",
        result,
    );

    // Started but never finished.
    let result = report
        .root
        .get_or_create_result(&app_cts, "ServiceTest", "testBind");
    result.set_start_time(at(5)).set_end_time(at(5));

    report
}
