// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    report_log::ReportLog,
    sanitize::sanitize_stack_trace,
    status::{StatusTransition, TestStatus},
};
use std::cmp::Ordering;

/// The outcome of a single test method.
///
/// A `TestResult` is created when a test begins and is owned by the
/// [`CaseResult`](crate::CaseResult) for its class. Status changes go through
/// [`set_status`](Self::set_status), which refuses to move a failed test back to any other status.
#[derive(Clone, Debug)]
pub struct TestResult {
    case_name: String,
    name: String,
    // Epoch milliseconds.
    start_time: i64,
    end_time: i64,
    status: TestStatus,
    message: Option<String>,
    stack_trace: Option<String>,
    report_log: Option<ReportLog>,
    bug_report: Option<String>,
    log: Option<String>,
}

impl TestResult {
    /// Creates a new, not-yet-executed result for the given case and test name.
    pub fn new(case_name: impl Into<String>, name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            case_name: case_name.into(),
            name: name.into(),
            start_time: now,
            end_time: now,
            status: TestStatus::NotExecuted,
            message: None,
            stack_trace: None,
            report_log: None,
            bug_report: None,
            log: None,
        }
    }

    /// Returns the name of the case (test class) this result belongs to.
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Returns the test method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full name of this test, in the form `case#name`.
    pub fn full_name(&self) -> String {
        format!("{}#{}", self.case_name, self.name)
    }

    /// Returns the current status.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Updates the status, stamping the end time with the current time.
    ///
    /// A failed test stays failed: requests to move away from [`TestStatus::Fail`] are rejected
    /// and leave the result untouched. Use [`reset_result`](Self::reset_result) to start over.
    pub fn set_status(&mut self, status: TestStatus) -> StatusTransition {
        let transition = self.status.transition_to(status);
        if transition.is_applied() {
            self.status = status;
            self.end_time = now_millis();
        }
        transition
    }

    /// Returns the failure message: the first line of the stack trace.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the full, sanitized stack trace.
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Returns the time this test started, in milliseconds since the Unix epoch.
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Sets the time this test started, in milliseconds since the Unix epoch.
    pub fn set_start_time(&mut self, time: i64) -> &mut Self {
        self.start_time = time;
        self
    }

    /// Returns the time this test finished, in milliseconds since the Unix epoch.
    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    /// Sets the time this test finished, in milliseconds since the Unix epoch.
    pub fn set_end_time(&mut self, time: i64) -> &mut Self {
        self.end_time = time;
        self
    }

    /// Returns the metrics reported by this test, if any.
    pub fn report_log(&self) -> Option<&ReportLog> {
        self.report_log.as_ref()
    }

    /// Attaches metrics to this test, replacing any earlier ones.
    pub fn set_report_log(&mut self, report_log: ReportLog) -> &mut Self {
        self.report_log = Some(report_log);
        self
    }

    /// Returns the URI of the bug report captured for this test.
    pub fn bug_report(&self) -> Option<&str> {
        self.bug_report.as_deref()
    }

    /// Sets the URI of the bug report captured for this test.
    pub fn set_bug_report(&mut self, uri: impl Into<String>) -> &mut Self {
        self.bug_report = Some(uri.into());
        self
    }

    /// Returns the URI of the log captured for this test.
    pub fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    /// Sets the URI of the log captured for this test.
    pub fn set_log(&mut self, uri: impl Into<String>) -> &mut Self {
        self.log = Some(uri.into());
        self
    }

    /// Marks this test as failed with the given stack trace.
    ///
    /// The message is set to the first line of the trace, and the full trace is stored after
    /// being sanitized.
    pub fn failed(&mut self, trace: &str) {
        let _ = self.set_status(TestStatus::Fail);
        let message = match trace.split_once('\n') {
            Some((first_line, _)) => first_line,
            None => trace,
        };
        self.message = Some(message.to_owned());
        self.stack_trace = sanitize_stack_trace(Some(trace));
    }

    /// Marks this test as passed, attaching the given metrics.
    ///
    /// Has no effect if the test has already failed: both the status and the metrics are
    /// discarded in that case.
    pub fn passed(&mut self, report_log: Option<ReportLog>) -> StatusTransition {
        let transition = self.set_status(TestStatus::Pass);
        if transition.is_applied() {
            if let Some(report_log) = report_log {
                self.report_log = Some(report_log);
            }
        }
        transition
    }

    /// Resets this result so that the test can be executed again.
    ///
    /// This is the only way to move a result out of [`TestStatus::Fail`].
    pub fn reset_result(&mut self) {
        let now = now_millis();
        self.status = TestStatus::NotExecuted;
        self.start_time = now;
        self.end_time = now;
        self.message = None;
        self.stack_trace = None;
        self.report_log = None;
        self.bug_report = None;
        self.log = None;
    }

    /// Compares two results by test name.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    pub(crate) fn rekey(&mut self, case_name: &str, name: &str) {
        if self.case_name != case_name {
            self.case_name = case_name.to_owned();
        }
        if self.name != name {
            self.name = name.to_owned();
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
