// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `cts-report` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum CtsReportExitCode {}

impl CtsReportExitCode {
    /// No errors occurred and cts-report exited normally.
    pub const OK: i32 = 0;

    /// No report log was stored for the requested metrics key.
    pub const NO_METRICS_FOUND: i32 = 4;

    /// A user issue happened while setting up a cts-report invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The instrumentation event stream could not be read or decoded.
    pub const EVENT_STREAM_INVALID: i32 = 104;

    /// Writing the report, or data to stdout, produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
