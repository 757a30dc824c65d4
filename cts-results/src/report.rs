// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::SerializeError, serialize::serialize_report, status::TestStatus, suite::TestSuite,
};
use std::io;

/// The root element of a compatibility test report.
///
/// A report holds run-level metadata and the anonymous root of the result tree.
#[derive(Clone, Debug)]
pub struct Report {
    /// The name of this report.
    pub name: String,

    /// The serial number of the device the tests ran on.
    pub device_serial: Option<String>,

    /// The ABI the tests ran under.
    pub abi: Option<String>,

    /// The time at which the run started, in milliseconds since the Unix epoch.
    pub start_time: Option<i64>,

    /// The time at which the run ended, in milliseconds since the Unix epoch.
    pub end_time: Option<i64>,

    /// The reason the run failed to complete, if it did.
    pub run_failure: Option<String>,

    /// The root of the result tree.
    pub root: TestSuite,
}

impl Report {
    /// Creates a new, empty `Report` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_serial: None,
            abi: None,
            start_time: None,
            end_time: None,
            run_failure: None,
            root: TestSuite::root(),
        }
    }

    /// Sets the device serial number.
    pub fn set_device_serial(&mut self, device_serial: impl Into<String>) -> &mut Self {
        self.device_serial = Some(device_serial.into());
        self
    }

    /// Sets the ABI.
    pub fn set_abi(&mut self, abi: impl Into<String>) -> &mut Self {
        self.abi = Some(abi.into());
        self
    }

    /// Sets the start time of the run.
    pub fn set_start_time(&mut self, time: i64) -> &mut Self {
        self.start_time = Some(time);
        self
    }

    /// Sets the end time of the run.
    pub fn set_end_time(&mut self, time: i64) -> &mut Self {
        self.end_time = Some(time);
        self
    }

    /// Records that the run failed to complete.
    pub fn set_run_failure(&mut self, message: impl Into<String>) -> &mut Self {
        self.run_failure = Some(message.into());
        self
    }

    /// Replaces the result tree.
    pub fn set_root(&mut self, root: TestSuite) -> &mut Self {
        self.root = root;
        self
    }

    /// Computes pass, fail and not-executed counts across the whole tree.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            pass: self.root.count_results(TestStatus::Pass),
            fail: self.root.count_results(TestStatus::Fail),
            not_executed: self.root.count_results(TestStatus::NotExecuted),
        }
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_report(self, writer)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Counts of results by status.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultSummary {
    /// The number of tests that passed.
    pub pass: usize,

    /// The number of tests that failed.
    pub fail: usize,

    /// The number of tests that did not finish executing.
    pub not_executed: usize,
}

impl ResultSummary {
    /// Returns the total number of tests.
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.not_executed
    }

    /// Returns the count for the given status.
    pub fn count(&self, status: TestStatus) -> usize {
        match status {
            TestStatus::Pass => self.pass,
            TestStatus::Fail => self.fail,
            TestStatus::NotExecuted => self.not_executed,
        }
    }
}
