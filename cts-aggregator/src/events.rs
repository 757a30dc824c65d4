// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instrumentation events, as reported by the device-side test runner.
//!
//! Events are read as JSON lines: one object per line, tagged by its `"event"` field.

use crate::{errors::EventParseError, identifier::TestIdentifier};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, io::BufRead};

/// A single instrumentation event.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(
    tag = "event",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
#[non_exhaustive]
pub enum InstrumentationEvent {
    /// A test run started on a device.
    RunStarted {
        /// The name of the run, as reported by the device.
        run_name: Option<String>,

        /// The serial number of the device.
        device_serial: Option<String>,

        /// The ABI the run executes under.
        abi: Option<String>,

        /// The time the run started, in milliseconds since the Unix epoch.
        timestamp_ms: Option<i64>,
    },

    /// A test started.
    TestStarted {
        /// The test.
        test: TestIdentifier,

        /// The time the test started, in milliseconds since the Unix epoch.
        timestamp_ms: Option<i64>,
    },

    /// A test failed.
    TestFailed {
        /// The test.
        test: TestIdentifier,

        /// The failure trace. The first line is the failure message.
        trace: String,
    },

    /// Artifacts were collected for a test.
    TestArtifacts {
        /// The test.
        test: TestIdentifier,

        /// The URI of a bug report.
        bug_report: Option<String>,

        /// The URI of a log.
        log: Option<String>,
    },

    /// A test ended.
    TestEnded {
        /// The test.
        test: TestIdentifier,

        /// Metrics reported by the test, as string key-value pairs.
        #[serde(default)]
        metrics: BTreeMap<String, String>,

        /// The time the test ended, in milliseconds since the Unix epoch.
        timestamp_ms: Option<i64>,
    },

    /// The run failed to complete.
    RunFailed {
        /// The reason the run failed.
        message: String,
    },

    /// The run ended.
    RunEnded {
        /// The time the run ended, in milliseconds since the Unix epoch.
        timestamp_ms: Option<i64>,
    },
}

/// Reads [`InstrumentationEvent`]s from a JSON-lines stream.
///
/// Blank lines are skipped. Iteration continues past an invalid line, so callers decide whether
/// to stop at the first error. Lines that are not valid UTF-8 are reported as invalid events.
#[derive(Debug)]
pub struct EventReader<R> {
    reader: R,
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> EventReader<R> {
    /// Creates a new reader over the given stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<InstrumentationEvent, EventParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(EventParseError::Io(err))),
            }
            self.line_number += 1;

            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let line_number = self.line_number;
            return Some(
                serde_json::from_slice(line)
                    .map_err(|err| EventParseError::Json { line_number, err }),
            );
        }
    }
}
