// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::WriteReportError,
    events::InstrumentationEvent,
    identifier::TestIdentifier,
    metrics_store::{MetricsKey, MetricsStore},
    report_config::ReportConfig,
};
use camino::Utf8Path;
use cts_results::{Report, ReportLog, TestResult, TestStatus};
use debug_ignore::DebugIgnore;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
};
use tracing::{debug, warn};

/// Builds a [`Report`] out of a stream of [`InstrumentationEvent`]s.
///
/// One aggregator handles one run on one device and ABI. Report logs attached to passing tests
/// are also stored in a [`MetricsStore`], which may be shared with other aggregators.
#[derive(Debug)]
pub struct ResultAggregator<'a> {
    config: &'a ReportConfig,
    metrics_store: &'a MetricsStore,
    report: DebugIgnore<Report>,
    current_test: Option<TestIdentifier>,
}

impl<'a> ResultAggregator<'a> {
    /// Creates a new aggregator with an empty report.
    pub fn new(config: &'a ReportConfig, metrics_store: &'a MetricsStore) -> Self {
        Self {
            config,
            metrics_store,
            report: DebugIgnore(Report::new(config.report_name())),
            current_test: None,
        }
    }

    /// Applies a single event to the report.
    pub fn write_event(&mut self, event: InstrumentationEvent) {
        match event {
            InstrumentationEvent::RunStarted {
                run_name,
                device_serial,
                abi,
                timestamp_ms,
            } => {
                debug!(?run_name, ?device_serial, ?abi, "run started");
                if let Some(device_serial) = device_serial {
                    self.report.set_device_serial(device_serial);
                }
                if let Some(abi) = abi {
                    self.report.set_abi(abi);
                }
                self.report.set_start_time(timestamp_ms.unwrap_or_else(now_millis));
            }
            InstrumentationEvent::TestStarted { test, timestamp_ms } => {
                debug!(%test, "test started");
                let result = self.result_mut(&test);
                // A retried test starts from scratch.
                result.reset_result();
                if let Some(timestamp_ms) = timestamp_ms {
                    result.set_start_time(timestamp_ms);
                }
                self.current_test = Some(test);
            }
            InstrumentationEvent::TestFailed { test, trace } => {
                debug!(%test, "test failed");
                self.result_mut(&test).failed(&trace);
            }
            InstrumentationEvent::TestArtifacts {
                test,
                bug_report,
                log,
            } => {
                let result = self.result_mut(&test);
                if let Some(bug_report) = bug_report {
                    result.set_bug_report(bug_report);
                }
                if let Some(log) = log {
                    result.set_log(log);
                }
            }
            InstrumentationEvent::TestEnded {
                test,
                metrics,
                timestamp_ms,
            } => {
                self.test_ended(&test, &metrics, timestamp_ms);
                if self.current_test.as_ref() == Some(&test) {
                    self.current_test = None;
                }
            }
            InstrumentationEvent::RunFailed { message } => {
                debug!(%message, "run failed");
                if let Some(test) = self.current_test.take() {
                    let result = self.result_mut(&test);
                    // Keep the test's own failure trace if it already reported one.
                    if result.status() != TestStatus::Fail {
                        result.failed(&message);
                    }
                }
                self.report.set_run_failure(message);
            }
            InstrumentationEvent::RunEnded { timestamp_ms } => {
                debug!("run ended");
                self.report.set_end_time(timestamp_ms.unwrap_or_else(now_millis));
            }
        }
    }

    /// Returns the report built so far.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Consumes the aggregator, returning the report without writing it out.
    pub fn into_report(self) -> Report {
        self.report.0
    }

    /// Writes the report to `path`, creating parent directories as necessary.
    pub fn finish(self, path: &Utf8Path) -> Result<Report, WriteReportError> {
        let report = self.into_report();

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| WriteReportError::Fs {
                path: dir.to_path_buf(),
                error,
            })?;
        }

        let f = File::create(path).map_err(|error| WriteReportError::Fs {
            path: path.to_path_buf(),
            error,
        })?;
        let mut writer = BufWriter::new(f);
        report
            .serialize(&mut writer)
            .map_err(|error| WriteReportError::Serialize {
                path: path.to_path_buf(),
                error,
            })?;
        writer.flush().map_err(|error| WriteReportError::Fs {
            path: path.to_path_buf(),
            error,
        })?;

        debug!(%path, "wrote report");
        Ok(report)
    }

    fn test_ended(
        &mut self,
        test: &TestIdentifier,
        metrics: &BTreeMap<String, String>,
        timestamp_ms: Option<i64>,
    ) {
        let report_log = metrics
            .get(self.config.result_key())
            .and_then(|payload| match ReportLog::parse(payload) {
                Ok(report_log) => Some(report_log),
                Err(error) => {
                    warn!(%test, "ignoring malformed report log: {error}");
                    None
                }
            });

        let result = self.result_mut(test);
        let transition = result.passed(report_log.clone());
        if let Some(timestamp_ms) = timestamp_ms {
            result.set_end_time(timestamp_ms);
        }
        debug!(%test, status = %result.status(), "test ended");

        if !transition.is_applied() || !self.config.store_metrics() {
            return;
        }
        let Some(report_log) = report_log else {
            return;
        };
        let (Some(device_serial), Some(abi)) =
            (self.report.device_serial.as_deref(), self.report.abi.as_deref())
        else {
            debug!(%test, "no device serial or ABI known, not storing report log");
            return;
        };

        match MetricsKey::new(device_serial, abi, test.clone()) {
            Ok(key) => {
                self.metrics_store.store_result(key, report_log);
            }
            Err(error) => {
                warn!(%test, "not storing report log: {error}");
            }
        }
    }

    fn result_mut(&mut self, test: &TestIdentifier) -> &mut TestResult {
        self.report.root.get_or_create_result(
            &test.package_segments(),
            test.simple_class_name(),
            test.test_name(),
        )
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
