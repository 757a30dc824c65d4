// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{exit_codes::CtsReportExitCode, output::StderrStyles};
use camino::{FromPathBufError, Utf8PathBuf};
use cts_aggregator::{ConfigParseError, EventParseError, MetricsKey, WriteReportError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure while running cts-report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("failed to open event stream")]
    EventsOpenFailed {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("event stream is invalid")]
    EventStreamInvalid {
        path: Utf8PathBuf,
        #[source]
        err: EventParseError,
    },
    #[error("error writing report")]
    WriteReportError {
        #[from]
        err: WriteReportError,
    },
    #[error("error serializing report log")]
    SerializeReportLogError {
        #[source]
        err: serde_json::Error,
    },
    #[error("error writing to output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
    #[error("no metrics found")]
    NoMetricsFound { key: MetricsKey },
    #[error("test run failed")]
    TestRunFailed { failed: usize },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::EventsOpenFailed { .. } => CtsReportExitCode::SETUP_ERROR,
            Self::EventStreamInvalid { .. } => CtsReportExitCode::EVENT_STREAM_INVALID,
            Self::WriteReportError { .. }
            | Self::SerializeReportLogError { .. }
            | Self::WriteOutputError { .. } => CtsReportExitCode::WRITE_OUTPUT_ERROR,
            Self::NoMetricsFound { .. } => CtsReportExitCode::NO_METRICS_FOUND,
            Self::TestRunFailed { .. } => CtsReportExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { error } => {
                error!("could not determine current directory");
                Some(error as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!("current directory is not valid UTF-8");
                Some(err as &dyn Error)
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.inner() as &dyn Error)
            }
            Self::EventsOpenFailed { path, err } => {
                error!("failed to open event stream `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::EventStreamInvalid { path, err } => {
                error!("event stream `{}` is invalid", path.style(styles.bold));
                // The line number is part of the error itself.
                Some(err as &dyn Error)
            }
            Self::WriteReportError { err } => {
                error!("{err}");
                err.source()
            }
            Self::SerializeReportLogError { err } => {
                error!("failed to serialize report log");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write to output");
                Some(err as &dyn Error)
            }
            Self::NoMetricsFound { key } => {
                error!("no metrics found for `{}`", key.style(styles.bold));
                None
            }
            Self::TestRunFailed { failed } => {
                error!(
                    "test run failed: {} {}",
                    failed.style(styles.fail),
                    if *failed == 1 { "test" } else { "tests" }
                );
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: crate::output::NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
