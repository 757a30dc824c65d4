// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while aggregating compatibility test results.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use cts_results::SerializeError;
use std::{fmt, io};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse cts-report config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the underlying error.
    pub fn inner(&self) -> &ConfigError {
        &self.err
    }
}

/// Error returned while parsing a [`TestIdentifier`](crate::TestIdentifier) from a string.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid test identifier `{input}`: {kind}")]
pub struct TestIdentifierParseError {
    /// The input that failed to parse.
    pub input: String,

    /// The reason parsing failed.
    pub kind: TestIdentifierParseErrorKind,
}

impl TestIdentifierParseError {
    pub(crate) fn new(input: impl Into<String>, kind: TestIdentifierParseErrorKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }
}

/// The reason a [`TestIdentifier`](crate::TestIdentifier) failed to parse.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestIdentifierParseErrorKind {
    /// The input has no `#` between the class and the method.
    MissingSeparator,

    /// The class name is empty.
    EmptyClassName,

    /// The method name is empty.
    EmptyTestName,

    /// The class name contains an empty package segment, as in `a..Foo`.
    EmptySegment,
}

impl fmt::Display for TestIdentifierParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "expected `<class>#<method>`"),
            Self::EmptyClassName => write!(f, "class name is empty"),
            Self::EmptyTestName => write!(f, "method name is empty"),
            Self::EmptySegment => write!(f, "class name has an empty package segment"),
        }
    }
}

/// Error returned while parsing or constructing a [`MetricsKey`](crate::MetricsKey).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum MetricsKeyParseError {
    /// The input does not have the form `<serial>/<abi>/<class>#<method>`.
    #[error("invalid metrics key `{input}`: expected `<device-serial>/<abi>/<class>#<method>`")]
    InvalidFormat {
        /// The input that failed to parse.
        input: String,
    },

    /// The device serial is empty or contains `/`.
    #[error("invalid device serial `{serial}` (must be non-empty and not contain `/`)")]
    InvalidDeviceSerial {
        /// The device serial.
        serial: String,
    },

    /// The ABI is empty or contains `/`.
    #[error("invalid ABI `{abi}` (must be non-empty and not contain `/`)")]
    InvalidAbi {
        /// The ABI.
        abi: String,
    },

    /// The test portion of the key is not a valid test identifier.
    #[error("invalid test in metrics key")]
    Test(#[from] TestIdentifierParseError),
}

/// An error that occurred while reading an instrumentation event stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventParseError {
    /// Reading from the underlying stream failed.
    #[error("error reading event stream")]
    Io(#[from] io::Error),

    /// A line of the stream is not a valid event.
    #[error("invalid event on line {line_number}")]
    Json {
        /// The 1-based line number of the invalid event.
        line_number: usize,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },
}

/// An error that occurred while writing a report to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// A file system operation failed.
    #[error("error writing report to `{path}`")]
    Fs {
        /// The path that was being written.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The report could not be serialized.
    #[error("error serializing report to `{path}`")]
    Serialize {
        /// The path that was being written.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: SerializeError,
    },
}
