// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::string::FromUtf8Error;
use thiserror::Error;

/// An error that occurs while serializing a [`Report`](crate::Report) or a
/// [`TestSuite`](crate::TestSuite).
///
/// Returned by [`Report::serialize`](crate::Report::serialize) and
/// [`Report::to_string`](crate::Report::to_string). A report that failed to serialize should be
/// treated as invalid: no partial-write recovery is attempted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writing XML events to the underlying writer failed.
    #[error("error serializing XML report")]
    Xml(#[from] quick_xml::Error),

    /// The serialized report could not be converted to a string.
    #[error("serialized XML report is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// An error that occurs while parsing a [`ReportLog`](crate::ReportLog) payload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportLogParseError {
    /// The payload is not a valid JSON report log.
    #[error("report log payload is not valid JSON")]
    Json(#[from] serde_json::Error),

    /// A metric in the payload has no values.
    #[error("metric `{name}` in report log has no values")]
    EmptyMetric {
        /// The name of the metric.
        name: String,
    },
}
