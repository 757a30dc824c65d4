// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface for aggregating device compatibility test events into XML reports.
//!
//! `cts-report aggregate` reads a JSON-lines instrumentation event stream and writes the XML
//! report. `cts-report metrics` prints the report log stored for a single test.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::CtsReportExitCode;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
