// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model and XML serializer for device compatibility test results.
//!
//! Results are organized as a tree: package segments form nested [`TestSuite`]s, test classes
//! form [`CaseResult`]s, and each test method is a [`TestResult`]. A [`Report`] wraps the tree
//! along with run metadata and serializes everything to XML.

mod case;
mod errors;
mod report;
mod report_log;
mod result;
mod sanitize;
mod serialize;
mod status;
mod suite;

pub use case::*;
pub use errors::*;
pub use report::*;
pub use report_log::*;
pub use result::*;
pub use sanitize::*;
pub use status::*;
pub use suite::*;
