// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregates instrumentation events from device test runs into compatibility test reports.
//!
//! [`EventReader`] decodes a JSON-lines event stream, and [`ResultAggregator`] folds the events
//! into a [`Report`](cts_results::Report). Report logs attached to passing tests are collected in
//! a [`MetricsStore`].

mod aggregator;
mod errors;
mod events;
mod identifier;
mod metrics_store;
mod report_config;

pub use aggregator::*;
pub use errors::*;
pub use events::*;
pub use identifier::*;
pub use metrics_store::*;
pub use report_config::*;
