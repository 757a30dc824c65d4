// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ReportLogParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance metrics reported by a single test.
///
/// A report log carries an optional summary metric (the headline score for the test) and any
/// number of detail metrics, in the order they were recorded. Device-side tests send report logs
/// as JSON payloads through the instrumentation status channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportLog {
    /// The summary metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Metric>,

    /// Detail metrics, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Metric>,
}

impl ReportLog {
    /// Creates a new, empty `ReportLog`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a report log from a JSON payload.
    pub fn parse(payload: &str) -> Result<Self, ReportLogParseError> {
        let report: ReportLog = serde_json::from_str(payload)?;
        for metric in report.summary.iter().chain(&report.details) {
            if metric.values.is_empty() {
                return Err(ReportLogParseError::EmptyMetric {
                    name: metric.name.clone(),
                });
            }
        }
        Ok(report)
    }

    /// Sets the summary metric.
    pub fn set_summary(
        &mut self,
        name: impl Into<String>,
        value: f64,
        score_type: ScoreType,
        unit: ResultUnit,
    ) -> &mut Self {
        self.summary = Some(Metric::new(name, [value], score_type, unit));
        self
    }

    /// Adds a detail metric with a single value.
    pub fn add_value(
        &mut self,
        name: impl Into<String>,
        value: f64,
        score_type: ScoreType,
        unit: ResultUnit,
    ) -> &mut Self {
        self.add_values(name, [value], score_type, unit)
    }

    /// Adds a detail metric with several values.
    pub fn add_values(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
        score_type: ScoreType,
        unit: ResultUnit,
    ) -> &mut Self {
        self.details.push(Metric::new(name, values, score_type, unit));
        self
    }

    /// Returns true if this report log has no metrics.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.details.is_empty()
    }
}

/// A named metric with one or more values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metric {
    /// A free-form description of what was measured.
    pub name: String,

    /// The measured values.
    pub values: Vec<f64>,

    /// How the values should be interpreted.
    #[serde(default)]
    pub score_type: ScoreType,

    /// The unit of the values.
    #[serde(default)]
    pub unit: ResultUnit,
}

impl Metric {
    /// Creates a new `Metric`.
    pub fn new(
        name: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
        score_type: ScoreType,
        unit: ResultUnit,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().collect(),
            score_type,
            unit,
        }
    }
}

/// How a metric's values should be interpreted.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// Higher values are better.
    HigherBetter,

    /// Lower values are better.
    LowerBetter,

    /// Values are informational.
    #[default]
    Neutral,

    /// Values indicate a potential problem.
    Warning,
}

impl ScoreType {
    /// Returns the string used for this score type in XML reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreType::HigherBetter => "higher_better",
            ScoreType::LowerBetter => "lower_better",
            ScoreType::Neutral => "neutral",
            ScoreType::Warning => "warning",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of a metric's values.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultUnit {
    #[default]
    None,
    Ms,
    Fps,
    Ops,
    Kbps,
    Mbps,
    Byte,
    Count,
    Score,
}

impl ResultUnit {
    /// Returns the string used for this unit in XML reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultUnit::None => "none",
            ResultUnit::Ms => "ms",
            ResultUnit::Fps => "fps",
            ResultUnit::Ops => "ops",
            ResultUnit::Kbps => "kbps",
            ResultUnit::Mbps => "mbps",
            ResultUnit::Byte => "byte",
            ResultUnit::Count => "count",
            ResultUnit::Score => "score",
        }
    }
}

impl fmt::Display for ResultUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
