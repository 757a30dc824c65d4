// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{
    CaseResult, Metric, Report, ReportLog, SerializeError, TestResult, TestStatus, TestSuite,
    sanitize::sanitize_xml_text,
};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::{
    Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io;

static RESULT_TAG: &str = "TestResult";
static SUMMARY_TAG: &str = "Summary";
static RUN_FAILURE_TAG: &str = "RunFailure";
static TEST_SUITE_TAG: &str = "TestSuite";
static TEST_CASE_TAG: &str = "TestCase";
static TEST_TAG: &str = "Test";
static FAILED_SCENE_TAG: &str = "FailedScene";
static STACK_TRACE_TAG: &str = "StackTrace";
static DETAILS_TAG: &str = "Details";
static VALUE_ARRAY_TAG: &str = "ValueArray";
static VALUE_TAG: &str = "Value";

pub(crate) fn serialize_report(
    report: &Report,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()?;
    Ok(())
}

pub(crate) fn serialize_fragment(
    suite: &TestSuite,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);
    serialize_test_suite(suite, &mut writer)?;
    Ok(())
}

fn serialize_report_impl(
    report: &Report,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let Report {
        name,
        device_serial,
        abi,
        start_time,
        end_time,
        run_failure,
        root,
    } = report;

    let mut result_tag = BytesStart::new(RESULT_TAG);
    result_tag.push_attribute(("name", &*sanitize_xml_text(name)));
    if let Some(device_serial) = device_serial {
        result_tag.push_attribute(("deviceSerial", &*sanitize_xml_text(device_serial)));
    }
    if let Some(abi) = abi {
        result_tag.push_attribute(("abi", &*sanitize_xml_text(abi)));
    }
    if let Some(start_time) = start_time {
        result_tag.push_attribute(("starttime", serialize_timestamp(*start_time).as_str()));
    }
    if let Some(end_time) = end_time {
        result_tag.push_attribute(("endtime", serialize_timestamp(*end_time).as_str()));
    }
    writer.write_event(Event::Start(result_tag))?;

    let summary = report.summary();
    let mut summary_tag = BytesStart::new(SUMMARY_TAG);
    summary_tag.extend_attributes([
        ("pass", summary.pass.to_string().as_str()),
        ("failed", summary.fail.to_string().as_str()),
        ("notExecuted", summary.not_executed.to_string().as_str()),
    ]);
    writer.write_event(Event::Empty(summary_tag))?;

    if let Some(run_failure) = run_failure {
        let mut run_failure_tag = BytesStart::new(RUN_FAILURE_TAG);
        let message = escape_multiline_attribute(run_failure);
        run_failure_tag.push_attribute(("message".as_bytes(), message.as_bytes()));
        writer.write_event(Event::Empty(run_failure_tag))?;
    }

    serialize_test_suite(root, writer)?;

    serialize_end_tag(RESULT_TAG, writer)?;
    Ok(())
}

fn serialize_test_suite(
    suite: &TestSuite,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // The anonymous root only contributes its children.
    if let Some(name) = suite.name() {
        let mut suite_tag = BytesStart::new(TEST_SUITE_TAG);
        suite_tag.push_attribute(("name", &*sanitize_xml_text(name)));
        writer.write_event(Event::Start(suite_tag))?;
    }

    for child in suite.child_suites() {
        serialize_test_suite(child, writer)?;
    }
    for case in suite.cases() {
        serialize_case(case, writer)?;
    }

    if suite.name().is_some() {
        serialize_end_tag(TEST_SUITE_TAG, writer)?;
    }
    Ok(())
}

fn serialize_case(
    case: &CaseResult,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut case_tag = BytesStart::new(TEST_CASE_TAG);
    case_tag.push_attribute(("name", &*sanitize_xml_text(case.name())));

    if case.is_empty() {
        return writer.write_event(Event::Empty(case_tag));
    }

    writer.write_event(Event::Start(case_tag))?;
    for result in case.results() {
        serialize_test(result, writer)?;
    }
    serialize_end_tag(TEST_CASE_TAG, writer)
}

fn serialize_test(
    result: &TestResult,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut test_tag = BytesStart::new(TEST_TAG);
    test_tag.extend_attributes([
        ("name", &*sanitize_xml_text(result.name())),
        ("result", result.status().as_str()),
        ("starttime", serialize_timestamp(result.start_time()).as_str()),
        ("endtime", serialize_timestamp(result.end_time()).as_str()),
    ]);
    if let Some(bug_report) = result.bug_report() {
        test_tag.push_attribute(("bugreport", &*sanitize_xml_text(bug_report)));
    }
    if let Some(log) = result.log() {
        test_tag.push_attribute(("log", &*sanitize_xml_text(log)));
    }

    let is_failure = result.status() == TestStatus::Fail;
    let report_log = result.report_log().filter(|report_log| !report_log.is_empty());
    if !is_failure && report_log.is_none() {
        return writer.write_event(Event::Empty(test_tag));
    }

    writer.write_event(Event::Start(test_tag))?;

    if is_failure {
        serialize_failed_scene(result.message(), result.stack_trace(), writer)?;
    }
    if let Some(report_log) = report_log {
        serialize_report_log(report_log, writer)?;
    }

    serialize_end_tag(TEST_TAG, writer)
}

fn serialize_failed_scene(
    message: Option<&str>,
    stack_trace: Option<&str>,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut tag = BytesStart::new(FAILED_SCENE_TAG);
    if let Some(message) = message {
        tag.push_attribute(("message", &*sanitize_xml_text(message)));
    }

    match stack_trace {
        Some(stack_trace) => {
            writer.write_event(Event::Start(tag))?;
            serialize_text_element(STACK_TRACE_TAG, stack_trace, writer)?;
            serialize_end_tag(FAILED_SCENE_TAG, writer)
        }
        None => writer.write_event(Event::Empty(tag)),
    }
}

fn serialize_report_log(
    report_log: &ReportLog,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let ReportLog { summary, details } = report_log;

    if let Some(summary) = summary {
        let mut summary_tag = BytesStart::new(SUMMARY_TAG);
        push_metric_attributes(&mut summary_tag, summary);
        // A summary has exactly one value when created through ReportLog::set_summary. Use the
        // first one if a payload carried more.
        if let Some(score) = summary.values.first() {
            summary_tag.push_attribute(("score", serialize_value(*score).as_str()));
        }
        writer.write_event(Event::Empty(summary_tag))?;
    }

    if !details.is_empty() {
        serialize_empty_start_tag(DETAILS_TAG, writer)?;
        for metric in details {
            let mut value_array_tag = BytesStart::new(VALUE_ARRAY_TAG);
            push_metric_attributes(&mut value_array_tag, metric);
            writer.write_event(Event::Start(value_array_tag))?;
            for value in &metric.values {
                serialize_text_element(VALUE_TAG, &serialize_value(*value), writer)?;
            }
            serialize_end_tag(VALUE_ARRAY_TAG, writer)?;
        }
        serialize_end_tag(DETAILS_TAG, writer)?;
    }

    Ok(())
}

fn push_metric_attributes(tag: &mut BytesStart<'_>, metric: &Metric) {
    tag.extend_attributes([
        ("message", &*sanitize_xml_text(&metric.name)),
        ("scoreType", metric.score_type.as_str()),
        ("unit", metric.unit.as_str()),
    ]);
}

fn serialize_text_element(
    tag_name: &'static str,
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_empty_start_tag(tag_name, writer)?;
    let text = sanitize_xml_text(text);
    writer.write_event(Event::Text(BytesText::new(&text)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

// Serialize timestamps as RFC 3339 with millisecond precision, falling back to raw milliseconds
// for values chrono can't represent.
fn serialize_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(timestamp) => timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => millis.to_string(),
    }
}

// Attribute value normalization turns line breaks and tabs into spaces, so they are written as
// character references instead.
fn escape_multiline_attribute(value: &str) -> String {
    let sanitized = sanitize_xml_text(value);
    let mut escaped = String::with_capacity(sanitized.len());
    for c in escape(&sanitized).chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn serialize_value(value: f64) -> String {
    format!("{value}")
}
