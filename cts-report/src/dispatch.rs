// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    exit_codes::CtsReportExitCode,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use cts_aggregator::{EventReader, MetricsKey, MetricsStore, ReportConfig, ResultAggregator};
use owo_colors::OwoColorize;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};
use tracing::info;

/// Aggregate device compatibility test events into XML reports.
#[derive(Debug, Parser)]
#[command(version, name = "cts-report", styles = clap_styles::style())]
pub struct CtsReportApp {
    /// Directory to resolve relative paths against [default: current directory]
    #[arg(long, global = true, value_name = "DIR")]
    workspace_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    output: OutputOpts,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(subcommand)]
    command: Command,
}

impl CtsReportApp {
    /// Initializes logging and color support.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let workspace_root = match self.workspace_root {
            Some(workspace_root) => workspace_root,
            None => current_dir()?,
        };
        let mut config = self.config_opts.make_config(&workspace_root)?;

        match self.command {
            Command::Aggregate {
                events_opts,
                output: output_path,
                report_name,
            } => {
                if let Some(report_name) = report_name {
                    config.set_report_name(report_name);
                }
                if let Some(output_path) = output_path {
                    config.set_report_path(output_path);
                }

                let aggregator =
                    events_opts.aggregate(&workspace_root, &config, MetricsStore::global())?;
                let path = config.report_path(&workspace_root);
                let report = aggregator.finish(&path)?;

                let styles = output.stderr_styles();
                let summary = report.summary();
                info!(
                    "wrote report to `{}`: {} passed, {} failed, {} not executed",
                    path.style(styles.bold),
                    summary.pass.style(styles.pass),
                    summary.fail.style(styles.fail),
                    summary.not_executed
                );

                if summary.fail > 0 {
                    Err(ExpectedError::TestRunFailed {
                        failed: summary.fail,
                    })
                } else {
                    Ok(CtsReportExitCode::OK)
                }
            }
            Command::Metrics { events_opts, key } => {
                let store = MetricsStore::new();
                // The report itself is not written out.
                let _ = events_opts.aggregate(&workspace_root, &config, &store)?;

                let Some(report_log) = store.get_result(&key) else {
                    return Err(ExpectedError::NoMetricsFound { key });
                };

                let mut writer = output_writer.stdout_writer();
                serde_json::to_writer_pretty(&mut writer, &report_log)
                    .map_err(|err| ExpectedError::SerializeReportLogError { err })?;
                writeln!(writer).map_err(|err| ExpectedError::WriteOutputError { err })?;
                writer
                    .flush()
                    .map_err(|err| ExpectedError::WriteOutputError { err })?;

                Ok(CtsReportExitCode::OK)
            }
        }
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: workspace-root/.config/cts-report.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self, workspace_root: &Utf8Path) -> Result<ReportConfig, ExpectedError> {
        let config_file = self
            .config_file
            .as_ref()
            .map(|config_file| workspace_root.join(config_file));
        Ok(ReportConfig::from_sources(workspace_root, config_file.as_deref())?)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate an event stream and write the XML report
    ///
    /// Exits with code 100 if any test failed.
    Aggregate {
        #[command(flatten)]
        events_opts: EventsOpts,

        /// Path to write the report to [default: from config]
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<Utf8PathBuf>,

        /// Name recorded on the report [default: from config]
        #[arg(long, value_name = "NAME")]
        report_name: Option<String>,
    },

    /// Print the report log stored for a single test as JSON
    ///
    /// The key has the form `<device-serial>/<abi>/<class>#<method>`. Exits with code 4 if no
    /// report log was stored for the key.
    Metrics {
        #[command(flatten)]
        events_opts: EventsOpts,

        /// Metrics key to look up
        #[arg(long, value_name = "KEY")]
        key: MetricsKey,
    },
}

#[derive(Debug, Args)]
struct EventsOpts {
    /// JSON-lines instrumentation event stream, or `-` for standard input
    #[arg(long, value_name = "FILE")]
    events: Utf8PathBuf,
}

impl EventsOpts {
    fn aggregate<'a>(
        &self,
        workspace_root: &Utf8Path,
        config: &'a ReportConfig,
        metrics_store: &'a MetricsStore,
    ) -> Result<ResultAggregator<'a>, ExpectedError> {
        let reader: Box<dyn BufRead> = if self.events.as_str() == "-" {
            Box::new(io::stdin().lock())
        } else {
            let path = workspace_root.join(&self.events);
            let f = File::open(&path)
                .map_err(|err| ExpectedError::EventsOpenFailed { path, err })?;
            Box::new(BufReader::new(f))
        };

        let mut aggregator = ResultAggregator::new(config, metrics_store);
        for event in EventReader::new(reader) {
            let event = event.map_err(|err| ExpectedError::EventStreamInvalid {
                path: self.events.clone(),
                err,
            })?;
            aggregator.write_event(event);
        }
        Ok(aggregator)
    }
}

fn current_dir() -> Result<Utf8PathBuf, ExpectedError> {
    let dir = std::env::current_dir().map_err(|error| ExpectedError::CurrentDirFailed { error })?;
    Utf8PathBuf::try_from(dir).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Color;
    use camino_tempfile::Utf8TempDir;
    use clap::CommandFactory;
    use cts_results::ReportLog;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    static EVENTS: &str = indoc! {r#"
        {"event": "run-started", "device-serial": "emulator-5554", "abi": "x86_64"}
        {"event": "test-started", "test": "android.app.cts.ActivityTest#testCreate"}
        {"event": "test-ended", "test": "android.app.cts.ActivityTest#testCreate", "metrics": {"COMPATIBILITY_TEST_RESULT": "{\"summary\": {\"name\": \"launch time\", \"values\": [12.5], \"score-type\": \"lower_better\", \"unit\": \"ms\"}}"}}
        {"event": "run-ended"}
    "#};

    static FAILING_EVENTS: &str = indoc! {r#"
        {"event": "run-started", "device-serial": "emulator-5554", "abi": "x86_64"}
        {"event": "test-started", "test": "android.app.cts.ActivityTest#testCreate"}
        {"event": "test-failed", "test": "android.app.cts.ActivityTest#testCreate", "trace": "boom"}
        {"event": "test-ended", "test": "android.app.cts.ActivityTest#testCreate"}
        {"event": "run-ended"}
    "#};

    fn workspace(events: &str) -> Utf8TempDir {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        std::fs::write(dir.path().join("events.jsonl"), events).expect("wrote events");
        dir
    }

    fn output() -> OutputContext {
        OutputContext {
            verbose: false,
            color: Color::Never,
        }
    }

    fn exec(dir: &Utf8TempDir, args: &[&str]) -> (Result<i32, ExpectedError>, Vec<u8>) {
        let app = CtsReportApp::try_parse_from(
            ["cts-report", "--workspace-root", dir.path().as_str()]
                .iter()
                .chain(args),
        )
        .expect("arguments are valid");
        let mut writer = OutputWriter::Test { stdout: Vec::new() };
        let result = app.exec(output(), &mut writer);
        let OutputWriter::Test { stdout } = writer else {
            unreachable!("writer is a test writer");
        };
        (result, stdout)
    }

    #[test]
    fn verify_app() {
        CtsReportApp::command().debug_assert();
    }

    #[test_case(&["aggregate", "--events", "e.jsonl"] ; "aggregate")]
    #[test_case(&["aggregate", "--events", "-", "-o", "out.xml", "--report-name", "cts-nightly"] ; "aggregate with options")]
    #[test_case(&["--color", "never", "metrics", "--events", "e.jsonl", "--key", "s/x86/a.Foo#test"] ; "metrics")]
    #[test_case(&["aggregate", "--events", "e.jsonl", "--verbose", "--config-file", "c.toml"] ; "global options after subcommand")]
    fn valid_args(args: &[&str]) {
        CtsReportApp::try_parse_from(std::iter::once(&"cts-report").chain(args))
            .expect("arguments are valid");
    }

    #[test_case(&["aggregate"] ; "missing events")]
    #[test_case(&["metrics", "--events", "e.jsonl"] ; "missing key")]
    #[test_case(&["metrics", "--events", "e.jsonl", "--key", "not-a-key"] ; "invalid key")]
    #[test_case(&["--color", "sometimes", "aggregate", "--events", "e.jsonl"] ; "invalid color")]
    fn invalid_args(args: &[&str]) {
        CtsReportApp::try_parse_from(std::iter::once(&"cts-report").chain(args))
            .expect_err("arguments are invalid");
    }

    #[test]
    fn aggregate_writes_report() {
        let dir = workspace(EVENTS);
        let (result, _) = exec(
            &dir,
            &["aggregate", "--events", "events.jsonl", "-o", "out/r.xml"],
        );
        assert_eq!(result.expect("run succeeded"), CtsReportExitCode::OK);

        let xml = std::fs::read_to_string(dir.path().join("out/r.xml")).expect("report exists");
        assert!(xml.contains(r#"<TestResult name="cts" deviceSerial="emulator-5554" abi="x86_64""#));
        assert!(xml.contains(r#"<Summary message="launch time" scoreType="lower_better" unit="ms" score="12.5"/>"#));
    }

    #[test]
    fn aggregate_reports_failures() {
        let dir = workspace(FAILING_EVENTS);
        let (result, _) = exec(
            &dir,
            &["aggregate", "--events", "events.jsonl", "--report-name", "nightly"],
        );
        let err = result.expect_err("run failed");
        assert_eq!(err.process_exit_code(), CtsReportExitCode::TEST_RUN_FAILED);

        let xml = std::fs::read_to_string(dir.path().join("results/test_result.xml"))
            .expect("report exists even though tests failed");
        assert!(xml.contains(r#"<TestResult name="nightly""#));
    }

    #[test]
    fn metrics_prints_report_log() {
        let dir = workspace(EVENTS);
        let (result, stdout) = exec(
            &dir,
            &[
                "metrics",
                "--events",
                "events.jsonl",
                "--key",
                "emulator-5554/x86_64/android.app.cts.ActivityTest#testCreate",
            ],
        );
        assert_eq!(result.expect("run succeeded"), CtsReportExitCode::OK);

        let stdout = String::from_utf8(stdout).expect("stdout is UTF-8");
        let log: ReportLog = serde_json::from_str(&stdout).expect("stdout is a report log");
        let summary = log.summary.expect("summary exists");
        assert_eq!(summary.name, "launch time");
        assert_eq!(summary.values, [12.5]);
    }

    #[test]
    fn metrics_missing_key() {
        let dir = workspace(EVENTS);
        let (result, stdout) = exec(
            &dir,
            &[
                "metrics",
                "--events",
                "events.jsonl",
                "--key",
                "emulator-5554/arm64-v8a/android.app.cts.ActivityTest#testCreate",
            ],
        );
        let err = result.expect_err("no metrics for this ABI");
        assert_eq!(err.process_exit_code(), CtsReportExitCode::NO_METRICS_FOUND);
        assert!(stdout.is_empty());
    }

    #[test]
    fn invalid_event_stream() {
        let dir = workspace("{\"event\": \"run-started\"}\nnot json\n");
        let (result, _) = exec(&dir, &["aggregate", "--events", "events.jsonl"]);
        let err = result.expect_err("event stream is invalid");
        assert_eq!(
            err.process_exit_code(),
            CtsReportExitCode::EVENT_STREAM_INVALID
        );
        assert!(!dir.path().join("results/test_result.xml").exists());
    }

    #[test]
    fn missing_inputs_are_setup_errors() {
        let dir = workspace(EVENTS);
        for args in [
            &["aggregate", "--events", "missing.jsonl"][..],
            &["aggregate", "--events", "events.jsonl", "--config-file", "missing.toml"][..],
        ] {
            let (result, _) = exec(&dir, args);
            let err = result.expect_err("input is missing");
            assert_eq!(err.process_exit_code(), CtsReportExitCode::SETUP_ERROR);
        }
    }
}
