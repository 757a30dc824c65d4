// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ConfigParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Overall configuration for report aggregation.
///
/// Built from the embedded default config, with a user config file layered on top.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    report_name: String,
    report_path: Utf8PathBuf,
    result_key: String,
    store_metrics: bool,
}

impl ReportConfig {
    /// The default location of the config within the working directory.
    pub const CONFIG_PATH: &'static str = ".config/cts-report.toml";

    /// Contains the default config as a TOML file.
    ///
    /// User configs are layered on top of this one.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given sources.
    ///
    /// If `config_file` is `None`, the config is read from [`Self::CONFIG_PATH`] under
    /// `workspace_root` if it exists. A `config_file` passed in explicitly must exist.
    pub fn from_sources(
        workspace_root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(workspace_root, config_file, |config_file, unknown| {
            let keys = unknown.iter().cloned().collect::<Vec<_>>().join(", ");
            warn!("ignoring unknown configuration keys in config file {config_file}: {keys}");
        })
    }

    // A custom unknown_callback can be passed in while testing.
    fn from_sources_impl(
        workspace_root: &Utf8Path,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let config = Config::builder()
            .add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(source)
            .build()
            .map_err(|err| ConfigParseError::new(&config_file, err))?;

        let mut unknown = BTreeSet::new();
        let deserialized: ReportConfigDeserialize =
            serde_ignored::deserialize(config, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .map_err(|err| ConfigParseError::new(&config_file, err))?;

        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        Ok(Self {
            report_name: deserialized.report.name,
            report_path: deserialized.report.path,
            result_key: deserialized.metrics.result_key,
            store_metrics: deserialized.metrics.store,
        })
    }

    /// Returns the name recorded on the report.
    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    /// Sets the name recorded on the report.
    pub fn set_report_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.report_name = name.into();
        self
    }

    /// Returns the path to write the report to, resolved against `workspace_root`.
    ///
    /// An absolute path is returned as is.
    pub fn report_path(&self, workspace_root: &Utf8Path) -> Utf8PathBuf {
        workspace_root.join(&self.report_path)
    }

    /// Sets the path to write the report to.
    pub fn set_report_path(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.report_path = path.into();
        self
    }

    /// Returns the metrics key that device-side tests send their report log under.
    pub fn result_key(&self) -> &str {
        &self.result_key
    }

    /// Returns true if report logs should be stored in the metrics store.
    pub fn store_metrics(&self) -> bool {
        self.store_metrics
    }

    /// Returns the default config.
    #[cfg(test)]
    pub(crate) fn default_config() -> Self {
        Self::from_sources_impl(Utf8Path::new("/nonexistent"), None, |_, unknown| {
            panic!("found unknown keys in default config: {unknown:?}")
        })
        .expect("default config is always valid")
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportConfigDeserialize {
    report: ReportSectionDeserialize,
    metrics: MetricsSectionDeserialize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportSectionDeserialize {
    name: String,
    path: Utf8PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct MetricsSectionDeserialize {
    result_key: String,
    store: bool,
}
