// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report options and the TOML configuration they are loaded from.

use crate::{
    CaseIdTable, CaseOrder, MethodRef,
    errors::{ConfigParseError, ConfigParseErrorKind},
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Which kind of report to produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Cases are keyed by method and class name and written passed-first. Write failures are
    /// logged and swallowed.
    Standard,

    /// Cases are keyed by external case ID and written passed-last. Write failures are
    /// returned to the caller.
    CaseManagement,
}

impl ReportKind {
    /// Returns the case order this kind of report uses unless overridden.
    pub fn default_case_order(self) -> CaseOrder {
        match self {
            ReportKind::Standard => CaseOrder::PassedFirst,
            ReportKind::CaseManagement => CaseOrder::PassedLast,
        }
    }

    /// Returns what happens when the report cannot be written.
    pub fn write_failure_policy(self) -> WriteFailurePolicy {
        match self {
            ReportKind::Standard => WriteFailurePolicy::LogAndContinue,
            ReportKind::CaseManagement => WriteFailurePolicy::Propagate,
        }
    }
}

/// What to do when a built report cannot be written to disk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Log the error and report the failure as an outcome, never as an error.
    LogAndContinue,

    /// Return the error to the caller.
    Propagate,
}

/// Options controlling a single report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    kind: ReportKind,
    case_order: CaseOrder,
    file_name: String,
    automated_classname: String,
}

impl ReportOptions {
    /// The default name of the report file.
    pub const DEFAULT_FILE_NAME: &'static str = "customReport.xml";

    /// The default `classname` for case-management reports.
    pub const DEFAULT_AUTOMATED_CLASSNAME: &'static str = "TA";

    /// Creates options for `kind` with its default case order, file name and classname.
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            case_order: kind.default_case_order(),
            file_name: Self::DEFAULT_FILE_NAME.to_owned(),
            automated_classname: Self::DEFAULT_AUTOMATED_CLASSNAME.to_owned(),
        }
    }

    /// Overrides the case order.
    pub fn set_case_order(&mut self, case_order: CaseOrder) -> &mut Self {
        self.case_order = case_order;
        self
    }

    /// Sets the name of the report file written into the output directory.
    pub fn set_file_name(&mut self, file_name: impl Into<String>) -> &mut Self {
        self.file_name = file_name.into();
        self
    }

    /// Sets the `classname` written for every case in a case-management report.
    pub fn set_automated_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.automated_classname = classname.into();
        self
    }

    /// Returns the report kind.
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Returns the case order.
    pub fn case_order(&self) -> CaseOrder {
        self.case_order
    }

    /// Returns the report file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the `classname` used for case-management reports.
    pub fn automated_classname(&self) -> &str {
        &self.automated_classname
    }

    /// Returns the path of the report file within `output_dir`.
    pub fn report_path(&self, output_dir: &Utf8Path) -> Utf8PathBuf {
        output_dir.join(&self.file_name)
    }

    /// Returns what happens when the report cannot be written.
    pub fn write_failure_policy(&self) -> WriteFailurePolicy {
        self.kind.write_failure_policy()
    }
}

/// Reporter configuration, as loaded from TOML.
#[derive(Clone, Debug)]
pub struct ReporterConfig {
    options: ReportOptions,
    case_ids: CaseIdTable,
}

impl ReporterConfig {
    /// The default location of the config within a project root.
    pub const CONFIG_PATH: &'static str = ".config/case-report.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Keys set in the user config override these values.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file`, or from [`Self::CONFIG_PATH`] under `project_root`
    /// if no file is given. A missing default file is not an error.
    pub fn from_sources(
        project_root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = project_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (deserialized, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;
        if !unknown.is_empty() {
            warn!(
                "ignoring unknown configuration keys in {config_file}: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", "),
            );
        }

        Ok(Self::from_deserialized(deserialized))
    }

    /// Returns the default config.
    pub fn default_config() -> Self {
        let (deserialized, unknown) =
            Self::build_and_deserialize_config(&Self::make_default_config())
                .expect("default config is always valid");

        // Make sure there aren't any unknown keys in the default config, since it is
        // embedded/shipped with this binary.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        Self::from_deserialized(deserialized)
    }

    /// Returns the report options.
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Returns the configured case ID table.
    pub fn case_ids(&self) -> &CaseIdTable {
        &self.case_ids
    }

    /// Splits the config into its report options and case ID table.
    pub fn into_parts(self) -> (ReportOptions, CaseIdTable) {
        (self.options, self.case_ids)
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(ReporterConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: ReporterConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| ConfigParseErrorKind::DeserializeError(Box::new(error)))?;

        Ok((config, ignored))
    }

    fn from_deserialized(deserialized: ReporterConfigDeserialize) -> Self {
        let ReporterConfigDeserialize {
            kind,
            case_order,
            file_name,
            automated_classname,
            case_ids,
        } = deserialized;

        let mut options = ReportOptions::new(kind);
        options
            .set_file_name(file_name)
            .set_automated_classname(automated_classname);
        if let Some(case_order) = case_order {
            options.set_case_order(case_order);
        }

        let case_ids = case_ids
            .into_iter()
            .map(|entry| (MethodRef::new(entry.class, entry.method), entry.ids))
            .collect();

        Self { options, case_ids }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReporterConfigDeserialize {
    kind: ReportKind,
    #[serde(default)]
    case_order: Option<CaseOrder>,
    file_name: String,
    automated_classname: String,
    #[serde(default)]
    case_ids: Vec<CaseIdEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CaseIdEntry {
    class: String,
    method: String,
    ids: Vec<String>,
}
