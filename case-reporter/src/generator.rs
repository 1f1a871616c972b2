// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    CaseIdLookup, CaseIdResolver, CaseIdentity, ReportBuilder, ReportKind, ReportOptions,
    ReporterConfig, SuiteRun, WriteFailurePolicy,
    errors::{BuildReportError, DisplayErrorChain, GenerateReportError, WriteReportError},
};
use camino::{Utf8Path, Utf8PathBuf};
use case_junit::Report;
use std::fmt;
use tracing::{error, info};

/// What happened to a generated report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report was written to `path`.
    Written {
        /// The report file.
        path: Utf8PathBuf,
    },

    /// The report could not be written to `path`. The error was logged.
    WriteFailed {
        /// The report file.
        path: Utf8PathBuf,
    },
}

impl ReportOutcome {
    /// Returns the path of the report file.
    pub fn path(&self) -> &Utf8Path {
        match self {
            ReportOutcome::Written { path } | ReportOutcome::WriteFailed { path } => path,
        }
    }

    /// Returns true if the report was written.
    pub fn is_written(&self) -> bool {
        matches!(self, ReportOutcome::Written { .. })
    }
}

/// Generates a JUnit report file at the end of a run.
pub struct ReportGenerator {
    options: ReportOptions,
    case_ids: Option<Box<dyn CaseIdLookup>>,
}

impl ReportGenerator {
    /// Creates a generator with no case ID lookup.
    pub fn new(options: ReportOptions) -> Self {
        Self {
            options,
            case_ids: None,
        }
    }

    /// Creates a generator from loaded configuration, using its case ID table as the lookup.
    pub fn from_config(config: ReporterConfig) -> Self {
        let (options, case_ids) = config.into_parts();
        Self::new(options).with_case_ids(case_ids)
    }

    /// Sets the lookup used to resolve case IDs for case-management reports.
    pub fn with_case_ids(mut self, lookup: impl CaseIdLookup + 'static) -> Self {
        self.case_ids = Some(Box::new(lookup));
        self
    }

    /// Returns the report options.
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Builds the report document without writing it.
    pub fn build_report(&self, suites: &[SuiteRun]) -> Result<Report, GenerateReportError> {
        let identity = match self.options.kind() {
            ReportKind::Standard => CaseIdentity::Method,
            ReportKind::CaseManagement => {
                let lookup = self
                    .case_ids
                    .as_deref()
                    .ok_or(GenerateReportError::NoCaseIdLookup)?;
                CaseIdentity::CaseId {
                    resolver: CaseIdResolver::new(lookup),
                    automated_classname: self.options.automated_classname(),
                }
            }
        };

        let builder = ReportBuilder::new(self.options.case_order(), identity);
        let report = builder.build(suites).inspect_err(|err: &BuildReportError| {
            error!("{}", DisplayErrorChain::new(err));
        })?;
        Ok(report)
    }

    /// Builds a report for `suites` and writes it to the configured file name in `output_dir`,
    /// creating the directory if necessary.
    ///
    /// If the report cannot be built, no file is written. If it cannot be written, the error is
    /// either logged and reported as [`ReportOutcome::WriteFailed`] or returned, depending on the
    /// report kind.
    pub fn generate_report(
        &self,
        suites: &[SuiteRun],
        output_dir: &Utf8Path,
    ) -> Result<ReportOutcome, GenerateReportError> {
        let report = self.build_report(suites)?;
        let path = self.options.report_path(output_dir);

        match write_report(&report, output_dir, &path) {
            Ok(()) => {
                info!(
                    kind = ?self.options.kind(),
                    suites = report.test_suites.len(),
                    "wrote JUnit report to {path}"
                );
                Ok(ReportOutcome::Written { path })
            }
            Err(err) => match self.options.write_failure_policy() {
                WriteFailurePolicy::LogAndContinue => {
                    error!("{}", DisplayErrorChain::new(&err));
                    Ok(ReportOutcome::WriteFailed { path })
                }
                WriteFailurePolicy::Propagate => Err(err.into()),
            },
        }
    }
}

impl fmt::Debug for ReportGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportGenerator")
            .field("options", &self.options)
            .field("has_case_ids", &self.case_ids.is_some())
            .finish()
    }
}

fn write_report(
    report: &Report,
    output_dir: &Utf8Path,
    path: &Utf8Path,
) -> Result<(), WriteReportError> {
    std::fs::create_dir_all(output_dir).map_err(|error| WriteReportError::Fs {
        file: output_dir.to_owned(),
        error,
    })?;

    let contents = report
        .to_string()
        .map_err(|error| WriteReportError::Serialize {
            file: path.to_owned(),
            error,
        })?;

    std::fs::write(path, contents).map_err(|error| WriteReportError::Fs {
        file: path.to_owned(),
        error,
    })
}
