// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while loading configuration and generating reports.

use crate::MethodRef;
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::{error::Error as StdError, fmt};
use thiserror::Error;

/// An error that occurred while parsing the reporter config.
#[derive(Debug, Error)]
#[error("failed to parse case-reporter config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of config error that occurred.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The config sources could not be read or merged.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// The merged config did not match the expected shape.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// A test method has no case identifier.
///
/// Emitting such a case would leave the external system with a record it cannot attribute, so
/// this aborts report generation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("case ID missing for {method}")]
pub struct MissingCaseIdError {
    method: MethodRef,
}

impl MissingCaseIdError {
    pub(crate) fn new(method: MethodRef) -> Self {
        Self { method }
    }

    /// Returns the method that has no case identifier.
    pub fn method(&self) -> &MethodRef {
        &self.method
    }
}

/// An error that occurred while building a report document.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("error building report for suite `{suite_name}`")]
pub struct BuildReportError {
    suite_name: String,
    #[source]
    error: MissingCaseIdError,
}

impl BuildReportError {
    pub(crate) fn new(suite_name: impl Into<String>, error: MissingCaseIdError) -> Self {
        Self {
            suite_name: suite_name.into(),
            error,
        }
    }

    /// Returns the name of the suite whose report could not be built.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Returns the method that has no case identifier.
    pub fn method(&self) -> &MethodRef {
        self.error.method()
    }
}

/// An error that occurred while writing a report to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file or directory being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error serializing JUnit report for {file}")]
    Serialize {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: case_junit::SerializeError,
    },
}

impl WriteReportError {
    /// Returns the path that could not be written.
    pub fn file(&self) -> &Utf8Path {
        match self {
            WriteReportError::Fs { file, .. } | WriteReportError::Serialize { file, .. } => file,
        }
    }
}

/// An error returned by [`ReportGenerator::generate_report`](crate::ReportGenerator::generate_report).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateReportError {
    /// A case-management report was requested without a case ID lookup.
    #[error("case-management report requested, but no case ID lookup was provided")]
    NoCaseIdLookup,

    /// The report document could not be built.
    #[error(transparent)]
    Build(#[from] BuildReportError),

    /// The report could not be written.
    #[error(transparent)]
    Write(#[from] WriteReportError),
}

/// Displays an error along with the chain of errors that caused it, on one line per error.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: StdError> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: StdError> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, "\n  caused by: {error}")?;
            source = error.source();
        }

        Ok(())
    }
}
