// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core logic for turning partitioned test suite results into JUnit XML reports.
//!
//! A test runner hands a list of [`SuiteRun`]s to a [`ReportGenerator`] at the end of a run.
//! Each suite becomes one `testsuite` element; its passed, failed, skipped and disabled results
//! become `testcase` elements in the order chosen by [`CaseOrder`].
//!
//! For [`ReportKind::CaseManagement`] reports, every case is renamed to the external case
//! identifier that a [`CaseIdLookup`] associates with its method. Several automated tests may
//! share one identifier; see [`CaseOrder::PassedLast`] for how their outcomes combine.

mod builder;
pub mod case_id;
pub mod config;
pub mod errors;
mod generator;
mod run;

pub use builder::*;
pub use case_id::{CaseId, CaseIdLookup, CaseIdResolver, CaseIdTable};
pub use config::{ReportKind, ReportOptions, ReporterConfig, WriteFailurePolicy};
pub use generator::*;
pub use run::*;
