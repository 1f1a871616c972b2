// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build JUnit documents from suite runs.

use crate::{
    CaseIdResolver, FailureCause, MethodRef, ResultPartition, SuiteRun, TestRun,
    errors::{BuildReportError, MissingCaseIdError},
};
use case_junit::{Report, TestCase, TestCaseStatus, TestSuite};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Debugging attribute holding a case's real method name when the case is keyed by case ID.
pub static METHOD_NAME_ATTRIBUTE: &str = "tafname";

/// Debugging attribute holding a case's real class name when the case is keyed by case ID.
pub static CLASS_NAME_ATTRIBUTE: &str = "tafclassname";

/// The order in which result partitions are written within a `testsuite`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseOrder {
    /// Passed, failed, skipped, disabled.
    PassedFirst,

    /// Failed, skipped, disabled, passed.
    ///
    /// Test-management importers that merge records sharing a case ID in file order then mark
    /// a shared case as failed or skipped if any of its automated tests failed or was skipped.
    ///
    /// This depends on how the importer resolves several records for one case ID, which the
    /// importer does not document. Check that it still holds before depending on this order.
    PassedLast,
}

impl CaseOrder {
    /// Returns the partitions in the order they are written.
    pub fn partitions(self) -> [ResultPartition; 4] {
        use ResultPartition::*;

        match self {
            CaseOrder::PassedFirst => [Passed, Failed, Skipped, Disabled],
            CaseOrder::PassedLast => [Failed, Skipped, Disabled, Passed],
        }
    }
}

/// How a case's visible `name` and `classname` are chosen.
#[derive(Clone, Copy, Debug)]
pub enum CaseIdentity<'a> {
    /// `name` is the method name and `classname` is the declaring class.
    Method,

    /// `name` is the method's case ID and `classname` is a fixed value marking the case as
    /// automated. The real names are kept in the `tafname` and `tafclassname` attributes.
    CaseId {
        /// Resolves case IDs.
        resolver: CaseIdResolver<'a>,

        /// The `classname` written for every case.
        automated_classname: &'a str,
    },
}

/// Builds a [`Report`] from suite runs.
///
/// The builder holds no document state: every call returns a new tree.
#[derive(Clone, Copy, Debug)]
pub struct ReportBuilder<'a> {
    order: CaseOrder,
    identity: CaseIdentity<'a>,
}

impl<'a> ReportBuilder<'a> {
    /// Creates a new builder.
    pub fn new(order: CaseOrder, identity: CaseIdentity<'a>) -> Self {
        Self { order, identity }
    }

    /// Returns the case order used by this builder.
    pub fn order(&self) -> CaseOrder {
        self.order
    }

    /// Builds a report with one `testsuite` per suite run, in input order.
    ///
    /// The first suite that cannot be built aborts the whole report.
    pub fn build(&self, suites: &[SuiteRun]) -> Result<Report, BuildReportError> {
        let mut report = Report::new();
        for suite in suites {
            report.add_test_suite(self.build_suite(suite)?);
        }
        Ok(report)
    }

    /// Builds the `testsuite` element for a single suite run.
    pub fn build_suite(&self, suite: &SuiteRun) -> Result<TestSuite, BuildReportError> {
        let mut test_suite = TestSuite::new(suite.name.as_str());
        test_suite
            .set_tests(suite.total_methods)
            .set_timestamp(suite.start)
            .set_time(suite.elapsed());

        for partition in self.order.partitions() {
            let cases = match partition {
                ResultPartition::Passed => self.run_cases(&suite.passed, |_| {
                    TestCaseStatus::success()
                }),
                ResultPartition::Failed => self.run_cases(&suite.failed, |run| {
                    failure_status(run.failure.as_ref())
                }),
                ResultPartition::Skipped => self.run_cases(&suite.skipped, |_| {
                    TestCaseStatus::skipped()
                }),
                ResultPartition::Disabled => suite
                    .disabled
                    .iter()
                    .map(|method| {
                        self.test_case(method, TestCaseStatus::skipped(), Duration::ZERO)
                    })
                    .collect(),
            }
            .map_err(|error| BuildReportError::new(&suite.name, error))?;
            test_suite.add_test_cases(cases);
        }

        debug!(
            suite = %suite.name,
            tests = test_suite.tests,
            failures = test_suite.failures,
            skipped = test_suite.skipped,
            "built test suite"
        );
        Ok(test_suite)
    }

    fn run_cases(
        &self,
        runs: &[TestRun],
        status: impl Fn(&TestRun) -> TestCaseStatus,
    ) -> Result<Vec<TestCase>, MissingCaseIdError> {
        runs.iter()
            .map(|run| self.test_case(&run.method, status(run), run.elapsed()))
            .collect()
    }

    fn test_case(
        &self,
        method: &MethodRef,
        status: TestCaseStatus,
        time: Duration,
    ) -> Result<TestCase, MissingCaseIdError> {
        let mut test_case = match self.identity {
            CaseIdentity::Method => {
                let mut test_case = TestCase::new(method.method_name.as_str(), status);
                test_case.set_classname(method.class_name.as_str());
                test_case
            }
            CaseIdentity::CaseId {
                resolver,
                automated_classname,
            } => {
                let case_id = resolver.resolve(method)?;
                let mut test_case = TestCase::new(case_id.into_string(), status);
                test_case
                    .set_classname(automated_classname)
                    .add_attribute(METHOD_NAME_ATTRIBUTE, method.method_name.as_str())
                    .add_attribute(CLASS_NAME_ATTRIBUTE, method.class_name.as_str());
                test_case
            }
        };
        test_case.set_time(time);
        Ok(test_case)
    }
}

// A failed result without a cause still gets an empty `failure` element.
fn failure_status(cause: Option<&FailureCause>) -> TestCaseStatus {
    let mut status = TestCaseStatus::failure();
    if let Some(cause) = cause {
        status.set_type(cause.kind.as_str());
        if let Some(message) = cause.single_line_message() {
            status.set_message(message);
        }
        status.set_description(cause.report_stack_trace());
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CaseIdTable, TestRun};
    use chrono::{DateTime, FixedOffset, TimeDelta};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    static CLASS: &str = "com.petproject.tests.SimpleTests";

    fn at(millis: i64) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-16T09:15:00+00:00").unwrap()
            + TimeDelta::milliseconds(millis)
    }

    fn run(method: &str, start: i64, end: i64) -> TestRun {
        TestRun::new(MethodRef::new(CLASS, method), at(start), at(end))
    }

    fn suite_run() -> SuiteRun {
        let mut failure = FailureCause::new("java.lang.AssertionError");
        failure
            .set_message("expected 5\r\n but was 4")
            .set_stack_trace("java.lang.AssertionError: expected 5\r\n\tat SimpleTests.java:25");
        let mut failed = run("twoPlusTwoEqualsFive", 10, 16);
        failed.set_failure(failure);

        let mut suite = SuiteRun::new("Default test", at(0), at(1500));
        suite
            .set_total_methods(7)
            .add_passed(run("twoPlusTwoEqualsFour", 0, 4))
            .add_passed(run("alsoPasses", 4, 9))
            .add_failed(failed)
            .add_skipped(run("dependsOnFailure", 16, 16))
            .add_disabled(MethodRef::new(CLASS, "iAmReallySumSomething"));
        suite
    }

    fn case_ids() -> CaseIdTable {
        [
            ("twoPlusTwoEqualsFour", vec!["C34"]),
            ("alsoPasses", vec!["C34"]),
            ("twoPlusTwoEqualsFive", vec!["C32", "C33"]),
            ("dependsOnFailure", vec!["C30"]),
            ("iAmReallySumSomething", vec!["C31"]),
        ]
        .into_iter()
        .map(|(method, ids)| (MethodRef::new(CLASS, method), ids))
        .collect()
    }

    fn names(suite: &TestSuite) -> Vec<&str> {
        suite.test_cases.iter().map(|case| case.name.as_str()).collect()
    }

    #[test]
    fn suite_counts() {
        let builder = ReportBuilder::new(CaseOrder::PassedFirst, CaseIdentity::Method);
        let suite = builder.build_suite(&suite_run()).unwrap();

        assert_eq!(suite.name, "Default test");
        assert_eq!(suite.tests, 7, "tests is the registered method count");
        assert_eq!(suite.errors, 0);
        assert_eq!(suite.failures, 1);
        assert_eq!(suite.skipped, 2, "skipped includes disabled methods");
        assert_eq!(suite.timestamp, Some(at(0)));
        assert_eq!(suite.time, Some(Duration::from_millis(1500)));
    }

    #[test_case(
        CaseOrder::PassedFirst,
        &["twoPlusTwoEqualsFour", "alsoPasses", "twoPlusTwoEqualsFive", "dependsOnFailure", "iAmReallySumSomething"];
        "passed first"
    )]
    #[test_case(
        CaseOrder::PassedLast,
        &["twoPlusTwoEqualsFive", "dependsOnFailure", "iAmReallySumSomething", "twoPlusTwoEqualsFour", "alsoPasses"];
        "passed last"
    )]
    fn case_order(order: CaseOrder, expected: &[&str]) {
        let builder = ReportBuilder::new(order, CaseIdentity::Method);
        let suite = builder.build_suite(&suite_run()).unwrap();
        assert_eq!(names(&suite), expected);
    }

    #[test]
    fn case_details() {
        let builder = ReportBuilder::new(CaseOrder::PassedFirst, CaseIdentity::Method);
        let suite = builder.build_suite(&suite_run()).unwrap();
        let cases = &suite.test_cases;

        assert_eq!(cases[0].classname.as_deref(), Some(CLASS));
        assert_eq!(cases[0].time, Some(Duration::from_millis(4)));
        assert_eq!(cases[0].status, TestCaseStatus::Success);
        assert!(cases[0].extra.is_empty());

        assert_eq!(cases[2].time, Some(Duration::from_millis(6)));
        assert_eq!(
            cases[2].status,
            TestCaseStatus::Failure {
                message: Some("expected 5 but was 4".into()),
                ty: Some("java.lang.AssertionError".into()),
                description: Some(
                    "java.lang.AssertionError: expected 5\n\tat SimpleTests.java:25".into()
                ),
            }
        );

        assert_eq!(cases[3].status, TestCaseStatus::Skipped);
        assert_eq!(cases[4].status, TestCaseStatus::Skipped);
        assert_eq!(cases[4].time, Some(Duration::ZERO));
    }

    #[test]
    fn failure_without_cause_or_message() {
        let mut suite = SuiteRun::new("s", at(0), at(1));
        let mut empty_message = FailureCause::new("java.lang.NullPointerException");
        empty_message.set_message("");
        let mut with_cause = run("emptyMessage", 0, 1);
        with_cause.set_failure(empty_message);
        suite
            .add_failed(run("noCause", 0, 1))
            .add_failed(with_cause);

        let builder = ReportBuilder::new(CaseOrder::PassedFirst, CaseIdentity::Method);
        let built = builder.build_suite(&suite).unwrap();

        assert_eq!(built.test_cases[0].status, TestCaseStatus::failure());
        assert_eq!(
            built.test_cases[1].status,
            TestCaseStatus::Failure {
                message: None,
                ty: Some("java.lang.NullPointerException".into()),
                description: Some("".into()),
            }
        );
    }

    #[test]
    fn case_id_identity() {
        let table = case_ids();
        let builder = ReportBuilder::new(
            CaseOrder::PassedLast,
            CaseIdentity::CaseId {
                resolver: CaseIdResolver::new(&table),
                automated_classname: "TA",
            },
        );
        let suite = builder.build_suite(&suite_run()).unwrap();

        assert_eq!(names(&suite), ["C32", "C30", "C31", "C34", "C34"]);
        for case in &suite.test_cases {
            assert_eq!(case.classname.as_deref(), Some("TA"));
            assert_eq!(
                case.extra.get(CLASS_NAME_ATTRIBUTE).map(|v| v.as_str()),
                Some(CLASS)
            );
        }
        let real_names: Vec<_> = suite
            .test_cases
            .iter()
            .map(|case| case.extra[METHOD_NAME_ATTRIBUTE].as_str())
            .collect();
        assert_eq!(
            real_names,
            [
                "twoPlusTwoEqualsFive",
                "dependsOnFailure",
                "iAmReallySumSomething",
                "twoPlusTwoEqualsFour",
                "alsoPasses"
            ]
        );
        assert_eq!(suite.test_cases[2].time, Some(Duration::ZERO));
    }

    #[test]
    fn missing_case_id_aborts_build() {
        let mut table = case_ids();
        table.insert(
            MethodRef::new(CLASS, "iAmReallySumSomething"),
            Vec::<String>::new(),
        );
        let builder = ReportBuilder::new(
            CaseOrder::PassedLast,
            CaseIdentity::CaseId {
                resolver: CaseIdResolver::new(&table),
                automated_classname: "TA",
            },
        );

        let error = builder
            .build(&[suite_run()])
            .expect_err("disabled method has no case ID");
        assert_eq!(error.suite_name(), "Default test");
        assert_eq!(
            error.method(),
            &MethodRef::new(CLASS, "iAmReallySumSomething")
        );
    }
}
