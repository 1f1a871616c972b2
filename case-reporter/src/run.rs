// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suite results as handed over by the test runner.
//!
//! These types are read-only inputs to report generation. They deserialize from JSON or TOML so
//! that a runner in another process can hand results over as data.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::{fmt, time::Duration};

/// Identifies a test method by its declaring class and its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MethodRef {
    /// The fully qualified name of the declaring class.
    pub class_name: String,

    /// The name of the method.
    pub method_name: String,
}

impl MethodRef {
    /// Creates a new `MethodRef`.
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)
    }
}

/// Why a test failed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FailureCause {
    /// The name of the error kind, e.g. `java.lang.AssertionError`.
    pub kind: String,

    /// The error message, if any.
    #[serde(default)]
    pub message: Option<String>,

    /// The short-form stack trace, already rendered by the runner.
    #[serde(default)]
    pub stack_trace: String,
}

impl FailureCause {
    /// Creates a new `FailureCause` with no message and an empty stack trace.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
            stack_trace: String::new(),
        }
    }

    /// Sets the message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the stack trace.
    pub fn set_stack_trace(&mut self, stack_trace: impl Into<String>) -> &mut Self {
        self.stack_trace = stack_trace.into();
        self
    }

    /// Returns the message on a single line, with all `\r` and `\n` characters removed.
    ///
    /// Returns `None` if there is no message or the message is empty.
    pub fn single_line_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .map(|message| message.replace(['\r', '\n'], ""))
    }

    /// Returns the stack trace with `\r` characters removed. Line feeds are kept.
    pub fn report_stack_trace(&self) -> String {
        self.stack_trace.replace('\r', "")
    }
}

/// The outcome of one executed test method.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestRun {
    /// The method that ran.
    #[serde(flatten)]
    pub method: MethodRef,

    /// When the method started.
    pub start: DateTime<FixedOffset>,

    /// When the method finished.
    pub end: DateTime<FixedOffset>,

    /// The failure, for results in the failed partition.
    #[serde(default)]
    pub failure: Option<FailureCause>,
}

impl TestRun {
    /// Creates a new `TestRun` with no failure.
    pub fn new(
        method: MethodRef,
        start: impl Into<DateTime<FixedOffset>>,
        end: impl Into<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            method,
            start: start.into(),
            end: end.into(),
            failure: None,
        }
    }

    /// Sets the failure cause.
    pub fn set_failure(&mut self, failure: FailureCause) -> &mut Self {
        self.failure = Some(failure);
        self
    }

    /// Returns the time the method took. An end time before the start time counts as zero.
    pub fn elapsed(&self) -> Duration {
        elapsed_between(self.start, self.end)
    }
}

/// Which of the four disjoint outcome groups a result belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResultPartition {
    /// The method ran and passed.
    Passed,

    /// The method ran and failed.
    Failed,

    /// The method was scheduled but skipped, e.g. because a dependency failed.
    Skipped,

    /// The method was excluded from the run and never scheduled.
    Disabled,
}

/// The results of one suite.
///
/// A method appears in at most one of `passed`, `failed`, `skipped` and `disabled`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuiteRun {
    /// The name of the suite.
    pub name: String,

    /// When the suite started.
    pub start: DateTime<FixedOffset>,

    /// When the suite finished.
    pub end: DateTime<FixedOffset>,

    /// The number of test methods registered for this suite, as counted by the runner.
    ///
    /// This can differ from the number of results, e.g. if the runner counts configuration
    /// methods.
    pub total_methods: usize,

    /// Methods that passed.
    #[serde(default)]
    pub passed: Vec<TestRun>,

    /// Methods that failed.
    #[serde(default)]
    pub failed: Vec<TestRun>,

    /// Methods that were skipped.
    #[serde(default)]
    pub skipped: Vec<TestRun>,

    /// Methods that were disabled. These have no timing information.
    #[serde(default)]
    pub disabled: Vec<MethodRef>,
}

impl SuiteRun {
    /// Creates a new `SuiteRun` with no results.
    pub fn new(
        name: impl Into<String>,
        start: impl Into<DateTime<FixedOffset>>,
        end: impl Into<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
            total_methods: 0,
            passed: vec![],
            failed: vec![],
            skipped: vec![],
            disabled: vec![],
        }
    }

    /// Sets the number of registered test methods.
    pub fn set_total_methods(&mut self, total_methods: usize) -> &mut Self {
        self.total_methods = total_methods;
        self
    }

    /// Adds a result to the passed partition.
    pub fn add_passed(&mut self, run: TestRun) -> &mut Self {
        self.passed.push(run);
        self
    }

    /// Adds a result to the failed partition.
    pub fn add_failed(&mut self, run: TestRun) -> &mut Self {
        self.failed.push(run);
        self
    }

    /// Adds a result to the skipped partition.
    pub fn add_skipped(&mut self, run: TestRun) -> &mut Self {
        self.skipped.push(run);
        self
    }

    /// Adds a method to the disabled partition.
    pub fn add_disabled(&mut self, method: MethodRef) -> &mut Self {
        self.disabled.push(method);
        self
    }

    /// Returns the number of results in the given partition.
    pub fn partition_len(&self, partition: ResultPartition) -> usize {
        match partition {
            ResultPartition::Passed => self.passed.len(),
            ResultPartition::Failed => self.failed.len(),
            ResultPartition::Skipped => self.skipped.len(),
            ResultPartition::Disabled => self.disabled.len(),
        }
    }

    /// Returns the time the suite took. An end time before the start time counts as zero.
    pub fn elapsed(&self) -> Duration {
        elapsed_between(self.start, self.end)
    }
}

fn elapsed_between(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Duration {
    end.signed_duration_since(start)
        .to_std()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, None; "absent message")]
    #[test_case(Some(""), None; "empty message")]
    #[test_case(Some("expected 5 but was 4"), Some("expected 5 but was 4"); "plain message")]
    #[test_case(
        Some("expected:\r\n<5>\nbut was:\r<4>"),
        Some("expected:<5>but was:<4>");
        "line breaks removed"
    )]
    #[test_case(Some("\r\n"), Some(""); "only line breaks")]
    fn single_line_message(message: Option<&str>, expected: Option<&str>) {
        let mut cause = FailureCause::new("java.lang.AssertionError");
        if let Some(message) = message {
            cause.set_message(message);
        }
        assert_eq!(cause.single_line_message().as_deref(), expected);
    }

    #[test]
    fn stack_trace_keeps_line_feeds() {
        let mut cause = FailureCause::new("java.lang.AssertionError");
        cause.set_stack_trace("java.lang.AssertionError: boom\r\n\tat a.B.c(B.java:1)\r\n");
        assert_eq!(
            cause.report_stack_trace(),
            "java.lang.AssertionError: boom\n\tat a.B.c(B.java:1)\n"
        );
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let start = DateTime::parse_from_rfc3339("2026-10-16T09:15:00.250+00:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2026-10-16T09:15:00.256+00:00").unwrap();

        let run = TestRun::new(MethodRef::new("a.B", "c"), start, end);
        assert_eq!(run.elapsed(), Duration::from_millis(6));

        let backwards = TestRun::new(MethodRef::new("a.B", "c"), end, start);
        assert_eq!(backwards.elapsed(), Duration::ZERO);
    }

    #[test]
    fn partitions_are_counted() {
        let start = DateTime::parse_from_rfc3339("2026-10-16T09:15:00+00:00").unwrap();
        let mut suite = SuiteRun::new("suite", start, start);
        suite
            .add_passed(TestRun::new(MethodRef::new("a.B", "one"), start, start))
            .add_skipped(TestRun::new(MethodRef::new("a.B", "two"), start, start))
            .add_disabled(MethodRef::new("a.B", "three"));

        assert_eq!(suite.partition_len(ResultPartition::Passed), 1);
        assert_eq!(suite.partition_len(ResultPartition::Failed), 0);
        assert_eq!(suite.partition_len(ResultPartition::Skipped), 1);
        assert_eq!(suite.partition_len(ResultPartition::Disabled), 1);
    }
}
