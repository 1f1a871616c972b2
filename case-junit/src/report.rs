// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    deserialize::parse_report,
    errors::{DeserializeError, SerializeError},
    serialize::serialize_report,
};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use std::{borrow::Borrow, fmt, io, ops::Deref, time::Duration};

/// The root element of a JUnit report, serialized as `testsuites`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The test suites contained in this report, in document order.
    pub test_suites: Vec<TestSuite>,
}

impl Report {
    /// Creates a new, empty `Report`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new test suite to the end of the report.
    pub fn add_test_suite(&mut self, test_suite: TestSuite) -> &mut Self {
        self.test_suites.push(test_suite);
        self
    }

    /// Adds several test suites to the end of the report.
    pub fn add_test_suites(
        &mut self,
        test_suites: impl IntoIterator<Item = TestSuite>,
    ) -> &mut Self {
        self.test_suites.extend(test_suites);
        self
    }

    /// Serialize this report to the given writer.
    ///
    /// The output is UTF-8, starts with an XML declaration and is indented by four spaces.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_report(self, writer)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Reads a report previously produced by [`Report::serialize`].
    pub fn parse(xml: &str) -> Result<Self, DeserializeError> {
        parse_report(xml)
    }
}

/// Represents a single test suite.
///
/// A `TestSuite` groups together several `TestCase` instances.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestSuite {
    /// The name of this test suite.
    pub name: XmlString,

    /// The total number of tests registered for this suite.
    ///
    /// This is supplied by the producer and is not derived from `test_cases`: a suite may
    /// register methods that never show up as cases.
    pub tests: usize,

    /// The number of tests that errored. Always zero for reports built from suite runs,
    /// which fold errors into failures.
    pub errors: usize,

    /// The number of skipped test cases.
    pub skipped: usize,

    /// The number of failed test cases.
    pub failures: usize,

    /// The time at which the test suite began execution.
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// The overall time taken by the test suite.
    ///
    /// This is serialized as a whole number of milliseconds.
    pub time: Option<Duration>,

    /// The test cases that form this test suite.
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    /// Creates a new `TestSuite`.
    pub fn new(name: impl Into<XmlString>) -> Self {
        Self {
            name: name.into(),
            tests: 0,
            errors: 0,
            skipped: 0,
            failures: 0,
            timestamp: None,
            time: None,
            test_cases: vec![],
        }
    }

    /// Sets the number of tests registered for this suite.
    pub fn set_tests(&mut self, tests: usize) -> &mut Self {
        self.tests = tests;
        self
    }

    /// Sets the start timestamp for the test suite.
    pub fn set_timestamp(&mut self, timestamp: impl Into<DateTime<FixedOffset>>) -> &mut Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the time taken for the test suite.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = Some(time);
        self
    }

    /// Adds a test case to this test suite and updates the `failures` and `skipped` counts.
    ///
    /// When generating a new report, use of this method is recommended over adding to
    /// `self.test_cases` directly.
    pub fn add_test_case(&mut self, test_case: TestCase) -> &mut Self {
        match &test_case.status {
            TestCaseStatus::Success => {}
            TestCaseStatus::Failure { .. } => self.failures += 1,
            TestCaseStatus::Skipped => self.skipped += 1,
        }
        self.test_cases.push(test_case);
        self
    }

    pub fn add_test_cases(&mut self, test_cases: impl IntoIterator<Item = TestCase>) -> &mut Self {
        for test_case in test_cases {
            self.add_test_case(test_case);
        }
        self
    }
}

/// Represents a single test case.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestCase {
    /// The name of the test case.
    pub name: XmlString,

    /// The "classname" of the test case.
    ///
    /// For method-keyed reports this is the declaring class. For reports keyed by an external
    /// case identifier, consumers treat `classname` + `name` as the automation identifier.
    pub classname: Option<XmlString>,

    /// The time it took to execute this test case.
    pub time: Option<Duration>,

    /// The status of this test.
    pub status: TestCaseStatus,

    /// Other fields that are set as attributes, in insertion order.
    pub extra: IndexMap<XmlString, XmlString>,
}

impl TestCase {
    /// Creates a new test case.
    pub fn new(name: impl Into<XmlString>, status: TestCaseStatus) -> Self {
        Self {
            name: name.into(),
            classname: None,
            time: None,
            status,
            extra: IndexMap::new(),
        }
    }

    /// Sets the classname of the test.
    pub fn set_classname(&mut self, classname: impl Into<XmlString>) -> &mut Self {
        self.classname = Some(classname.into());
        self
    }

    /// Sets the time taken for the test case.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = Some(time);
        self
    }

    /// Adds an extra attribute. Setting the same key twice keeps the original position.
    pub fn add_attribute(
        &mut self,
        key: impl Into<XmlString>,
        value: impl Into<XmlString>,
    ) -> &mut Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Represents the outcome of a test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestCaseStatus {
    /// This test case passed. No child element is written.
    Success,

    /// This test case failed. Serialized as a `failure` child element.
    Failure {
        /// The failure message, written as the `message` attribute.
        message: Option<XmlString>,

        /// The kind of failure, written as the `type` attribute.
        ty: Option<XmlString>,

        /// The description of the failure, usually a stack trace.
        ///
        /// This is serialized as CDATA and deserialized from the text of the element.
        description: Option<XmlString>,
    },

    /// This test case was not run. Serialized as an empty `skipped` child element.
    Skipped,
}

impl TestCaseStatus {
    /// Creates a new `TestCaseStatus` that represents a successful test.
    pub fn success() -> Self {
        TestCaseStatus::Success
    }

    /// Creates a new `TestCaseStatus` that represents a failed test.
    pub fn failure() -> Self {
        TestCaseStatus::Failure {
            message: None,
            ty: None,
            description: None,
        }
    }

    /// Creates a new `TestCaseStatus` that represents a skipped or disabled test.
    pub fn skipped() -> Self {
        TestCaseStatus::Skipped
    }

    /// Sets the message. No-op unless this is a failure.
    pub fn set_message(&mut self, new_message: impl Into<XmlString>) -> &mut Self {
        if let TestCaseStatus::Failure { message, .. } = self {
            *message = Some(new_message.into());
        }
        self
    }

    /// Sets the type. No-op unless this is a failure.
    pub fn set_type(&mut self, new_ty: impl Into<XmlString>) -> &mut Self {
        if let TestCaseStatus::Failure { ty, .. } = self {
            *ty = Some(new_ty.into());
        }
        self
    }

    /// Sets the description (text node). No-op unless this is a failure.
    pub fn set_description(&mut self, new_description: impl Into<XmlString>) -> &mut Self {
        if let TestCaseStatus::Failure { description, .. } = self {
            *description = Some(new_description.into());
        }
        self
    }
}

/// A string that can be written into an XML 1.0 document.
///
/// Characters that XML 1.0 forbids (most ASCII control characters, `U+FFFE` and `U+FFFF`) are
/// removed on construction. Tab, line feed and carriage return are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XmlString {
    data: Box<str>,
}

impl XmlString {
    /// Creates a new `XmlString`, removing any characters that cannot appear in XML.
    pub fn new(data: impl AsRef<str>) -> Self {
        let data = data.as_ref();
        let data = data
            .replace(
                |c| {
                    matches!(
                        c,
                        '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f' | '\u{fffe}' | '\u{ffff}'
                    )
                },
                "",
            )
            .into_boxed_str();
        Self { data }
    }

    /// Returns the string.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Converts the `XmlString` into a `String`.
    pub fn into_string(self) -> String {
        self.data.into_string()
    }
}

impl AsRef<str> for XmlString {
    fn as_ref(&self) -> &str {
        &self.data
    }
}

impl Borrow<str> for XmlString {
    fn borrow(&self) -> &str {
        &self.data
    }
}

impl Deref for XmlString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl fmt::Display for XmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

impl From<&str> for XmlString {
    fn from(s: &str) -> Self {
        XmlString::new(s)
    }
}

impl From<String> for XmlString {
    fn from(s: String) -> Self {
        XmlString::new(s)
    }
}

impl From<&String> for XmlString {
    fn from(s: &String) -> Self {
        XmlString::new(s)
    }
}

impl From<XmlString> for String {
    fn from(s: XmlString) -> Self {
        s.into_string()
    }
}

impl PartialEq<str> for XmlString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for XmlString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("plain", "plain"; "plain text is unchanged")]
    #[test_case("a\tb\nc\rd", "a\tb\nc\rd"; "tab and newlines are kept")]
    #[test_case("bell\x07 esc\x1b[0m", "bell esc[0m"; "control characters are removed")]
    #[test_case("nul\x00\u{fffe}\u{ffff}", "nul"; "non-characters are removed")]
    fn xml_string_sanitizes(input: &str, expected: &str) {
        assert_eq!(XmlString::new(input).as_str(), expected);
    }

    #[test]
    fn add_test_case_updates_counts() {
        let mut suite = TestSuite::new("suite");
        suite.add_test_cases([
            TestCase::new("a", TestCaseStatus::success()),
            TestCase::new("b", TestCaseStatus::failure()),
            TestCase::new("c", TestCaseStatus::skipped()),
            TestCase::new("d", TestCaseStatus::skipped()),
        ]);

        assert_eq!(suite.failures, 1);
        assert_eq!(suite.skipped, 2);
        assert_eq!(suite.errors, 0);
        // tests is the registered count and is never derived from cases.
        assert_eq!(suite.tests, 0);
        assert_eq!(suite.test_cases.len(), 4);
    }

    #[test]
    fn status_setters_only_touch_failures() {
        let mut status = TestCaseStatus::skipped();
        status.set_message("ignored").set_type("ignored");
        assert_eq!(status, TestCaseStatus::Skipped);

        let mut status = TestCaseStatus::failure();
        status
            .set_type("java.lang.AssertionError")
            .set_message("expected 5 but was 4")
            .set_description("trace");
        assert_eq!(
            status,
            TestCaseStatus::Failure {
                message: Some("expected 5 but was 4".into()),
                ty: Some("java.lang.AssertionError".into()),
                description: Some("trace".into()),
            }
        );
    }
}
