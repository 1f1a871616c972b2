// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read a `Report` back from XML.

use crate::{
    DeserializeError, Report, TestCase, TestCaseStatus, TestSuite, XmlString,
    serialize::{FAILURE_TAG, SKIPPED_TAG, TESTCASE_TAG, TESTSUITE_TAG, TESTSUITES_TAG},
};
use chrono::DateTime;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::time::Duration;

pub(crate) fn parse_report(xml: &str) -> Result<Report, DeserializeError> {
    let mut reader = Reader::from_str(xml);
    let mut parser = ReportParser::default();

    loop {
        let event = reader.read_event().map_err(|error| DeserializeError::Xml {
            position: reader.buffer_position() as u64,
            error,
        })?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(start) => parser.open(&start, false, position)?,
            Event::Empty(start) => parser.open(&start, true, position)?,
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                parser.close(&name, position)?;
            }
            Event::CData(cdata) => {
                parser.push_text(&String::from_utf8_lossy(&cdata));
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|error| DeserializeError::Xml {
                    position,
                    error: error.into(),
                })?;
                // Whitespace between elements comes from indentation.
                if !text.trim().is_empty() {
                    parser.push_text(&text);
                }
            }
            Event::Eof => return parser.finish(),
            // Declarations, comments, processing instructions and doctypes carry nothing we
            // model.
            _ => {}
        }
    }
}

#[derive(Debug, Default)]
struct ReportParser {
    report: Option<Report>,
    suite: Option<TestSuite>,
    case: Option<TestCase>,
    // A `failure` element that has been opened but not yet closed.
    failure: Option<TestCaseStatus>,
    done: bool,
}

impl ReportParser {
    fn open(
        &mut self,
        start: &BytesStart<'_>,
        is_empty: bool,
        position: u64,
    ) -> Result<(), DeserializeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attributes = read_attributes(start, position)?;

        match name.as_str() {
            n if n == TESTSUITES_TAG && self.report.is_none() && !self.done => {
                self.report = Some(Report::new());
                self.done = is_empty;
            }
            n if n == TESTSUITE_TAG && self.report.is_some() && self.suite.is_none() => {
                let suite = parse_test_suite(attributes)?;
                if is_empty {
                    self.push_suite(suite);
                } else {
                    self.suite = Some(suite);
                }
            }
            n if n == TESTCASE_TAG && self.suite.is_some() && self.case.is_none() => {
                let case = parse_test_case(attributes)?;
                if is_empty {
                    self.push_case(case);
                } else {
                    self.case = Some(case);
                }
            }
            n if n == FAILURE_TAG && self.case_is_undecided() => {
                let mut status = TestCaseStatus::failure();
                for (key, value) in attributes {
                    match key.as_str() {
                        "type" => {
                            status.set_type(value);
                        }
                        "message" => {
                            status.set_message(value);
                        }
                        _ => {}
                    }
                }
                if is_empty {
                    if let Some(case) = &mut self.case {
                        case.status = status;
                    }
                } else {
                    self.failure = Some(status);
                }
            }
            n if n == SKIPPED_TAG && self.case_is_undecided() => {
                if let Some(case) = &mut self.case {
                    case.status = TestCaseStatus::Skipped;
                }
            }
            _ => {
                return Err(DeserializeError::UnexpectedElement {
                    element: name,
                    position,
                });
            }
        }

        Ok(())
    }

    fn close(&mut self, name: &str, position: u64) -> Result<(), DeserializeError> {
        let unexpected = || DeserializeError::UnexpectedElement {
            element: format!("/{name}"),
            position,
        };

        match name {
            n if n == FAILURE_TAG => {
                let status = self.failure.take().ok_or_else(unexpected)?;
                let case = self.case.as_mut().ok_or_else(unexpected)?;
                case.status = status;
            }
            n if n == SKIPPED_TAG => {}
            n if n == TESTCASE_TAG => {
                let case = self.case.take().ok_or_else(unexpected)?;
                self.push_case(case);
            }
            n if n == TESTSUITE_TAG => {
                let suite = self.suite.take().ok_or_else(unexpected)?;
                self.push_suite(suite);
            }
            n if n == TESTSUITES_TAG && self.suite.is_none() => {
                self.done = true;
            }
            _ => return Err(unexpected()),
        }

        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(TestCaseStatus::Failure { description, .. }) = &mut self.failure {
            let mut joined = description.take().map(String::from).unwrap_or_default();
            joined.push_str(text);
            *description = Some(joined.into());
        }
    }

    fn finish(self) -> Result<Report, DeserializeError> {
        match self.report {
            Some(report) if self.done => Ok(report),
            _ => Err(DeserializeError::UnexpectedEof),
        }
    }

    fn case_is_undecided(&self) -> bool {
        self.failure.is_none()
            && matches!(
                &self.case,
                Some(TestCase {
                    status: TestCaseStatus::Success,
                    ..
                })
            )
    }

    // Counts come from the document's attributes, so cases are pushed directly rather than
    // through `add_test_case`.
    fn push_case(&mut self, case: TestCase) {
        if let Some(suite) = &mut self.suite {
            suite.test_cases.push(case);
        }
    }

    fn push_suite(&mut self, suite: TestSuite) {
        if let Some(report) = &mut self.report {
            report.test_suites.push(suite);
        }
    }
}

fn read_attributes(
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Vec<(String, String)>, DeserializeError> {
    start
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|error| DeserializeError::Xml {
                position,
                error: error.into(),
            })?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|error| DeserializeError::Xml {
                    position,
                    error: error.into(),
                })?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

fn parse_test_suite(attributes: Vec<(String, String)>) -> Result<TestSuite, DeserializeError> {
    let mut name = None;
    let mut suite = TestSuite::new("");

    for (key, value) in attributes {
        match key.as_str() {
            "name" => name = Some(value),
            "tests" => suite.tests = parse_count(TESTSUITE_TAG, &key, &value)?,
            "errors" => suite.errors = parse_count(TESTSUITE_TAG, &key, &value)?,
            "skipped" => suite.skipped = parse_count(TESTSUITE_TAG, &key, &value)?,
            "failures" => suite.failures = parse_count(TESTSUITE_TAG, &key, &value)?,
            "timestamp" => {
                let timestamp = DateTime::parse_from_rfc3339(&value).map_err(|_| {
                    DeserializeError::InvalidAttribute {
                        element: TESTSUITE_TAG,
                        attribute: key.clone(),
                        value: value.clone(),
                    }
                })?;
                suite.set_timestamp(timestamp);
            }
            "time" => {
                suite.set_time(parse_time(TESTSUITE_TAG, &key, &value)?);
            }
            _ => {}
        }
    }

    suite.name = XmlString::new(name.ok_or(DeserializeError::MissingAttribute {
        element: TESTSUITE_TAG,
        attribute: "name",
    })?);
    Ok(suite)
}

fn parse_test_case(attributes: Vec<(String, String)>) -> Result<TestCase, DeserializeError> {
    let mut name = None;
    let mut case = TestCase::new("", TestCaseStatus::success());

    for (key, value) in attributes {
        match key.as_str() {
            "name" => name = Some(value),
            "classname" => {
                case.set_classname(value);
            }
            "time" => {
                case.set_time(parse_time(TESTCASE_TAG, &key, &value)?);
            }
            _ => {
                case.add_attribute(key, value);
            }
        }
    }

    case.name = XmlString::new(name.ok_or(DeserializeError::MissingAttribute {
        element: TESTCASE_TAG,
        attribute: "name",
    })?);
    Ok(case)
}

fn parse_count(
    element: &'static str,
    attribute: &str,
    value: &str,
) -> Result<usize, DeserializeError> {
    value
        .parse()
        .map_err(|_| DeserializeError::InvalidAttribute {
            element,
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        })
}

// Times are written as whole milliseconds.
fn parse_time(
    element: &'static str,
    attribute: &str,
    value: &str,
) -> Result<Duration, DeserializeError> {
    value
        .parse()
        .map(Duration::from_millis)
        .map_err(|_| DeserializeError::InvalidAttribute {
            element,
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        })
}
