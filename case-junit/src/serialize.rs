// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{Report, SerializeError, TestCase, TestCaseStatus, TestSuite};
use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event},
};
use std::{
    io::{self, Write},
    time::Duration,
};

pub(crate) static TESTSUITES_TAG: &str = "testsuites";
pub(crate) static TESTSUITE_TAG: &str = "testsuite";
pub(crate) static TESTCASE_TAG: &str = "testcase";
pub(crate) static FAILURE_TAG: &str = "failure";
pub(crate) static SKIPPED_TAG: &str = "skipped";

static CDATA_END: &str = "]]>";

pub(crate) fn serialize_report(
    report: &Report,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, &mut writer)?;

    // Add a trailing newline.
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn serialize_report_impl(
    report: &Report,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let Report { test_suites } = report;

    writer.write_event(Event::Start(BytesStart::new(TESTSUITES_TAG)))?;

    for test_suite in test_suites {
        serialize_test_suite(test_suite, writer)?;
    }

    serialize_end_tag(TESTSUITES_TAG, writer)?;
    Ok(())
}

fn serialize_test_suite(
    test_suite: &TestSuite,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let TestSuite {
        name,
        tests,
        errors,
        skipped,
        failures,
        timestamp,
        time,
        test_cases,
    } = test_suite;

    let mut test_suite_tag = BytesStart::new(TESTSUITE_TAG);
    test_suite_tag.extend_attributes([
        ("name", name.as_str()),
        ("tests", tests.to_string().as_str()),
        ("errors", errors.to_string().as_str()),
        ("skipped", skipped.to_string().as_str()),
        ("failures", failures.to_string().as_str()),
    ]);
    if let Some(timestamp) = timestamp {
        test_suite_tag.push_attribute(("timestamp", timestamp.format("%+").to_string().as_str()));
    }
    if let Some(time) = time {
        test_suite_tag.push_attribute(("time", serialize_time(time).as_str()));
    }

    if test_cases.is_empty() {
        writer.write_event(Event::Empty(test_suite_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(test_suite_tag))?;
    for test_case in test_cases {
        serialize_test_case(test_case, writer)?;
    }
    serialize_end_tag(TESTSUITE_TAG, writer)?;

    Ok(())
}

fn serialize_test_case(
    test_case: &TestCase,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let TestCase {
        name,
        classname,
        time,
        status,
        extra,
    } = test_case;

    let mut test_case_tag = BytesStart::new(TESTCASE_TAG);
    test_case_tag.push_attribute(("name", name.as_str()));
    if let Some(classname) = classname {
        test_case_tag.push_attribute(("classname", classname.as_str()));
    }
    if let Some(time) = time {
        test_case_tag.push_attribute(("time", serialize_time(time).as_str()));
    }
    for (k, v) in extra {
        test_case_tag.push_attribute((k.as_str(), v.as_str()));
    }

    match status {
        TestCaseStatus::Success => {
            writer.write_event(Event::Empty(test_case_tag))?;
        }
        TestCaseStatus::Failure {
            message,
            ty,
            description,
        } => {
            writer.write_event(Event::Start(test_case_tag))?;
            serialize_failure(
                ty.as_deref(),
                message.as_deref(),
                description.as_deref(),
                writer,
            )?;
            serialize_end_tag(TESTCASE_TAG, writer)?;
        }
        TestCaseStatus::Skipped => {
            writer.write_event(Event::Start(test_case_tag))?;
            writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
            serialize_end_tag(TESTCASE_TAG, writer)?;
        }
    }

    Ok(())
}

fn serialize_failure(
    ty: Option<&str>,
    message: Option<&str>,
    description: Option<&str>,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let mut tag = BytesStart::new(FAILURE_TAG);
    if let Some(ty) = ty {
        tag.push_attribute(("type", ty));
    }
    if let Some(message) = message {
        tag.push_attribute(("message", message));
    }

    match description {
        Some(description) => {
            writer.write_event(Event::Start(tag))?;
            serialize_cdata(description, writer)?;
            serialize_end_tag(FAILURE_TAG, writer)?;
        }
        None => {
            writer.write_event(Event::Empty(tag))?;
        }
    }

    Ok(())
}

// A CDATA section cannot contain its own terminator, so split the text after each "]]" that
// precedes a ">" and write the pieces as adjacent sections.
fn serialize_cdata(text: &str, writer: &mut Writer<impl io::Write>) -> Result<(), SerializeError> {
    let mut rest = text;
    while let Some(pos) = rest.find(CDATA_END) {
        let (head, tail) = rest.split_at(pos + 2);
        writer.write_event(Event::CData(BytesCData::new(head)))?;
        rest = tail;
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;
    Ok(())
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

// Serialize time as whole milliseconds.
fn serialize_time(time: &Duration) -> String {
    time.as_millis().to_string()
}
