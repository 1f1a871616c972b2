// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use case_junit::{Report, TestCase, TestCaseStatus, TestSuite};
use chrono::DateTime;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn basic_report_serializes() {
    let output = basic_report()
        .to_string()
        .expect("serializing basic_report succeeds");

    let expected = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <testsuites>
            <testsuite name="Default test" tests="3" errors="0" skipped="1" failures="1" timestamp="2026-10-16T09:15:00+00:00" time="1500">
                <testcase name="twoPlusTwoEqualsFour" classname="com.petproject.tests.SimpleTests" time="4"/>
                <testcase name="twoPlusTwoEqualsFive" classname="com.petproject.tests.SimpleTests" time="6">
                    <failure type="java.lang.AssertionError" message="expected 5 but was 4"><![CDATA[java.lang.AssertionError: expected 5 but was 4
            at com.petproject.tests.SimpleTests.twoPlusTwoEqualsFive(SimpleTests.java:25)]]></failure>
                </testcase>
                <testcase name="iAmReallySumSomething" classname="com.petproject.tests.SimpleTests" time="0">
                    <skipped/>
                </testcase>
            </testsuite>
        </testsuites>
    "#};
    assert_eq!(output, expected);
}

#[test]
fn extra_attributes_and_escaping() {
    let mut case = TestCase::new("C35", TestCaseStatus::success());
    case.set_classname("TA")
        .set_time(Duration::from_millis(12))
        .add_attribute("tafname", "anotherTest")
        .add_attribute("tafclassname", "com.petproject.tests.AnotherSimpleTests");
    let mut failed = TestCase::new("C32", TestCaseStatus::failure());
    failed.set_classname("TA");

    let mut suite = TestSuite::new("a <quoted> & \"named\" suite");
    suite.add_test_cases([case, failed]);
    let mut report = Report::new();
    report
        .add_test_suite(suite)
        .add_test_suite(TestSuite::new("empty"));

    let output = report.to_string().expect("serializing report succeeds");

    let expected = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <testsuites>
            <testsuite name="a &lt;quoted&gt; &amp; &quot;named&quot; suite" tests="0" errors="0" skipped="0" failures="1">
                <testcase name="C35" classname="TA" time="12" tafname="anotherTest" tafclassname="com.petproject.tests.AnotherSimpleTests"/>
                <testcase name="C32" classname="TA">
                    <failure/>
                </testcase>
            </testsuite>
            <testsuite name="empty" tests="0" errors="0" skipped="0" failures="0"/>
        </testsuites>
    "#};
    assert_eq!(output, expected);
}

#[test]
fn basic_report_reads_back() {
    let report = basic_report();
    let xml = report.to_string().expect("serializing basic_report succeeds");

    let parsed = Report::parse(&xml).expect("parsing serialized report succeeds");
    assert_eq!(parsed, report);
}

#[test]
fn cdata_terminator_in_description_survives() {
    let mut status = TestCaseStatus::failure();
    status
        .set_type("java.lang.IllegalStateException")
        .set_description("saw ]]> in payload\nand ]]]]> again");
    let mut suite = TestSuite::new("cdata");
    suite.add_test_case(TestCase::new("weirdPayload", status.clone()));
    let mut report = Report::new();
    report.add_test_suite(suite);

    let xml = report.to_string().expect("serializing report succeeds");
    assert!(
        xml.contains("<![CDATA[saw ]]]]><![CDATA[> in payload"),
        "terminator split across sections: {xml}"
    );

    let parsed = Report::parse(&xml).expect("parsing serialized report succeeds");
    assert_eq!(parsed.test_suites[0].test_cases[0].status, status);
}

#[test]
fn parse_rejects_malformed_documents() {
    let unclosed = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>\n    <testsuite name=\"s\">";
    assert!(Report::parse(unclosed).is_err(), "unclosed root is rejected");

    let stray = "<testsuites><testcase name=\"orphan\"/></testsuites>";
    assert!(Report::parse(stray).is_err(), "testcase outside testsuite is rejected");

    let nameless = "<testsuites><testsuite tests=\"1\"/></testsuites>";
    assert!(Report::parse(nameless).is_err(), "testsuite without a name is rejected");

    let bad_count = "<testsuites><testsuite name=\"s\" failures=\"many\"/></testsuites>";
    assert!(Report::parse(bad_count).is_err(), "non-numeric count is rejected");
}

pub fn basic_report() -> Report {
    let start =
        DateTime::parse_from_rfc3339("2026-10-16T09:15:00+00:00").expect("valid timestamp");

    let mut suite = TestSuite::new("Default test");
    suite
        .set_tests(3)
        .set_timestamp(start)
        .set_time(Duration::from_millis(1500));

    let mut passed = TestCase::new("twoPlusTwoEqualsFour", TestCaseStatus::success());
    passed
        .set_classname("com.petproject.tests.SimpleTests")
        .set_time(Duration::from_millis(4));
    suite.add_test_case(passed);

    let mut status = TestCaseStatus::failure();
    status
        .set_type("java.lang.AssertionError")
        .set_message("expected 5 but was 4")
        .set_description(
            "java.lang.AssertionError: expected 5 but was 4\n    \
             at com.petproject.tests.SimpleTests.twoPlusTwoEqualsFive(SimpleTests.java:25)",
        );
    let mut failed = TestCase::new("twoPlusTwoEqualsFive", status);
    failed
        .set_classname("com.petproject.tests.SimpleTests")
        .set_time(Duration::from_millis(6));
    suite.add_test_case(failed);

    let mut disabled = TestCase::new("iAmReallySumSomething", TestCaseStatus::skipped());
    disabled
        .set_classname("com.petproject.tests.SimpleTests")
        .set_time(Duration::ZERO);
    suite.add_test_case(disabled);

    let mut report = Report::new();
    report.add_test_suite(suite);
    report
}
