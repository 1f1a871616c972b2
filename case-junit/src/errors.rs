// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use thiserror::Error;

/// An error that occurs while serializing a [`Report`](crate::Report).
///
/// Returned by [`Report::serialize`](crate::Report::serialize) and
/// [`Report::to_string`](crate::Report::to_string).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writing to the underlying writer failed.
    #[error("error writing JUnit report")]
    Io(#[from] io::Error),

    /// The XML writer rejected an event.
    #[error("error serializing JUnit report")]
    Xml(#[from] quick_xml::Error),

    /// The serialized output was not valid UTF-8.
    #[error("serialized JUnit report is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// An error that occurs while reading a [`Report`](crate::Report) back from XML.
///
/// Returned by [`Report::parse`](crate::Report::parse).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    /// The input is not well-formed XML.
    #[error("error reading JUnit report at byte {position}")]
    Xml {
        /// The byte offset the reader had reached.
        position: u64,

        /// The underlying error.
        #[source]
        error: quick_xml::Error,
    },

    /// An element appeared somewhere the JUnit structure does not allow it.
    #[error("unexpected <{element}> at byte {position}")]
    UnexpectedElement {
        /// The element name.
        element: String,

        /// The byte offset the reader had reached.
        position: u64,
    },

    /// A required attribute was absent.
    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        /// The element name.
        element: &'static str,

        /// The attribute name.
        attribute: &'static str,
    },

    /// An attribute that should hold a number or timestamp could not be parsed.
    #[error("<{element}> attribute `{attribute}` has invalid value `{value}`")]
    InvalidAttribute {
        /// The element name.
        element: &'static str,

        /// The attribute name.
        attribute: String,

        /// The value found in the document.
        value: String,
    },

    /// The document ended before the root element was closed.
    #[error("JUnit report ended before </testsuites>")]
    UnexpectedEof,
}
