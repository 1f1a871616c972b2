// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build, write and read back JUnit XML reports whose cases may be keyed by
//! an external test-management identifier.

mod deserialize;
mod errors;
mod report;
mod serialize;

pub use errors::*;
pub use report::*;
