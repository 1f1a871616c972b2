// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Map test methods to the case identifiers of an external test-management system.
//!
//! Several automated tests may share one manual case identifier. A method may also be
//! annotated with more than one identifier; only the first is used, the rest are
//! documentation.

use crate::{MethodRef, errors::MissingCaseIdError};
use indexmap::IndexMap;
use std::fmt;

/// A source of case identifiers for test methods.
///
/// Implemented by [`CaseIdTable`] and by closures of type
/// `Fn(&MethodRef) -> Option<Vec<String>>`.
pub trait CaseIdLookup {
    /// Returns the identifiers declared for `method`, in declaration order, or `None` if the
    /// method declares none.
    fn case_ids(&self, method: &MethodRef) -> Option<Vec<String>>;
}

impl<F> CaseIdLookup for F
where
    F: Fn(&MethodRef) -> Option<Vec<String>>,
{
    fn case_ids(&self, method: &MethodRef) -> Option<Vec<String>> {
        self(method)
    }
}

/// A precomputed table from methods to their case identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseIdTable {
    ids: IndexMap<MethodRef, Vec<String>>,
}

impl CaseIdTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates identifiers with a method, replacing any earlier entry for it.
    pub fn insert(
        &mut self,
        method: MethodRef,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.ids
            .insert(method, ids.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the number of methods in the table.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl CaseIdLookup for CaseIdTable {
    fn case_ids(&self, method: &MethodRef) -> Option<Vec<String>> {
        self.ids.get(method).cloned()
    }
}

impl<S, I> FromIterator<(MethodRef, I)> for CaseIdTable
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (MethodRef, I)>>(iter: T) -> Self {
        let mut table = CaseIdTable::new();
        for (method, ids) in iter {
            table.insert(method, ids);
        }
        table
    }
}

/// An identifier for a case in an external test-management system, e.g. `C35`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(String);

impl CaseId {
    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the identifier into a `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves methods to a single case identifier.
///
/// Every call consults the lookup afresh; nothing is cached between calls.
#[derive(Clone, Copy)]
pub struct CaseIdResolver<'a> {
    lookup: &'a dyn CaseIdLookup,
}

impl<'a> CaseIdResolver<'a> {
    /// Creates a resolver backed by `lookup`.
    pub fn new(lookup: &'a dyn CaseIdLookup) -> Self {
        Self { lookup }
    }

    /// Returns the first identifier declared for `method`.
    ///
    /// Fails if the method declares no identifiers, or declares an empty list.
    pub fn resolve(&self, method: &MethodRef) -> Result<CaseId, MissingCaseIdError> {
        self.lookup
            .case_ids(method)
            .and_then(|ids| ids.into_iter().next())
            .map(CaseId)
            .ok_or_else(|| MissingCaseIdError::new(method.clone()))
    }
}

impl fmt::Debug for CaseIdResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseIdResolver").finish_non_exhaustive()
    }
}
