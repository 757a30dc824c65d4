// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    case::CaseResult, errors::SerializeError, result::TestResult, serialize::serialize_fragment,
    status::TestStatus,
};
use indexmap::{IndexMap, map::Entry};
use std::io;

/// A node in the result tree, representing a single package segment.
///
/// The root of the tree has no name. Every other node is named after one segment of a Java
/// package: `android.app.cts.FooTest` is stored as case `FooTest` under the suites `android`,
/// `app` and `cts`.
///
/// Child suites and cases are kept in insertion order, so a tree built from the same sequence of
/// insertions always serializes to the same bytes.
#[derive(Clone, Debug, Default)]
pub struct TestSuite {
    name: Option<String>,
    child_suites: IndexMap<String, TestSuite>,
    cases: IndexMap<String, CaseResult>,
}

impl TestSuite {
    /// Creates a new, anonymous root suite.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a new, named suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            child_suites: IndexMap::new(),
            cases: IndexMap::new(),
        }
    }

    /// Returns the name of this suite, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Inserts a test result into this tree.
    ///
    /// `package_segments` are descended one level at a time, creating suites as necessary. The
    /// result is then inserted into the case for `class_name`, replacing any existing result for
    /// `test_name`.
    pub fn insert_test<S: AsRef<str>>(
        &mut self,
        package_segments: &[S],
        class_name: &str,
        test_name: &str,
        result: TestResult,
    ) -> &mut TestResult {
        self.get_or_create_case(package_segments, class_name)
            .insert_result(test_name, result)
    }

    /// Returns the case for `class_name` under `package_segments`, creating it and any missing
    /// suites along the way.
    pub fn get_or_create_case<S: AsRef<str>>(
        &mut self,
        package_segments: &[S],
        class_name: &str,
    ) -> &mut CaseResult {
        let mut suite = self;
        for segment in package_segments {
            suite = suite.get_or_create_child_suite(segment.as_ref());
        }

        match suite.cases.entry(class_name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(case = class_name, "creating case");
                entry.insert(CaseResult::new(class_name))
            }
        }
    }

    /// Returns the result for a test, creating it and any missing suites or cases along the way.
    pub fn get_or_create_result<S: AsRef<str>>(
        &mut self,
        package_segments: &[S],
        class_name: &str,
        test_name: &str,
    ) -> &mut TestResult {
        self.get_or_create_case(package_segments, class_name)
            .get_or_create_result(test_name)
    }

    /// Looks up the result for a test without creating anything.
    pub fn find_result<S: AsRef<str>>(
        &self,
        package_segments: &[S],
        class_name: &str,
        test_name: &str,
    ) -> Option<&TestResult> {
        let mut suite = self;
        for segment in package_segments {
            suite = suite.child_suites.get(segment.as_ref())?;
        }
        suite.cases.get(class_name)?.result(test_name)
    }

    /// Returns the child suite with the given name, if any.
    pub fn child_suite(&self, name: &str) -> Option<&TestSuite> {
        self.child_suites.get(name)
    }

    /// Returns the case with the given name, if any.
    pub fn case(&self, name: &str) -> Option<&CaseResult> {
        self.cases.get(name)
    }

    /// Iterates over child suites in insertion order.
    pub fn child_suites(&self) -> impl Iterator<Item = &TestSuite> + '_ {
        self.child_suites.values()
    }

    /// Iterates over cases in insertion order.
    pub fn cases(&self) -> impl Iterator<Item = &CaseResult> + '_ {
        self.cases.values()
    }

    /// Returns the number of results in this tree with the given status.
    pub fn count_results(&self, status: TestStatus) -> usize {
        let in_cases: usize = self.cases.values().map(|c| c.count_results(status)).sum();
        let in_children: usize = self
            .child_suites
            .values()
            .map(|s| s.count_results(status))
            .sum();
        in_cases + in_children
    }

    /// Returns the total number of results in this tree.
    pub fn total_results(&self) -> usize {
        let in_cases: usize = self.cases.values().map(CaseResult::len).sum();
        let in_children: usize = self.child_suites.values().map(TestSuite::total_results).sum();
        in_cases + in_children
    }

    /// Returns true if this tree has no results.
    pub fn is_empty(&self) -> bool {
        self.total_results() == 0
    }

    /// Serializes this tree as an XML fragment, without a declaration or a wrapping document
    /// element.
    ///
    /// An anonymous root produces its children one after the other.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_fragment(self, writer)
    }

    fn get_or_create_child_suite(&mut self, name: &str) -> &mut TestSuite {
        match self.child_suites.entry(name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(suite = name, "creating suite");
                entry.insert(TestSuite::new(name))
            }
        }
    }
}
