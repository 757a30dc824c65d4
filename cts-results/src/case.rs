// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{result::TestResult, status::TestStatus};
use indexmap::{IndexMap, map::Entry};

/// The results for all test methods of a single test class.
///
/// Results are kept in insertion order.
#[derive(Clone, Debug)]
pub struct CaseResult {
    name: String,
    results: IndexMap<String, TestResult>,
}

impl CaseResult {
    /// Creates a new, empty `CaseResult`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: IndexMap::new(),
        }
    }

    /// Returns the name of this case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the result for the given test, creating a not-yet-executed one if necessary.
    pub fn get_or_create_result(&mut self, test_name: &str) -> &mut TestResult {
        match self.results.entry(test_name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(case = %self.name, test = test_name, "creating test result");
                entry.insert(TestResult::new(self.name.as_str(), test_name))
            }
        }
    }

    /// Inserts a result for the given test.
    ///
    /// If a result already exists for `test_name`, it is replaced in place and keeps its position.
    /// The result is re-keyed to this case and `test_name`.
    pub fn insert_result(&mut self, test_name: &str, mut result: TestResult) -> &mut TestResult {
        result.rekey(&self.name, test_name);
        match self.results.entry(test_name.to_owned()) {
            Entry::Occupied(mut entry) => {
                entry.insert(result);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(result),
        }
    }

    /// Returns the result for the given test, if any.
    pub fn result(&self, test_name: &str) -> Option<&TestResult> {
        self.results.get(test_name)
    }

    /// Returns a mutable reference to the result for the given test, if any.
    pub fn result_mut(&mut self, test_name: &str) -> Option<&mut TestResult> {
        self.results.get_mut(test_name)
    }

    /// Iterates over results in insertion order.
    pub fn results(&self) -> impl Iterator<Item = &TestResult> + '_ {
        self.results.values()
    }

    /// Returns results sorted by test name.
    pub fn sorted_results(&self) -> Vec<&TestResult> {
        let mut results: Vec<_> = self.results.values().collect();
        results.sort_by(|a, b| a.cmp_by_name(b));
        results
    }

    /// Returns the number of results with the given status.
    pub fn count_results(&self, status: TestStatus) -> usize {
        self.results
            .values()
            .filter(|result| result.status() == status)
            .count()
    }

    /// Returns the number of results in this case.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if this case has no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_or_create_reuses_entries() {
        let mut case = CaseResult::new("FooTest");
        case.get_or_create_result("testA").failed("boom");
        case.get_or_create_result("testB");
        let result = case.get_or_create_result("testA");
        assert_eq!(result.status(), TestStatus::Fail);
        assert_eq!(result.case_name(), "FooTest");
        assert_eq!(case.len(), 2);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut case = CaseResult::new("FooTest");
        case.insert_result("testA", TestResult::new("Other", "other"));
        case.insert_result("testB", TestResult::new("FooTest", "testB"));

        let mut failed = TestResult::new("FooTest", "testA");
        failed.failed("boom");
        case.insert_result("testA", failed);

        let names: Vec<_> = case.results().map(|r| r.name()).collect();
        assert_eq!(names, ["testA", "testB"]);
        let first = case.result("testA").expect("testA exists");
        assert_eq!(first.status(), TestStatus::Fail);
        assert_eq!(case.len(), 2);
    }

    #[test]
    fn insert_rekeys_result() {
        let mut case = CaseResult::new("FooTest");
        let result = case.insert_result("testA", TestResult::new("Other", "other"));
        assert_eq!(result.full_name(), "FooTest#testA");
    }

    #[test]
    fn result_mut_updates_in_place() {
        let mut case = CaseResult::new("FooTest");
        case.get_or_create_result("testA");
        assert!(case.result_mut("testMissing").is_none());

        case.result_mut("testA")
            .expect("testA exists")
            .set_bug_report("file:///bugreport.zip")
            .failed("boom");

        let result = case.result("testA").expect("testA exists");
        assert_eq!(result.status(), TestStatus::Fail);
        assert_eq!(result.bug_report(), Some("file:///bugreport.zip"));
        assert_eq!(case.len(), 1);
    }

    #[test]
    fn sorted_and_counted() {
        let mut case = CaseResult::new("FooTest");
        case.get_or_create_result("testC").failed("boom");
        let _ = case.get_or_create_result("testA").passed(None);
        case.get_or_create_result("testB");

        let sorted: Vec<_> = case.sorted_results().iter().map(|r| r.name()).collect();
        assert_eq!(sorted, ["testA", "testB", "testC"]);

        assert_eq!(case.count_results(TestStatus::Pass), 1);
        assert_eq!(case.count_results(TestStatus::Fail), 1);
        assert_eq!(case.count_results(TestStatus::NotExecuted), 1);
    }
}
