// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

/// The status of a single test.
///
/// `Fail` is terminal: once a test has failed, the only way back to another status is
/// [`TestResult::reset_result`](crate::TestResult::reset_result).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TestStatus {
    /// The test has not finished executing.
    #[default]
    NotExecuted,

    /// The test passed.
    Pass,

    /// The test failed.
    Fail,
}

impl TestStatus {
    /// All known statuses, in the order they're summarized in a report.
    pub const ALL: [TestStatus; 3] = [TestStatus::Pass, TestStatus::Fail, TestStatus::NotExecuted];

    /// Returns the string used for this status in XML reports.
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::NotExecuted => "notExecuted",
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
        }
    }

    /// Returns true if no transition other than a reset may leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, TestStatus::Fail)
    }

    /// Computes the transition from `self` to `next`.
    pub fn transition_to(self, next: TestStatus) -> StatusTransition {
        if self.is_terminal() && next != self {
            StatusTransition::Rejected {
                current: self,
                requested: next,
            }
        } else {
            StatusTransition::Applied
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a request to change a [`TestStatus`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[must_use]
pub enum StatusTransition {
    /// The status was updated.
    Applied,

    /// The status was left unchanged because the current status is terminal.
    Rejected {
        /// The status that was kept.
        current: TestStatus,

        /// The status that was requested.
        requested: TestStatus,
    },
}

impl StatusTransition {
    /// Returns true if the status was updated.
    pub fn is_applied(self) -> bool {
        matches!(self, StatusTransition::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(TestStatus::NotExecuted, TestStatus::Pass, true ; "not executed to pass")]
    #[test_case(TestStatus::NotExecuted, TestStatus::Fail, true ; "not executed to fail")]
    #[test_case(TestStatus::Pass, TestStatus::Fail, true ; "pass to fail")]
    #[test_case(TestStatus::Pass, TestStatus::NotExecuted, true ; "pass to not executed")]
    #[test_case(TestStatus::Fail, TestStatus::Fail, true ; "fail to fail")]
    #[test_case(TestStatus::Fail, TestStatus::Pass, false ; "fail to pass")]
    #[test_case(TestStatus::Fail, TestStatus::NotExecuted, false ; "fail to not executed")]
    fn transitions(current: TestStatus, next: TestStatus, applied: bool) {
        assert_eq!(current.transition_to(next).is_applied(), applied);
    }

    #[test]
    fn display_matches_xml_names() {
        let names: Vec<_> = TestStatus::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["pass", "fail", "notExecuted"]);
    }
}
