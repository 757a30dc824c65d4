// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{TestIdentifierParseError, TestIdentifierParseErrorKind};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A fully-qualified test method, written as `<class>#<method>`.
///
/// The class name is fully qualified: `android.app.cts.ActivityTest#testCreate` names method
/// `testCreate` of class `ActivityTest` in package `android.app.cts`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestIdentifier {
    class_name: String,
    test_name: String,
}

impl TestIdentifier {
    /// Creates a new identifier from a fully-qualified class name and a method name.
    pub fn new(
        class_name: impl Into<String>,
        test_name: impl Into<String>,
    ) -> Result<Self, TestIdentifierParseError> {
        let class_name = class_name.into();
        let test_name = test_name.into();
        let kind = if class_name.is_empty() {
            Some(TestIdentifierParseErrorKind::EmptyClassName)
        } else if test_name.is_empty() {
            Some(TestIdentifierParseErrorKind::EmptyTestName)
        } else if class_name.split('.').any(str::is_empty) {
            Some(TestIdentifierParseErrorKind::EmptySegment)
        } else {
            None
        };

        match kind {
            Some(kind) => Err(TestIdentifierParseError::new(
                format!("{class_name}#{test_name}"),
                kind,
            )),
            None => Ok(Self {
                class_name,
                test_name,
            }),
        }
    }

    /// Parses an identifier of the form `<class>#<method>`.
    ///
    /// The input is split at the first `#`.
    pub fn parse(input: &str) -> Result<Self, TestIdentifierParseError> {
        let (class_name, test_name) = input.split_once('#').ok_or_else(|| {
            TestIdentifierParseError::new(input, TestIdentifierParseErrorKind::MissingSeparator)
        })?;
        Self::new(class_name, test_name)
            .map_err(|err| TestIdentifierParseError::new(input, err.kind))
    }

    /// Returns the fully-qualified class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the method name.
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Returns the package segments of the class, outermost first.
    ///
    /// A class without a package has no segments.
    pub fn package_segments(&self) -> Vec<&str> {
        match self.class_name.rsplit_once('.') {
            Some((package, _)) => package.split('.').collect(),
            None => Vec::new(),
        }
    }

    /// Returns the class name without its package.
    pub fn simple_class_name(&self) -> &str {
        match self.class_name.rsplit_once('.') {
            Some((_, simple)) => simple,
            None => &self.class_name,
        }
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.test_name)
    }
}

impl FromStr for TestIdentifier {
    type Err = TestIdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TestIdentifier {
    type Error = TestIdentifierParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TestIdentifier> for String {
    fn from(value: TestIdentifier) -> Self {
        value.to_string()
    }
}
