// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::MetricsKeyParseError, identifier::TestIdentifier};
use cts_results::ReportLog;
use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

/// The key under which a report log is stored: a device serial, an ABI and a test.
///
/// Displayed as `<device-serial>/<abi>/<class>#<method>`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MetricsKey {
    device_serial: String,
    abi: String,
    test: TestIdentifier,
}

impl MetricsKey {
    /// Creates a new key.
    ///
    /// The device serial and ABI must be non-empty and must not contain `/`.
    pub fn new(
        device_serial: impl Into<String>,
        abi: impl Into<String>,
        test: TestIdentifier,
    ) -> Result<Self, MetricsKeyParseError> {
        let device_serial = device_serial.into();
        if !is_valid_component(&device_serial) {
            return Err(MetricsKeyParseError::InvalidDeviceSerial {
                serial: device_serial,
            });
        }
        let abi = abi.into();
        if !is_valid_component(&abi) {
            return Err(MetricsKeyParseError::InvalidAbi { abi });
        }

        Ok(Self {
            device_serial,
            abi,
            test,
        })
    }

    /// Returns the device serial.
    pub fn device_serial(&self) -> &str {
        &self.device_serial
    }

    /// Returns the ABI.
    pub fn abi(&self) -> &str {
        &self.abi
    }

    /// Returns the test.
    pub fn test(&self) -> &TestIdentifier {
        &self.test
    }
}

fn is_valid_component(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

impl fmt::Display for MetricsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.device_serial, self.abi, self.test)
    }
}

impl FromStr for MetricsKey {
    type Err = MetricsKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The test name may itself contain `/`, so only the first two are separators.
        let mut parts = s.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(device_serial), Some(abi), Some(test)) => {
                Self::new(device_serial, abi, test.parse()?)
            }
            _ => Err(MetricsKeyParseError::InvalidFormat {
                input: s.to_owned(),
            }),
        }
    }
}

/// Report logs collected during a test run, keyed by [`MetricsKey`].
///
/// Parallel runs for different ABIs or devices can share a single store: every operation takes
/// an internal lock, and a store replaces any existing entry atomically.
#[derive(Debug, Default)]
pub struct MetricsStore {
    results: Mutex<HashMap<MetricsKey, ReportLog>>,
}

static GLOBAL: OnceLock<MetricsStore> = OnceLock::new();

impl MetricsStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide store.
    pub fn global() -> &'static MetricsStore {
        GLOBAL.get_or_init(MetricsStore::new)
    }

    /// Stores a report log, returning the one it replaced, if any.
    pub fn store_result(&self, key: MetricsKey, report_log: ReportLog) -> Option<ReportLog> {
        tracing::debug!(%key, "storing report log");
        self.lock().insert(key, report_log)
    }

    /// Returns a copy of the report log stored for `key`, if any.
    pub fn get_result(&self, key: &MetricsKey) -> Option<ReportLog> {
        self.lock().get(key).cloned()
    }

    /// Removes and returns the report log stored for `key`, if any.
    pub fn remove_result(&self, key: &MetricsKey) -> Option<ReportLog> {
        self.lock().remove(key)
    }

    /// Returns the number of stored report logs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no report logs are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MetricsKey, ReportLog>> {
        // Every critical section is a single map operation, so the map is consistent even if a
        // holder panicked.
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cts_results::{ResultUnit, ScoreType};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn key(s: &str) -> MetricsKey {
        s.parse().expect("valid key")
    }

    fn log_with_summary(score: f64) -> ReportLog {
        let mut log = ReportLog::new();
        log.set_summary("score", score, ScoreType::HigherBetter, ResultUnit::Score);
        log
    }

    #[test]
    fn key_round_trips() {
        let input = "emulator-5554/arm64-v8a/android.app.cts.ActivityTest#testCreate";
        let key = key(input);
        assert_eq!(key.device_serial(), "emulator-5554");
        assert_eq!(key.abi(), "arm64-v8a");
        assert_eq!(key.test().class_name(), "android.app.cts.ActivityTest");
        assert_eq!(key.to_string(), input);
    }

    #[test]
    fn key_test_may_contain_slash() {
        let key = key("serial/x86/a.Foo#test[path/to/file]");
        assert_eq!(key.test().test_name(), "test[path/to/file]");
    }

    #[test_case("serial/x86" ; "missing test")]
    #[test_case("serial" ; "missing abi")]
    #[test_case("/x86/a.Foo#test" ; "empty serial")]
    #[test_case("serial//a.Foo#test" ; "empty abi")]
    #[test_case("serial/x86/a.Foo" ; "invalid test")]
    fn key_parse_errors(input: &str) {
        input.parse::<MetricsKey>().expect_err("key is invalid");
    }

    #[test]
    fn key_new_rejects_slash() {
        let test: TestIdentifier = "a.Foo#test".parse().expect("valid identifier");
        assert_eq!(
            MetricsKey::new("a/b", "x86", test.clone()),
            Err(MetricsKeyParseError::InvalidDeviceSerial {
                serial: "a/b".to_owned()
            })
        );
        assert_eq!(
            MetricsKey::new("serial", "x86/64", test),
            Err(MetricsKeyParseError::InvalidAbi {
                abi: "x86/64".to_owned()
            })
        );
    }

    #[test]
    fn store_replaces() {
        let store = MetricsStore::new();
        let k = key("serial/x86/a.Foo#test");
        assert_eq!(store.store_result(k.clone(), log_with_summary(1.0)), None);
        assert_eq!(
            store.store_result(k.clone(), log_with_summary(2.0)),
            Some(log_with_summary(1.0))
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_result(&k), Some(log_with_summary(2.0)));

        assert_eq!(store.remove_result(&k), Some(log_with_summary(2.0)));
        assert!(store.is_empty());
        assert_eq!(store.get_result(&k), None);
    }

    #[test]
    fn concurrent_stores_all_land() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;

        let store = MetricsStore::new();
        std::thread::scope(|scope| {
            for thread in 0..THREADS {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..PER_THREAD {
                        let k = key(&format!("serial-{thread}/x86/a.Foo#test{i}"));
                        store.store_result(k, log_with_summary(i as f64));
                    }
                });
            }
        });

        assert_eq!(store.len(), THREADS * PER_THREAD);
        assert_eq!(
            store.get_result(&key("serial-3/x86/a.Foo#test7")),
            Some(log_with_summary(7.0))
        );
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(MetricsStore::global(), MetricsStore::global()));
    }
}
