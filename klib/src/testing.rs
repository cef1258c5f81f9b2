//! Minimal in-kernel test harness, trimmed from the teacher's
//! `slopos-lib::testing`: a `TestResult` every test function returns plus
//! assertion macros that return `Fail` instead of panicking/unwinding
//! (there is no unwinding machinery in a `#![no_std]` kernel).
//!
//! Crate-local `#[cfg(test)]` modules use plain `#[test]` + `assert!` (host
//! test runs do have unwinding); this harness is for the `nanokernel-tests`
//! aggregator crate's scenario suite, which doubles as documentation of
//! spec §8's testable properties and is written so it could also run
//! bare-metal under a future test kernel image.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
}

pub struct TestCase {
    pub name: &'static str,
    pub run: fn() -> TestResult,
}

#[macro_export]
macro_rules! pass {
    () => {
        return $crate::testing::TestResult::Pass
    };
}

#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {{
        $crate::klog_info!($($arg)*);
        return $crate::testing::TestResult::Fail;
    }};
}

#[macro_export]
macro_rules! assert_test {
    ($cond:expr) => {{
        if !$cond {
            $crate::klog_info!("ASSERT: condition failed: {}", stringify!($cond));
            return $crate::testing::TestResult::Fail;
        }
    }};
    ($cond:expr, $msg:expr) => {{
        if !$cond {
            $crate::klog_info!("ASSERT: {}", $msg);
            return $crate::testing::TestResult::Fail;
        }
    }};
}

#[macro_export]
macro_rules! assert_eq_test {
    ($left:expr, $right:expr) => {{
        let left = $left;
        let right = $right;
        if left != right {
            $crate::klog_info!("ASSERT_EQ: expected {:?}, got {:?}", right, left);
            return $crate::testing::TestResult::Fail;
        }
    }};
}

/// Run a slice of test cases, returning `(passed, failed)`. Used by the
/// `nanokernel-tests` aggregator's suite runner.
pub fn run_all(cases: &[TestCase]) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    for case in cases {
        match (case.run)() {
            TestResult::Pass => passed += 1,
            TestResult::Fail => {
                crate::klog_error!("FAIL: {}", case.name);
                failed += 1;
            }
        }
    }
    (passed, failed)
}
