//! # Test Context Module / 测试上下文模块
//!
//! The context is the handle a test body receives: assertions, message
//! output, metadata setters and the raised-error escape hatch all go
//! through it onto the test's run record.
//!
//! 上下文是测试主体接收到的句柄：断言、消息输出、元数据设置
//! 以及抛出错误的逃逸通道都通过它作用于测试的运行记录。

use crate::core::model::{ErrorClass, EventKind};
use crate::core::record::RunRecord;
use std::fmt;
use std::fmt::Debug;

/// Marker returned through `Err` when a test raises an error. The error
/// details are already logged on the run record; the marker only unwinds
/// the body with `?`.
///
/// 测试抛出错误时通过 `Err` 返回的标记。错误细节已记录在运行记录上，
/// 此标记仅用于通过 `?` 提前退出主体。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestAbort;

impl fmt::Display for TestAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("test raised an error")
    }
}

impl std::error::Error for TestAbort {}

/// The live handle into a running test's record.
/// 指向正在运行的测试记录的实时句柄。
pub struct TestContext<'a> {
    record: &'a mut RunRecord,
}

impl<'a> TestContext<'a> {
    pub(crate) fn new(record: &'a mut RunRecord) -> Self {
        Self { record }
    }

    /// Asserts that `condition` holds. Returns the condition so callers can
    /// chain on it.
    pub fn check(&mut self, condition: bool, message: &str, line: u32) -> bool {
        self.record.check(condition, message, line)
    }

    /// Asserts that two values compare equal. On failure the expected and
    /// actual values are appended to the event log as detail lines.
    pub fn check_eq<T>(&mut self, expected: T, actual: T, message: &str, line: u32) -> bool
    where
        T: PartialEq + Debug,
    {
        let ok = expected == actual;
        self.record.check(ok, message, line);
        if !ok {
            self.record
                .raise_event(&format!("-exp = {:?}", expected), EventKind::Info, line);
            self.record
                .raise_event(&format!("-act = {:?}", actual), EventKind::Info, line);
        }
        ok
    }

    /// Asserts that two floats are within `tolerance` of each other.
    pub fn check_close(
        &mut self,
        expected: f64,
        actual: f64,
        tolerance: f64,
        message: &str,
        line: u32,
    ) -> bool {
        let ok = (expected - actual).abs() <= tolerance.abs();
        self.record.check(ok, message, line);
        if !ok {
            self.record
                .raise_event(&format!("-exp = {}", expected), EventKind::Info, line);
            self.record
                .raise_event(&format!("-act = {}", actual), EventKind::Info, line);
        }
        ok
    }

    /// Asserts that two strings are equal ignoring ASCII case.
    /// 断言两个字符串在忽略 ASCII 大小写时相等。
    pub fn check_str_ic(&mut self, expected: &str, actual: &str, message: &str, line: u32) -> bool {
        let ok = expected.eq_ignore_ascii_case(actual);
        self.record.check(ok, message, line);
        if !ok {
            self.record
                .raise_event(&format!("-exp = {}", expected), EventKind::Info, line);
            self.record
                .raise_event(&format!("-act = {}", actual), EventKind::Info, line);
        }
        ok
    }

    /// Raises an unconditional failure. The test keeps running.
    pub fn fail(&mut self, message: &str, line: u32) {
        self.record.raise_event(message, EventKind::Fail, line);
    }

    /// Raises a warning. A warning degrades a clean pass to a pass with
    /// warnings but never fails the test.
    pub fn warn(&mut self, message: &str, line: u32) {
        self.record.raise_event(message, EventKind::Warn, line);
    }

    /// Raises an error and returns the abort marker. Intended to be used as
    /// `return ctx.error("...", line);` or with `?`.
    ///
    /// 抛出错误并返回中止标记。通常写作 `return ctx.error(...)` 或配合 `?` 使用。
    pub fn error(&mut self, message: &str, line: u32) -> Result<(), TestAbort> {
        self.record.raise_error(message, line, ErrorClass::Raised);
        Err(TestAbort)
    }

    /// Appends an informational message to the event log.
    pub fn print(&mut self, message: &str) {
        self.record.raise_event(message, EventKind::Info, 0);
    }

    /// Blocks the test for the given number of milliseconds, then performs
    /// the time-limit check.
    pub fn sleep_ms(&mut self, ms: u64) {
        crate::infra::time::sleep_ms(ms);
        self.record.raise_event("", EventKind::Info, 0);
    }

    /// Sets the author label shown in reports.
    pub fn set_author(&mut self, author: &str) {
        self.record.set_author(author);
    }

    /// Installs a per-test time limit in milliseconds.
    pub fn set_local_limit(&mut self, ms: u64) {
        self.record.set_local_limit(ms);
    }

    /// Exempts this test from the global time-limit failure.
    pub fn exempt_global_limit(&mut self) {
        self.record.set_local_limit(0);
    }
}
