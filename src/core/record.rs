//! # Run Record Module / 运行记录模块
//!
//! Every test descriptor owns exactly one run record: the mutable outcome
//! state of its most recent execution. The record is a small state machine
//! driven by events raised from the test body, with latched time-limit
//! checks folded into every transition.
//!
//! 每个测试描述符恰好拥有一个运行记录：最近一次执行的可变结果状态。
//! 记录是一个由测试主体产生的事件驱动的小型状态机，
//! 每次状态转换都包含带闩锁的时限检查。

use crate::core::model::{ErrorClass, Event, EventKind, Status};
use chrono::{DateTime, Local};
use std::time::Instant;

/// The measured wall-clock duration of a test.
/// 测试的实际运行时长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationState {
    /// The test has not run. / 测试尚未运行。
    NotRun,
    /// The test is currently running. / 测试正在运行。
    Running,
    /// The test finished with this duration in milliseconds.
    /// 测试已结束，时长以毫秒计。
    Done(u64),
}

/// The mutable run outcome of a single test.
/// 单个测试的可变运行结果。
pub struct RunRecord {
    enabled: bool,
    status: Status,
    events: Vec<Event>,
    assert_total: u32,
    assert_fails: u32,
    start_time: Option<DateTime<Local>>,
    started: Option<Instant>,
    duration: DurationState,
    error_class: Option<ErrorClass>,
    author: String,

    // Time limits. The local limit overrides the global failure limit; a
    // local value of 0 exempts the test. The warning threshold is always
    // the global one.
    local_limit_ms: Option<u64>,
    global_limit_ms: u64,
    global_warn_ms: u64,
    limit_latched: bool,
    warn_latched: bool,
}

impl RunRecord {
    pub(crate) fn new() -> Self {
        Self {
            enabled: true,
            status: Status::Ready,
            events: Vec::new(),
            assert_total: 0,
            assert_fails: 0,
            start_time: None,
            started: None,
            duration: DurationState::NotRun,
            error_class: None,
            author: String::new(),
            local_limit_ms: None,
            global_limit_ms: 0,
            global_warn_ms: 0,
            limit_latched: false,
            warn_latched: false,
        }
    }

    /// The effective status. A disabled test reports [`Status::Disabled`]
    /// regardless of its internal state.
    pub fn status(&self) -> Status {
        if !self.enabled && self.status == Status::Ready {
            Status::Disabled
        } else {
            self.status
        }
    }

    /// True if the test ran to completion in the last run.
    pub fn has_ran(&self) -> bool {
        matches!(
            self.status(),
            Status::PassOk | Status::PassWarn | Status::Failed | Status::Error
        )
    }

    /// True if the last run passed, with or without warnings.
    pub fn has_passed(&self) -> bool {
        matches!(self.status(), Status::PassOk | Status::PassWarn)
    }

    /// True if the last run failed an assertion or errored.
    pub fn has_failed(&self) -> bool {
        matches!(self.status(), Status::Failed | Status::Error)
    }

    /// The ordered event log of the last run.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Total assertions checked in the last run.
    pub fn assert_total(&self) -> u32 {
        self.assert_total
    }

    /// Failed assertions in the last run.
    pub fn assert_fails(&self) -> u32 {
        self.assert_fails
    }

    /// Wall-clock start of the last run, if any.
    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    /// The measured duration state.
    pub fn duration(&self) -> DurationState {
        self.duration
    }

    /// Finished duration in milliseconds, 0 when the test has not finished.
    pub fn duration_ms(&self) -> u64 {
        match self.duration {
            DurationState::Done(ms) => ms,
            _ => 0,
        }
    }

    /// Classification of the error, when the status is [`Status::Error`].
    pub fn error_class(&self) -> Option<ErrorClass> {
        self.error_class
    }

    /// The test author label, empty when never set.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub(crate) fn set_author(&mut self, author: &str) {
        self.author = author.trim().to_string();
    }

    /// Whether the test is enabled. / 测试是否启用。
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles the enabled flag. Disabling discards any previous result, so
    /// the test reports [`Status::Disabled`]; re-enabling returns it to
    /// [`Status::Ready`]. Returns true when the flag actually changed.
    pub(crate) fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        if !enabled {
            self.clear();
        }
        self.enabled = enabled;
        true
    }

    /// Marks the test as skipped before execution. The author label and any
    /// already-measured duration survive, everything else is cleared.
    pub(crate) fn set_skipped(&mut self) {
        self.events.clear();
        self.assert_total = 0;
        self.assert_fails = 0;
        self.error_class = None;
        self.status = Status::Skipped;
    }

    /// Marks the test as a victim of declaration errors.
    pub(crate) fn set_decl_error(&mut self) {
        self.status = Status::DeclError;
    }

    /// Resets the record to [`Status::Ready`]. The enabled flag and the
    /// author label survive.
    pub(crate) fn clear(&mut self) {
        self.status = Status::Ready;
        self.events.clear();
        self.assert_total = 0;
        self.assert_fails = 0;
        self.start_time = None;
        self.started = None;
        self.duration = DurationState::NotRun;
        self.error_class = None;
        self.local_limit_ms = None;
        self.limit_latched = false;
        self.warn_latched = false;
    }

    /// Transitions into the running state. Returns false when the test must
    /// not execute (disabled, or pre-marked skipped).
    pub(crate) fn start(&mut self, global_limit_ms: u64, global_warn_ms: u64) -> bool {
        if !self.enabled || self.status == Status::Skipped {
            return false;
        }
        self.status = Status::Ready;
        self.events.clear();
        self.assert_total = 0;
        self.assert_fails = 0;
        self.error_class = None;
        self.local_limit_ms = None;
        self.limit_latched = false;
        self.warn_latched = false;
        self.global_limit_ms = global_limit_ms;
        self.global_warn_ms = global_warn_ms;
        self.start_time = Some(Local::now());
        self.started = Some(Instant::now());
        self.duration = DurationState::Running;
        true
    }

    /// Finalizes the record after the body returned or was unwound. A run
    /// that never raised a failure or error settles as a pass.
    pub(crate) fn stop(&mut self) {
        if self.duration != DurationState::Running {
            return;
        }
        // An overrun must be caught even when the body raised no event
        self.check_time_limit();
        let ms = self
            .started
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.duration = DurationState::Done(ms);
        if self.status == Status::Ready {
            self.status = Status::PassOk;
        }
    }

    /// Raises an event against the record, updating the status and then
    /// performing the latched time-limit check.
    ///
    /// 向记录抛出一个事件，更新状态，然后执行带闩锁的时限检查。
    pub(crate) fn raise_event(&mut self, message: &str, kind: EventKind, line: u32) {
        self.push_event(message, kind, line);
        self.check_time_limit();
    }

    /// Raises an error with a classification. The status is error from here
    /// on and cannot improve.
    pub(crate) fn raise_error(&mut self, message: &str, line: u32, class: ErrorClass) {
        self.error_class = Some(class);
        self.push_event(message, EventKind::Error, line);
    }

    /// Records one assertion outcome. Passing checks log only their event;
    /// failing checks also degrade the status.
    pub(crate) fn check(&mut self, ok: bool, message: &str, line: u32) -> bool {
        self.assert_total += 1;
        if ok {
            self.raise_event(message, EventKind::Pass, line);
        } else {
            self.assert_fails += 1;
            self.raise_event(message, EventKind::Fail, line);
        }
        ok
    }

    /// Installs a per-test time limit in milliseconds, 0 to exempt the test.
    /// The global failure limit no longer applies to this test; the global
    /// warning threshold still does.
    pub(crate) fn set_local_limit(&mut self, ms: u64) {
        self.local_limit_ms = Some(ms);
        self.global_limit_ms = 0;
        self.check_time_limit();
    }

    fn push_event(&mut self, message: &str, kind: EventKind, line: u32) {
        let message = message.trim();
        match kind {
            EventKind::Error => self.status = Status::Error,
            EventKind::Fail => {
                if self.status != Status::Error {
                    self.status = Status::Failed;
                }
            }
            EventKind::Warn => {
                if self.status == Status::Ready {
                    self.status = Status::PassWarn;
                }
            }
            EventKind::Info | EventKind::Pass => {}
        }
        // Empty info and pass entries carry no information worth keeping
        if !message.is_empty() || !matches!(kind, EventKind::Info | EventKind::Pass) {
            self.events.push(Event {
                message: message.to_string(),
                kind,
                line,
            });
        }
    }

    /// Compares the elapsed time against the limits. Each limit fires at
    /// most once per run.
    fn check_time_limit(&mut self) {
        let Some(started) = self.started else {
            return;
        };
        let elapsed = started.elapsed().as_millis() as u64;

        let limit = self.local_limit_ms.unwrap_or(self.global_limit_ms);
        if limit > 0 && elapsed > limit && !self.limit_latched {
            self.limit_latched = true;
            self.push_event(
                &format!("time limit of {} ms exceeded", limit),
                EventKind::Fail,
                0,
            );
            self.assert_total += 1;
            self.assert_fails += 1;
        }

        if self.global_warn_ms > 0 && elapsed > self.global_warn_ms && !self.warn_latched {
            self.warn_latched = true;
            self.push_event(
                &format!("time warning of {} ms exceeded", self.global_warn_ms),
                EventKind::Warn,
                0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_ready() {
        let r = RunRecord::new();
        assert_eq!(r.status(), Status::Ready);
        assert_eq!(r.duration(), DurationState::NotRun);
        assert!(!r.has_ran());
    }

    #[test]
    fn disabled_record_reports_disabled_and_refuses_to_start() {
        let mut r = RunRecord::new();
        r.set_enabled(false);
        assert_eq!(r.status(), Status::Disabled);
        assert!(!r.start(0, 0));
    }

    #[test]
    fn clean_run_settles_as_pass_ok() {
        let mut r = RunRecord::new();
        assert!(r.start(0, 0));
        r.check(true, "one", 0);
        r.stop();
        assert_eq!(r.status(), Status::PassOk);
        assert_eq!(r.assert_total(), 1);
        assert_eq!(r.assert_fails(), 0);
        assert!(matches!(r.duration(), DurationState::Done(_)));
    }

    #[test]
    fn warning_yields_pass_warn_but_failure_wins() {
        let mut r = RunRecord::new();
        r.start(0, 0);
        r.raise_event("looks odd", EventKind::Warn, 0);
        r.stop();
        assert_eq!(r.status(), Status::PassWarn);

        let mut r = RunRecord::new();
        r.start(0, 0);
        r.raise_event("looks odd", EventKind::Warn, 0);
        r.check(false, "boom", 0);
        r.stop();
        assert_eq!(r.status(), Status::Failed);
    }

    #[test]
    fn error_status_cannot_improve() {
        let mut r = RunRecord::new();
        r.start(0, 0);
        r.raise_error("bad", 0, ErrorClass::Raised);
        r.check(false, "later failure", 0);
        r.stop();
        assert_eq!(r.status(), Status::Error);
        assert_eq!(r.error_class(), Some(ErrorClass::Raised));
    }

    #[test]
    fn empty_info_and_pass_events_are_dropped() {
        let mut r = RunRecord::new();
        r.start(0, 0);
        r.raise_event("", EventKind::Info, 0);
        r.check(true, "", 0);
        r.raise_event("", EventKind::Fail, 0);
        r.stop();
        assert_eq!(r.events().len(), 1);
        assert_eq!(r.events()[0].kind, EventKind::Fail);
    }

    #[test]
    fn skipped_keeps_author() {
        let mut r = RunRecord::new();
        r.set_author("  ann  ");
        r.set_skipped();
        assert_eq!(r.status(), Status::Skipped);
        assert_eq!(r.author(), "ann");
        assert!(!r.start(0, 0));
    }

    #[test]
    fn local_limit_zeroes_global_failure_limit() {
        let mut r = RunRecord::new();
        r.start(1, 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        r.set_local_limit(10_000);
        r.check(true, "fine", 0);
        r.stop();
        // Without the local limit the 1 ms global limit would have failed it
        assert_eq!(r.status(), Status::PassOk);
    }

    #[test]
    fn silent_overrun_is_caught_at_stop() {
        let mut r = RunRecord::new();
        r.start(10, 0);
        std::thread::sleep(std::time::Duration::from_millis(30));
        // No event was raised while running, stop must still check the limit
        r.stop();
        assert_eq!(r.status(), Status::Failed);
        assert!(r.events().iter().any(|e| e.message.contains("time limit")));
    }

    #[test]
    fn disabling_discards_the_previous_result() {
        let mut r = RunRecord::new();
        r.start(0, 0);
        r.check(true, "fine", 0);
        r.stop();
        assert_eq!(r.status(), Status::PassOk);

        assert!(r.set_enabled(false));
        assert_eq!(r.status(), Status::Disabled);
        assert_eq!(r.assert_total(), 0);
        assert!(r.events().is_empty());

        assert!(r.set_enabled(true));
        assert_eq!(r.status(), Status::Ready);
        // A no-op toggle reports no change
        assert!(!r.set_enabled(true));
    }

    #[test]
    fn has_failed_covers_failures_and_errors() {
        let mut r = RunRecord::new();
        r.start(0, 0);
        r.check(false, "broken", 0);
        r.stop();
        assert!(r.has_failed());

        let mut r = RunRecord::new();
        r.start(0, 0);
        r.raise_error("bad", 0, ErrorClass::Raised);
        r.stop();
        assert!(r.has_failed());

        let mut r = RunRecord::new();
        r.start(0, 0);
        r.stop();
        assert!(!r.has_failed());
    }

    #[test]
    fn time_limit_fires_once() {
        let mut r = RunRecord::new();
        r.start(1, 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        r.raise_event("tick", EventKind::Info, 0);
        r.raise_event("tock", EventKind::Info, 0);
        r.stop();
        assert_eq!(r.status(), Status::Failed);
        let fails: Vec<_> = r
            .events()
            .iter()
            .filter(|e| e.kind == EventKind::Fail)
            .collect();
        assert_eq!(fails.len(), 1);
    }
}
