//! # Runner Module / 运行器模块
//!
//! The orchestrator: owns the registry and the run configuration, selects
//! and orders tests, executes them behind the panic boundary, cascades
//! skips when a suite's setup fails, aggregates statistics and drives the
//! configured reporters.
//!
//! 运行器编排器：拥有注册表和运行配置，选择并排序测试，
//! 在 panic 边界后执行它们，在套件 setup 失败时级联跳过，
//! 聚合统计并驱动已配置的报告器。

use crate::core::model::{Status, NAME_SEP};
use crate::core::ordering;
use crate::core::registry::Registry;
use crate::core::selector;
use crate::infra::fs as report_fs;
use crate::infra::time;
use crate::reporting::{self, ReportStyle, Reporter, RunMeta, RunTotals};
use chrono::{DateTime, Local};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the runner API.
/// 运行器 API 暴露的错误。
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The default runner was re-entered while a run was in progress.
    #[error("a run is already in progress")]
    RunInProgress,

    /// A configuration setter was called during a run.
    #[error("configuration is locked while a run is in progress")]
    ConfigLocked,

    /// Declaration errors aborted the run before any test executed.
    #[error("test declaration errors aborted the run: {0}")]
    Declaration(String),

    /// Writing a report stream failed.
    #[error("report stream failed")]
    Stream(#[from] io::Error),

    /// Writing a report file failed.
    #[error(transparent)]
    Report(#[from] anyhow::Error),
}

/// The aggregate statistics a caller can query after a run.
/// 运行后可查询的聚合统计种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// Matching registered tests. / 匹配的已注册测试数。
    Total,
    /// Tests that ran to completion. / 运行完成的测试数。
    Ran,
    /// Tests that passed, with or without warnings. / 通过的测试数。
    Passed,
    /// Tests that failed assertions. / 断言失败的测试数。
    Failed,
    /// Tests that errored, or the declaration error count when the last
    /// run was aborted by declaration errors.
    Errors,
    /// Tests skipped during the run. / 运行中被跳过的测试数。
    Skipped,
    /// Disabled tests. / 被禁用的测试数。
    Disabled,
    /// Tests that passed with warnings. / 带警告通过的测试数。
    Warnings,
    /// Assertions checked. / 已检查的断言数。
    AssertTotal,
    /// Assertions failed. / 失败的断言数。
    AssertFails,
    /// Whole-percent pass rate over the tests that ran.
    PassRate,
    /// Summed wall-clock duration in milliseconds. / 累计运行毫秒数。
    DurationMs,
}

/// The outcome of a completed run.
/// 一次完成运行的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No registered test matched the selector. / 没有测试匹配选择器。
    RanNone,
    /// The run executed; `failures` counts failed plus errored tests.
    /// 运行已执行；`failures` 为失败与出错测试之和。
    Completed { failures: u32 },
}

impl RunOutcome {
    /// True when the run executed and every test passed.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { failures: 0 })
    }
}

/// A test runner: registry, configuration and the run engine.
/// 测试运行器：注册表、配置与运行引擎。
pub struct Runner {
    registry: Registry,
    project_name: String,
    project_version: String,
    project_description: String,
    global_limit_ms: u64,
    global_warn_ms: u64,
    full_sort: bool,
    default_report: ReportStyle,
    aux_reports: Vec<(ReportStyle, PathBuf)>,
    locked: bool,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
    last_decl_errors: Vec<String>,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            project_name: String::new(),
            project_version: String::new(),
            project_description: String::new(),
            global_limit_ms: 0,
            global_warn_ms: 0,
            full_sort: false,
            default_report: ReportStyle::Console,
            aux_reports: Vec::new(),
            locked: false,
            start_time: None,
            end_time: None,
            last_decl_errors: Vec::new(),
        }
    }

    /// The registry, for declaration and inspection.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access for test declaration.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn guard(&self) -> Result<(), RunnerError> {
        if self.locked {
            Err(RunnerError::ConfigLocked)
        } else {
            Ok(())
        }
    }

    /// Sets the project name shown in report headers.
    pub fn set_project_name(&mut self, name: &str) -> Result<(), RunnerError> {
        self.guard()?;
        self.project_name = name.trim().to_string();
        Ok(())
    }

    /// Sets the project version shown in report headers.
    pub fn set_project_version(&mut self, version: &str) -> Result<(), RunnerError> {
        self.guard()?;
        self.project_version = version.trim().to_string();
        Ok(())
    }

    /// Sets the project description shown in report headers.
    pub fn set_project_description(&mut self, description: &str) -> Result<(), RunnerError> {
        self.guard()?;
        self.project_description = description.trim().to_string();
        Ok(())
    }

    /// Sets the global per-test time limit in milliseconds, 0 for none.
    /// Exceeding it fails the test.
    pub fn set_global_time_limit(&mut self, ms: u64) -> Result<(), RunnerError> {
        self.guard()?;
        self.global_limit_ms = ms;
        Ok(())
    }

    /// Sets the global per-test warning threshold in milliseconds, 0 for
    /// none. Exceeding it raises a warning, not a failure.
    pub fn set_global_time_warning(&mut self, ms: u64) -> Result<(), RunnerError> {
        self.guard()?;
        self.global_warn_ms = ms;
        Ok(())
    }

    /// Enables full name sorting. Without it, registration order is kept
    /// inside each suite bucket.
    pub fn set_sorted(&mut self, sorted: bool) -> Result<(), RunnerError> {
        self.guard()?;
        self.full_sort = sorted;
        Ok(())
    }

    /// Selects the report style streamed to standard output during a run.
    pub fn set_default_report(&mut self, style: ReportStyle) -> Result<(), RunnerError> {
        self.guard()?;
        self.default_report = style;
        Ok(())
    }

    /// Adds a report file generated at the end of each run.
    pub fn add_report(&mut self, style: ReportStyle, path: PathBuf) -> Result<(), RunnerError> {
        self.guard()?;
        self.aux_reports.push((style, path));
        Ok(())
    }

    /// Removes every configured report file.
    pub fn clear_reports(&mut self) -> Result<(), RunnerError> {
        self.guard()?;
        self.aux_reports.clear();
        Ok(())
    }

    /// Enables or disables every test a selector list reaches. Returns the
    /// number of tests affected.
    ///
    /// 启用或禁用选择器列表命中的所有测试。返回受影响的测试数。
    pub fn set_enabled(&mut self, selectors: &str, enabled: bool) -> Result<usize, RunnerError> {
        self.guard()?;
        let patterns = selector::split_list(selectors);
        let mut affected = 0;
        for t in self.registry.tests_mut() {
            if selector::matches_any(&patterns, t.full_name(), t.suite_name(), false)
                && t.record_mut().set_enabled(enabled)
            {
                affected += 1;
            }
        }
        Ok(affected)
    }

    /// True if a test with exactly this fully-qualified name is registered.
    pub fn exists(&self, full_name: &str) -> bool {
        self.registry.exists(full_name)
    }

    /// The status of a single test by its fully-qualified name. Pending
    /// declaration errors dominate: every known test reports the aborted
    /// status until the declarations are fixed.
    pub fn test_status(&self, full_name: &str) -> Option<Status> {
        let test = self.registry.find(full_name)?;
        if !self.registry.declaration_errors().is_empty() {
            return Some(Status::DeclError);
        }
        Some(test.record().status())
    }

    /// Wall-clock start of the last run.
    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    /// Wall-clock end of the last run.
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// Declaration errors as of the last run, empty when it was clean.
    pub fn declaration_errors(&self) -> &[String] {
        &self.last_decl_errors
    }

    /// Wall-clock duration of the last run in milliseconds. While a run is
    /// in progress this is the time elapsed so far.
    pub fn run_duration_ms(&self) -> Option<u64> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or_else(Local::now);
        Some((end - start).num_milliseconds().max(0) as u64)
    }

    /// Aggregates one statistic over the tests a selector list reaches.
    ///
    /// 对选择器列表命中的测试聚合一项统计。
    pub fn statistic_count(&self, kind: StatKind, selectors: &str) -> u64 {
        // Pending declaration errors dominate the error count, whether or
        // not a run has been attempted yet
        if kind == StatKind::Errors {
            let pending = self.registry.declaration_errors();
            if !pending.is_empty() {
                return pending.len() as u64;
            }
            if !self.last_decl_errors.is_empty() {
                return self.last_decl_errors.len() as u64;
            }
        }

        let patterns = selector::split_list(selectors);
        let mut totals = RunTotals::default();
        for t in self.registry.tests() {
            if !selector::matches_any(&patterns, t.full_name(), t.suite_name(), false) {
                continue;
            }
            accumulate(&mut totals, t.record());
        }

        match kind {
            StatKind::Total => totals.total as u64,
            StatKind::Ran => totals.ran as u64,
            StatKind::Passed => totals.passed as u64,
            StatKind::Failed => totals.failed as u64,
            StatKind::Errors => totals.errors as u64,
            StatKind::Skipped => totals.skipped as u64,
            StatKind::Disabled => totals.disabled as u64,
            StatKind::Warnings => totals.warnings as u64,
            StatKind::AssertTotal => totals.asserts as u64,
            StatKind::AssertFails => totals.assert_fails as u64,
            StatKind::PassRate => totals.pass_rate() as u64,
            StatKind::DurationMs => totals.duration_ms,
        }
    }

    /// Runs the tests a selector list reaches and generates the configured
    /// reports.
    ///
    /// Declaration errors abort the run: every test is marked accordingly,
    /// the reports still carry the error list, and the call returns
    /// [`RunnerError::Declaration`]. A selector reaching no test at all
    /// yields [`RunOutcome::RanNone`].
    ///
    /// 运行选择器列表命中的测试并生成已配置的报告。声明错误会中止运行：
    /// 所有测试被相应标记，报告仍携带错误列表，调用返回
    /// [`RunnerError::Declaration`]。选择器未命中任何测试时返回
    /// [`RunOutcome::RanNone`]。
    pub fn run(&mut self, selectors: &str) -> Result<RunOutcome, RunnerError> {
        if self.locked {
            return Err(RunnerError::RunInProgress);
        }
        self.locked = true;
        let rslt = self.run_inner(selectors);
        self.locked = false;
        rslt
    }

    fn run_inner(&mut self, selectors: &str) -> Result<RunOutcome, RunnerError> {
        self.start_time = Some(Local::now());
        self.end_time = None;
        self.last_decl_errors = self.registry.declaration_errors();

        self.registry.clear_results();

        if !self.last_decl_errors.is_empty() {
            for t in self.registry.tests_mut() {
                t.record_mut().set_decl_error();
            }
            let meta = self.meta();
            let mut totals = RunTotals {
                total: self.registry.len() as u32,
                errors: self.last_decl_errors.len() as u32,
                ..RunTotals::default()
            };
            self.end_time = Some(Local::now());
            totals.duration_ms = 0;
            self.emit_reports(&meta, &[], &totals)?;
            return Err(RunnerError::Declaration(self.last_decl_errors.join("; ")));
        }

        let patterns = selector::split_list(selectors);
        let order = ordering::execution_order(self.registry.tests(), self.full_sort);
        let selected: Vec<usize> = order
            .into_iter()
            .filter(|&i| {
                let t = &self.registry.tests()[i];
                selector::matches_any(&patterns, t.full_name(), t.suite_name(), false)
            })
            .collect();

        if selected.is_empty() {
            let meta = self.meta();
            self.end_time = Some(Local::now());
            self.emit_reports(&meta, &[], &RunTotals::default())?;
            return Ok(RunOutcome::RanNone);
        }

        let meta = self.meta();
        let totals = match reporting::make_reporter(self.default_report) {
            Some(mut reporter) => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                self.run_selected(&selected, &meta, Some((reporter.as_mut(), &mut out)))?
            }
            None => self.run_selected(&selected, &meta, None)?,
        };
        self.end_time = Some(Local::now());

        self.emit_file_reports(&meta, &selected, &totals)?;

        if totals.ran == 0 {
            return Ok(RunOutcome::RanNone);
        }
        Ok(RunOutcome::Completed {
            failures: totals.failed + totals.errors,
        })
    }

    /// Executes the selected tests in order. Each finished test is streamed
    /// to the default reporter as the loop progresses, so a watching console
    /// sees results live rather than after the run.
    ///
    /// 按顺序执行选中的测试。每个完成的测试在循环中即时流向默认报告器，
    /// 控制台可以实时看到结果，而不是等运行结束。
    fn run_selected(
        &mut self,
        selected: &[usize],
        meta: &RunMeta,
        mut stream: Option<(&mut dyn Reporter, &mut dyn io::Write)>,
    ) -> Result<RunTotals, RunnerError> {
        if let Some((reporter, out)) = stream.as_mut() {
            reporter.begin(&mut **out, meta)?;
        }

        let started = std::time::Instant::now();
        for pos in 0..selected.len() {
            let idx = selected[pos];
            let (limit, warn) = (self.global_limit_ms, self.global_warn_ms);
            let test = &mut self.registry.tests_mut()[idx];
            test.run(limit, warn);

            // A failed setup poisons its suite and everything below it
            if test.is_setup() && test.record().has_failed() {
                let mut pattern = self.registry.tests()[idx].suite_name().to_string();
                pattern.push_str(NAME_SEP);
                pattern.push('*');
                for &later in &selected[pos + 1..] {
                    let t = &mut self.registry.tests_mut()[later];
                    if selector::name_matches(&pattern, t.full_name(), t.suite_name(), false)
                        && t.record().is_enabled()
                    {
                        t.record_mut().set_skipped();
                    }
                }
            }

            if let Some((reporter, out)) = stream.as_mut() {
                reporter.report_test(&mut **out, &self.registry.tests()[idx])?;
            }
        }

        let mut totals = RunTotals::default();
        for &idx in selected {
            accumulate(&mut totals, self.registry.tests()[idx].record());
        }
        totals.duration_ms = started.elapsed().as_millis() as u64;

        if let Some((reporter, out)) = stream.as_mut() {
            reporter.end(&mut **out, &totals)?;
        }
        Ok(totals)
    }

    /// Drives every configured reporter over a run that executed no test:
    /// the default style to standard output, then each report file.
    fn emit_reports(
        &self,
        meta: &RunMeta,
        selected: &[usize],
        totals: &RunTotals,
    ) -> Result<(), RunnerError> {
        if let Some(mut reporter) = reporting::make_reporter(self.default_report) {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            self.drive(reporter.as_mut(), &mut out, meta, selected, totals)?;
        }
        self.emit_file_reports(meta, selected, totals)
    }

    /// Renders each configured report file over the finished run.
    fn emit_file_reports(
        &self,
        meta: &RunMeta,
        selected: &[usize],
        totals: &RunTotals,
    ) -> Result<(), RunnerError> {
        for (style, path) in &self.aux_reports {
            let Some(mut reporter) = reporting::make_reporter(*style) else {
                continue;
            };
            let mut buf: Vec<u8> = Vec::new();
            self.drive(reporter.as_mut(), &mut buf, meta, selected, totals)?;
            report_fs::write_report(path, &buf)?;
        }
        Ok(())
    }

    fn drive(
        &self,
        reporter: &mut dyn Reporter,
        out: &mut dyn io::Write,
        meta: &RunMeta,
        selected: &[usize],
        totals: &RunTotals,
    ) -> Result<(), RunnerError> {
        reporter.begin(out, meta)?;
        for &idx in selected {
            reporter.report_test(out, &self.registry.tests()[idx])?;
        }
        reporter.end(out, totals)?;
        Ok(())
    }

    fn meta(&self) -> RunMeta {
        RunMeta {
            project_name: self.project_name.clone(),
            project_version: self.project_version.clone(),
            project_description: self.project_description.clone(),
            hostname: time::hostname(),
            start_time: self.start_time.unwrap_or_else(Local::now),
            registered: self.registry.len(),
            decl_errors: self.last_decl_errors.clone(),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds one test's record into the totals.
fn accumulate(totals: &mut RunTotals, record: &crate::core::record::RunRecord) {
    totals.total += 1;
    match record.status() {
        Status::PassOk => {
            totals.ran += 1;
            totals.passed += 1;
        }
        Status::PassWarn => {
            totals.ran += 1;
            totals.passed += 1;
            totals.warnings += 1;
        }
        Status::Failed => {
            totals.ran += 1;
            totals.failed += 1;
        }
        Status::Error => {
            totals.ran += 1;
            totals.errors += 1;
        }
        Status::Skipped => totals.skipped += 1,
        Status::Disabled => totals.disabled += 1,
        Status::Ready | Status::DeclError => {}
    }
    totals.asserts += record.assert_total();
    totals.assert_fails += record.assert_fails();
    totals.duration_ms += record.duration_ms();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decl::TestDef;
    use crate::core::model::TestDescriptor;
    use std::sync::{Arc, Mutex};

    /// Appends one line per reporter callback to a shared log.
    struct TraceReporter(Arc<Mutex<Vec<String>>>);

    impl Reporter for TraceReporter {
        fn begin(&mut self, _out: &mut dyn io::Write, _meta: &RunMeta) -> io::Result<()> {
            self.0.lock().unwrap().push("begin".to_string());
            Ok(())
        }

        fn report_test(
            &mut self,
            _out: &mut dyn io::Write,
            test: &TestDescriptor,
        ) -> io::Result<()> {
            self.0
                .lock()
                .unwrap()
                .push(format!("report {}", test.full_name()));
            Ok(())
        }

        fn end(&mut self, _out: &mut dyn io::Write, _totals: &RunTotals) -> io::Result<()> {
            self.0.lock().unwrap().push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn results_stream_to_the_reporter_between_tests() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = Runner::new();
        for name in ["first", "second"] {
            let body_log = Arc::clone(&log);
            TestDef::new(name)
                .body(move |_| {
                    body_log.lock().unwrap().push(format!("run {}", name));
                    Ok(())
                })
                .register(runner.registry_mut());
        }

        let meta = runner.meta();
        let mut reporter = TraceReporter(Arc::clone(&log));
        let mut sink: Vec<u8> = Vec::new();
        let totals = runner
            .run_selected(&[0, 1], &meta, Some((&mut reporter, &mut sink)))
            .unwrap();

        assert_eq!(totals.ran, 2);
        // Each test is reported as soon as it finishes, not after the loop
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "begin",
                "run first",
                "report first",
                "run second",
                "report second",
                "end"
            ]
        );
    }
}
