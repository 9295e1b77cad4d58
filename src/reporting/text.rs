//! # Text Reporting Module / 文本报告模块
//!
//! Plain text rendering, suitable for log files and terminals without
//! color support. The summary variant prints only tests that did not
//! pass; the verbose variant prints every test with its full event log.
//!
//! 纯文本渲染，适合日志文件和不支持颜色的终端。摘要变体只打印
//! 未通过的测试；详细变体打印每个测试及其完整事件日志。

use crate::core::model::{EventKind, Status, TestDescriptor};
use crate::infra::time;
use crate::reporting::{Reporter, RunMeta, RunTotals};
use std::io;

/// Plain text renderer. / 纯文本渲染器。
pub struct TextReporter {
    verbose: bool,
}

impl TextReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn write_test(
        &self,
        out: &mut dyn io::Write,
        test: &TestDescriptor,
    ) -> io::Result<()> {
        let record = test.record();
        let duration = if record.has_ran() {
            format!(", {} s", time::duration_secs_str(record.duration_ms()))
        } else {
            String::new()
        };
        writeln!(
            out,
            "{}: {} [{}{}]",
            test.kind().label(),
            test.full_name(),
            record.status().label(),
            duration
        )?;

        if !record.author().is_empty() {
            writeln!(out, "  author: {}", record.author())?;
        }
        if !test.file_location().is_empty() && (self.verbose || record.status() != Status::PassOk) {
            writeln!(out, "  declared: {}", test.file_location())?;
        }
        if self.verbose {
            if let Some(start) = record.start_time() {
                writeln!(out, "  started: {}", time::local_time_str(start))?;
            }
            if !test.user_type().is_empty() {
                writeln!(out, "  type: {}", test.user_type())?;
            }
            if !test.repeat_type().is_empty() {
                writeln!(out, "  repeat: {}", test.repeat_type())?;
            }
        }

        for event in record.events() {
            if !self.verbose && matches!(event.kind, EventKind::Info | EventKind::Pass) {
                continue;
            }
            let label = event.kind.label();
            let sep = if label.is_empty() { "" } else { ": " };
            if event.line > 0 {
                writeln!(out, "  {}{}{} [{}]", label, sep, event.message, event.line)?;
            } else {
                writeln!(out, "  {}{}{}", label, sep, event.message)?;
            }
        }
        Ok(())
    }
}

impl Reporter for TextReporter {
    fn begin(&mut self, out: &mut dyn io::Write, meta: &RunMeta) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(72))?;
        writeln!(
            out,
            "TEST RUN: {}",
            if meta.project_name.is_empty() {
                "(unnamed project)"
            } else {
                &meta.project_name
            }
        )?;
        if !meta.project_version.is_empty() {
            writeln!(out, "Version : {}", meta.project_version)?;
        }
        if !meta.project_description.is_empty() {
            writeln!(out, "About   : {}", meta.project_description)?;
        }
        writeln!(out, "Host    : {}", meta.hostname)?;
        writeln!(out, "Started : {}", time::local_time_str(meta.start_time))?;
        writeln!(out, "Tests   : {} registered", meta.registered)?;
        writeln!(out, "{}", "=".repeat(72))?;

        if !meta.decl_errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "TEST DECLARATION ERRORS:")?;
            for err in &meta.decl_errors {
                writeln!(out, "  - {}", err)?;
            }
        }
        writeln!(out)
    }

    fn report_test(&mut self, out: &mut dyn io::Write, test: &TestDescriptor) -> io::Result<()> {
        let record = test.record();
        // The summary variant lists only what needs attention
        let noteworthy = matches!(
            record.status(),
            Status::PassWarn | Status::Failed | Status::Error | Status::Skipped | Status::Disabled
        );
        if self.verbose || noteworthy {
            self.write_test(out, test)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn end(&mut self, out: &mut dyn io::Write, totals: &RunTotals) -> io::Result<()> {
        writeln!(out, "{}", "-".repeat(72))?;
        writeln!(out, "TOTAL    : {}", totals.total)?;
        writeln!(out, "RAN      : {}", totals.ran)?;
        writeln!(out, "PASSED   : {}", totals.passed)?;
        writeln!(out, "WARNINGS : {}", totals.warnings)?;
        writeln!(out, "FAILED   : {}", totals.failed)?;
        writeln!(out, "ERRORS   : {}", totals.errors)?;
        writeln!(out, "SKIPPED  : {}", totals.skipped)?;
        writeln!(out, "DISABLED : {}", totals.disabled)?;
        writeln!(
            out,
            "ASSERTS  : {} ({} failed)",
            totals.asserts, totals.assert_fails
        )?;
        writeln!(
            out,
            "DURATION : {} s",
            time::duration_secs_str(totals.duration_ms)
        )?;
        let verdict = if totals.ran == 0 {
            "NO TESTS RAN".to_string()
        } else {
            format!("PASS RATE {}%", totals.pass_rate())
        };
        writeln!(out, "RESULT   : {}", verdict)?;
        writeln!(out, "{}", "-".repeat(72))
    }
}
