//! # Console Reporting Module / 控制台报告模块
//!
//! The default renderer: one colored line per test as it finishes, a
//! failure detail block for anything that did not pass, and a short
//! totals banner at the end.
//!
//! 默认渲染器：每个测试完成时输出一行彩色结果，未通过的测试附带
//! 失败详情块，最后输出简短的总计横幅。

use crate::core::model::{EventKind, Status, TestDescriptor};
use crate::infra::time;
use crate::reporting::{Reporter, RunMeta, RunTotals};
use colored::Colorize;
use std::io::{self, Write};

/// Colored per-test console output.
/// 彩色的每测试控制台输出。
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn begin(&mut self, out: &mut dyn io::Write, meta: &RunMeta) -> io::Result<()> {
        let title = if meta.project_name.is_empty() {
            "Test Run".to_string()
        } else if meta.project_version.is_empty() {
            format!("Test Run: {}", meta.project_name)
        } else {
            format!("Test Run: {} {}", meta.project_name, meta.project_version)
        };
        writeln!(out, "{}", title.bold())?;
        writeln!(
            out,
            "{}",
            format!(
                "Started {} on {}",
                time::local_time_str(meta.start_time),
                meta.hostname
            )
            .dimmed()
        )?;
        writeln!(out, "{}", "-".repeat(72))?;

        if !meta.decl_errors.is_empty() {
            writeln!(out, "{}", "TEST DECLARATION ERRORS".red().bold())?;
            for err in &meta.decl_errors {
                writeln!(out, "  - {}", err.red())?;
            }
        }
        Ok(())
    }

    fn report_test(&mut self, out: &mut dyn io::Write, test: &TestDescriptor) -> io::Result<()> {
        let record = test.record();
        let status = record.status();
        let status_colored = match status {
            Status::PassOk => status.label().green(),
            Status::PassWarn => status.label().yellow(),
            Status::Failed | Status::Error | Status::DeclError => status.label().red(),
            Status::Skipped | Status::Disabled | Status::Ready => status.label().dimmed(),
        };
        let duration_str = if record.has_ran() {
            format!("{} s", time::duration_secs_str(record.duration_ms()))
        } else {
            "N/A".to_string()
        };

        writeln!(
            out,
            "  - {:<12} | {:<40} | {:>10}",
            status_colored,
            test.full_name(),
            duration_str
        )?;

        // Event details only for tests that ran and did not pass cleanly
        if record.has_ran() && status != Status::PassOk {
            for event in record.events() {
                if matches!(event.kind, EventKind::Info | EventKind::Pass) {
                    continue;
                }
                let line = if event.line > 0 {
                    format!(" [{}]", event.line)
                } else {
                    String::new()
                };
                let detail = format!("      {}: {}{}", event.kind.label(), event.message, line);
                let detail = match event.kind {
                    EventKind::Warn => detail.yellow(),
                    _ => detail.red(),
                };
                writeln!(out, "{}", detail)?;
            }
        }
        Ok(())
    }

    fn end(&mut self, out: &mut dyn io::Write, totals: &RunTotals) -> io::Result<()> {
        writeln!(out, "{}", "-".repeat(72))?;
        if totals.ran == 0 {
            writeln!(out, "{}", "NO TESTS RAN".yellow().bold())?;
            return Ok(());
        }

        let verdict = if totals.failed + totals.errors > 0 {
            format!("FAILED ({} of {} tests)", totals.failed + totals.errors, totals.ran).red()
        } else if totals.warnings > 0 {
            format!("PASSED with {} warning(s)", totals.warnings).yellow()
        } else {
            "PASSED".green()
        };
        writeln!(out, "{}", verdict.bold())?;
        writeln!(
            out,
            "Ran {} of {} tests, pass rate {}%, {} s",
            totals.ran,
            totals.total,
            totals.pass_rate(),
            time::duration_secs_str(totals.duration_ms)
        )?;
        if totals.skipped + totals.disabled > 0 {
            writeln!(
                out,
                "{}",
                format!(
                    "Skipped {}, disabled {}",
                    totals.skipped, totals.disabled
                )
                .dimmed()
            )?;
        }
        out.flush()
    }
}
