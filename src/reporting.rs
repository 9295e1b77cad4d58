//! # Reporting Module / 报告模块
//!
//! The reporter contract and the built-in renderers. A reporter receives
//! the run header once, each finished test in execution order, and the
//! aggregated totals at the end. Renderers that need the whole picture
//! before emitting anything (the JUnit XML one) buffer internally and
//! write everything from `end`.
//!
//! 报告器契约和内置渲染器。报告器依次接收运行头、按执行顺序
//! 完成的每个测试，以及最后的聚合总计。需要完整信息才能输出的
//! 渲染器（JUnit XML）在内部缓冲并在 `end` 时一次性写出。

pub mod console;
pub mod html;
pub mod text;
pub mod xml;

use crate::core::model::TestDescriptor;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;

/// The built-in report renderer styles.
/// 内置报告渲染器风格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStyle {
    /// No output at all. / 完全不输出。
    None,
    /// Colored per-test console lines. / 彩色的每测试控制台行。
    Console,
    /// Plain text, failures and totals only. / 纯文本，仅失败与总计。
    TextSummary,
    /// Plain text with every test's event log. / 含所有事件日志的纯文本。
    TextVerbose,
    /// Standalone HTML page, failures and totals only.
    HtmlSummary,
    /// Standalone HTML page with every test's event log.
    HtmlVerbose,
    /// JUnit-compatible XML for CI consumers. / 供 CI 消费的 JUnit 兼容 XML。
    JunitXml,
}

impl ReportStyle {
    /// True for the styles that include passing tests' event logs.
    pub fn is_verbose(&self) -> bool {
        matches!(self, ReportStyle::TextVerbose | ReportStyle::HtmlVerbose)
    }

    /// The conventional file extension for this style.
    pub fn file_extension(&self) -> &'static str {
        match self {
            ReportStyle::None | ReportStyle::Console => "txt",
            ReportStyle::TextSummary | ReportStyle::TextVerbose => "txt",
            ReportStyle::HtmlSummary | ReportStyle::HtmlVerbose => "html",
            ReportStyle::JunitXml => "xml",
        }
    }
}

/// Immutable facts about the run, available before any test executes.
/// 运行的不可变事实，在任何测试执行前即可得到。
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub project_name: String,
    pub project_version: String,
    pub project_description: String,
    pub hostname: String,
    pub start_time: DateTime<Local>,
    /// Number of registered tests, whether or not they were selected.
    pub registered: usize,
    /// Declaration errors. A non-empty list means the run was aborted.
    pub decl_errors: Vec<String>,
}

/// Aggregated counters over the finished run.
/// 已完成运行的聚合计数。
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub total: u32,
    pub ran: u32,
    pub passed: u32,
    pub warnings: u32,
    pub failed: u32,
    pub errors: u32,
    pub skipped: u32,
    pub disabled: u32,
    pub asserts: u32,
    pub assert_fails: u32,
    pub duration_ms: u64,
}

impl RunTotals {
    /// Pass rate in whole percent over the tests that ran, 0 when none ran.
    pub fn pass_rate(&self) -> u32 {
        if self.ran == 0 {
            0
        } else {
            100 * self.passed / self.ran
        }
    }
}

/// The streaming contract between the runner and a renderer.
///
/// 运行器与渲染器之间的流式契约。
pub trait Reporter {
    /// Called once before any test executes.
    fn begin(&mut self, out: &mut dyn io::Write, meta: &RunMeta) -> io::Result<()>;

    /// Called once per selected test, in execution order, after the test
    /// has finished (or was skipped or disabled).
    fn report_test(&mut self, out: &mut dyn io::Write, test: &TestDescriptor) -> io::Result<()>;

    /// Called once after the last test with the aggregated totals.
    fn end(&mut self, out: &mut dyn io::Write, totals: &RunTotals) -> io::Result<()>;
}

/// Instantiates the renderer for a style, or `None` for the silent style.
pub fn make_reporter(style: ReportStyle) -> Option<Box<dyn Reporter>> {
    match style {
        ReportStyle::None => None,
        ReportStyle::Console => Some(Box::new(console::ConsoleReporter::new())),
        ReportStyle::TextSummary => Some(Box::new(text::TextReporter::new(false))),
        ReportStyle::TextVerbose => Some(Box::new(text::TextReporter::new(true))),
        ReportStyle::HtmlSummary => Some(Box::new(html::HtmlReporter::new(false))),
        ReportStyle::HtmlVerbose => Some(Box::new(html::HtmlReporter::new(true))),
        ReportStyle::JunitXml => Some(Box::new(xml::XmlReporter::new())),
    }
}
