//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a self-contained HTML page: header with project identity,
//! summary counters, a results table, and (in the verbose variant) the
//! event log of every test. Styles are embedded so the file can be
//! opened or mailed on its own.
//!
//! 渲染自包含的 HTML 页面：含项目信息的页头、摘要计数、结果表格，
//! 以及（详细变体中）每个测试的事件日志。样式内嵌，
//! 文件可以单独打开或发送。

use crate::core::model::{EventKind, Status, TestDescriptor};
use crate::infra::time;
use crate::reporting::{Reporter, RunMeta, RunTotals};
use std::io;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Standalone HTML page renderer. The whole page is assembled in memory
/// and written at the end of the run.
pub struct HtmlReporter {
    verbose: bool,
    meta: Option<RunMeta>,
    rows: String,
    details: String,
}

impl HtmlReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            meta: None,
            rows: String::new(),
            details: String::new(),
        }
    }
}

impl Reporter for HtmlReporter {
    fn begin(&mut self, _out: &mut dyn io::Write, meta: &RunMeta) -> io::Result<()> {
        self.meta = Some(meta.clone());
        Ok(())
    }

    fn report_test(&mut self, _out: &mut dyn io::Write, test: &TestDescriptor) -> io::Result<()> {
        let record = test.record();
        let status = record.status();
        let class = status_class(status);
        let duration = if record.has_ran() {
            format!("{} s", time::duration_secs_str(record.duration_ms()))
        } else {
            "N/A".to_string()
        };

        self.rows.push_str(&format!(
            "<tr class='{}'><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            class,
            escape_html(test.full_name()),
            test.kind().label(),
            escape_html(&status.label().to_string()),
            duration,
            escape_html(record.author()),
        ));

        // Detail blocks for verbose pages, and always for problem tests
        let noteworthy = matches!(
            status,
            Status::PassWarn | Status::Failed | Status::Error | Status::Skipped
        );
        if (self.verbose || noteworthy) && !record.events().is_empty() {
            self.details.push_str(&format!(
                "<div class='test-detail {}'><h3>{}</h3>",
                class,
                escape_html(test.full_name())
            ));
            if !test.file_location().is_empty() {
                self.details.push_str(&format!(
                    "<p class='location'>{}</p>",
                    escape_html(&test.file_location())
                ));
            }
            self.details.push_str("<ul>");
            for event in record.events() {
                if !self.verbose && matches!(event.kind, EventKind::Info | EventKind::Pass) {
                    continue;
                }
                let label = event.kind.label();
                let sep = if label.is_empty() { "" } else { ": " };
                let line = if event.line > 0 {
                    format!(" [{}]", event.line)
                } else {
                    String::new()
                };
                self.details.push_str(&format!(
                    "<li class='event-{}'>{}{}{}{}</li>",
                    label.to_ascii_lowercase().replace(' ', "-"),
                    label,
                    sep,
                    escape_html(&event.message),
                    line
                ));
            }
            self.details.push_str("</ul></div>");
        }
        Ok(())
    }

    fn end(&mut self, out: &mut dyn io::Write, totals: &RunTotals) -> io::Result<()> {
        let meta = self.meta.take().unwrap_or_else(|| RunMeta {
            project_name: String::new(),
            project_version: String::new(),
            project_description: String::new(),
            hostname: String::new(),
            start_time: chrono::Local::now(),
            registered: 0,
            decl_errors: Vec::new(),
        });

        let mut html = String::new();
        let title = if meta.project_name.is_empty() {
            "Test Report".to_string()
        } else {
            format!("Test Report: {}", meta.project_name)
        };
        html.push_str(&format!(
            "<!DOCTYPE html><html><head><meta charset='utf-8'><title>{}</title>",
            escape_html(&title)
        ));
        html.push_str("<style>");
        html.push_str(HTML_STYLE);
        html.push_str("</style></head><body>");
        html.push_str(&format!("<h1>{}</h1>", escape_html(&title)));
        if !meta.project_description.is_empty() {
            html.push_str(&format!(
                "<p class='description'>{}</p>",
                escape_html(&meta.project_description)
            ));
        }
        html.push_str(&format!(
            "<p class='run-info'>Version {} &middot; {} &middot; {}</p>",
            escape_html(&meta.project_version),
            escape_html(&meta.hostname),
            time::local_time_str(meta.start_time)
        ));

        if !meta.decl_errors.is_empty() {
            html.push_str("<div class='decl-errors'><h2>Test Declaration Errors</h2><ul>");
            for err in &meta.decl_errors {
                html.push_str(&format!("<li>{}</li>", escape_html(err)));
            }
            html.push_str("</ul></div>");
        }

        html.push_str("<div class='summary-container'>");
        for (count, label, class) in [
            (totals.total, "Total", ""),
            (totals.passed, "Passed", " passed-text"),
            (totals.failed, "Failed", " failed-text"),
            (totals.errors, "Errors", " failed-text"),
            (totals.warnings, "Warnings", " warned-text"),
            (totals.skipped, "Skipped", " skipped-text"),
            (totals.disabled, "Disabled", " skipped-text"),
        ] {
            html.push_str(&format!(
                "<div class='summary-item'><span class='count{}'>{}</span><span class='label'>{}</span></div>",
                class, count, label
            ));
        }
        html.push_str(&format!(
            "<div class='summary-item'><span class='count'>{}%</span><span class='label'>Pass Rate</span></div>",
            totals.pass_rate()
        ));
        html.push_str("</div>");

        html.push_str("<table class='results'><thead><tr>");
        html.push_str("<th>Test</th><th>Kind</th><th>Status</th><th>Duration</th><th>Author</th>");
        html.push_str("</tr></thead><tbody>");
        html.push_str(&self.rows);
        html.push_str("</tbody></table>");

        if !self.details.is_empty() {
            html.push_str("<h2>Details</h2>");
            html.push_str(&self.details);
        }

        html.push_str(&format!(
            "<p class='footer'>Duration {} s</p>",
            time::duration_secs_str(totals.duration_ms)
        ));
        html.push_str("</body></html>");

        out.write_all(html.as_bytes())
    }
}

fn status_class(status: Status) -> &'static str {
    match status {
        Status::PassOk => "pass",
        Status::PassWarn => "warn",
        Status::Failed => "fail",
        Status::Error | Status::DeclError => "error",
        Status::Skipped => "skip",
        Status::Disabled => "disabled",
        Status::Ready => "ready",
    }
}

/// Escapes text for safe inclusion in HTML content.
/// 转义文本以安全地嵌入 HTML 内容。
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
