//! # JUnit XML Reporting Module / JUnit XML 报告模块
//!
//! Renders the run as JUnit-compatible XML for CI consumers: a
//! `testsuites` root with per-suite `testsuite` elements, `testcase`
//! entries carrying failures and errors, and a `declerr` block listing
//! any declaration errors that aborted the run. Suite totals are only
//! known once a suite has finished, so everything is grouped in memory
//! and written at the end.
//!
//! 将运行渲染为供 CI 消费的 JUnit 兼容 XML：`testsuites` 根元素、
//! 按套件的 `testsuite` 元素、携带失败与错误的 `testcase` 条目，
//! 以及列出中止运行的声明错误的 `declerr` 块。套件总计只有在套件
//! 结束后才能确定，因此全部在内存中分组并在最后写出。

use crate::core::model::{EventKind, Status, TestDescriptor};
use crate::infra::time;
use crate::reporting::{Reporter, RunMeta, RunTotals};
use std::io;

const DEFAULT_SUITE: &str = "DEFAULT";

/// One finished suite's rendered test cases and counters.
struct SuiteBlock {
    name: String,
    timestamp: String,
    body: String,
    tests: u32,
    failures: u32,
    errors: u32,
    skipped: u32,
    disabled: u32,
    time_ms: u64,
}

/// JUnit-compatible XML renderer. / JUnit 兼容的 XML 渲染器。
pub struct XmlReporter {
    meta: Option<RunMeta>,
    suites: Vec<SuiteBlock>,
    current_suite: Option<String>,
    sysout_comment_written: bool,
}

impl XmlReporter {
    pub fn new() -> Self {
        Self {
            meta: None,
            suites: Vec::new(),
            current_suite: None,
            sysout_comment_written: false,
        }
    }

    fn open_suite(&mut self, test: &TestDescriptor) {
        let suite_name = test.suite_name().to_string();
        let display = if suite_name.is_empty() {
            DEFAULT_SUITE.to_string()
        } else {
            suite_name.clone()
        };
        let timestamp = test
            .record()
            .start_time()
            .map(time::iso_time_str)
            .unwrap_or_default();
        self.suites.push(SuiteBlock {
            name: display,
            timestamp,
            body: String::new(),
            tests: 0,
            failures: 0,
            errors: 0,
            skipped: 0,
            disabled: 0,
            time_ms: 0,
        });
        self.current_suite = Some(suite_name);
    }
}

impl Default for XmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for XmlReporter {
    fn begin(&mut self, _out: &mut dyn io::Write, meta: &RunMeta) -> io::Result<()> {
        self.meta = Some(meta.clone());
        self.suites.clear();
        self.current_suite = None;
        self.sysout_comment_written = false;
        Ok(())
    }

    fn report_test(&mut self, _out: &mut dyn io::Write, test: &TestDescriptor) -> io::Result<()> {
        let record = test.record();
        if record.status() == Status::Ready {
            return Ok(());
        }

        if self.current_suite.as_deref() != Some(test.suite_name()) || self.suites.is_empty() {
            self.open_suite(test);
        }

        let mut os = String::new();
        os.push_str(&format!(
            "    <testcase name=\"{}\" classname=\"{}\" assertions=\"{}\" status=\"{}\" time=\"{}\">\n",
            xml_esc(test.name()),
            xml_esc(test.full_name()),
            record.assert_total(),
            record.status().label(),
            time::duration_secs_str(record.duration_ms()),
        ));

        if record.has_ran() {
            let mut sysout_open = false;
            for event in record.events() {
                let mut msg = xml_esc(&event.message);
                if event.line > 0 {
                    msg.push_str(&format!(" [{}]", event.line));
                }

                match event.kind {
                    EventKind::Error => {
                        let class = record
                            .error_class()
                            .map(|c| c.as_str())
                            .unwrap_or_default();
                        if sysout_open {
                            os.push_str("</system-out>\n");
                            sysout_open = false;
                        }
                        os.push_str(&format!(
                            "      <error message=\"{}\" type=\"{}\"/>\n",
                            msg, class
                        ));
                    }
                    EventKind::Fail => {
                        if sysout_open {
                            os.push_str("</system-out>\n");
                            sysout_open = false;
                        }
                        os.push_str(&format!(
                            "      <failure message=\"{}\" type=\"\"/>\n",
                            msg
                        ));
                    }
                    EventKind::Info | EventKind::Pass | EventKind::Warn => {
                        if !self.sysout_comment_written {
                            os.push_str(
                                "      <!-- The 'system-out' element contains assertion and \
                                 informational messages rather than actual stdout. -->\n",
                            );
                            self.sysout_comment_written = true;
                        }
                        if !sysout_open {
                            os.push_str("      <system-out>");
                            sysout_open = true;
                        } else {
                            os.push_str("&#xD;\n");
                        }
                        let label = event.kind.label();
                        if label.is_empty() {
                            os.push_str(&msg);
                        } else {
                            os.push_str(&format!("{}: {}", label, msg));
                        }
                    }
                }
            }
            if sysout_open {
                os.push_str("</system-out>\n");
            }
        } else {
            // Both skipped and disabled tests carry the skipped element
            os.push_str("      <skipped/>\n");
        }

        os.push_str("    </testcase>\n");

        let suite = self.suites.last_mut().unwrap();
        suite.tests += 1;
        suite.time_ms += record.duration_ms();
        match record.status() {
            Status::Failed => suite.failures += 1,
            Status::Error => suite.errors += 1,
            Status::Skipped => suite.skipped += 1,
            Status::Disabled => suite.disabled += 1,
            _ => {}
        }
        suite.body.push_str(&os);
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

        let mut os = String::new();
        os.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        os.push_str(&format!(
            "<testsuites name=\"{}\" version=\"{}\" tests=\"{}\" failures=\"{}\" \
             errors=\"{}\" skipped=\"{}\" disabled=\"{}\" time=\"{}\">\n",
            xml_esc(&meta.project_name),
            xml_esc(&meta.project_version),
            totals.total,
            totals.failed,
            totals.errors,
            totals.skipped,
            totals.disabled,
            time::duration_secs_str(totals.duration_ms),
        ));

        // Declaration errors abort the run; CI readers still see why
        os.push_str(&format!(
            "  <declerr errors=\"{}\">",
            meta.decl_errors.len()
        ));
        if !meta.decl_errors.is_empty() {
            os.push('\n');
            for err in &meta.decl_errors {
                os.push_str(&format!("    <error>{}</error>\n", xml_esc(err)));
            }
            os.push_str("  ");
        }
        os.push_str("</declerr>\n");

        for suite in &self.suites {
            os.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" errors=\"{}\" failures=\"{}\" \
                 skipped=\"{}\" disabled=\"{}\" time=\"{}\" timestamp=\"{}\" hostname=\"{}\">\n",
                xml_esc(&suite.name),
                suite.tests,
                suite.errors,
                suite.failures,
                suite.skipped,
                suite.disabled,
                time::duration_secs_str(suite.time_ms),
                suite.timestamp,
                xml_esc(&meta.hostname),
            ));
            os.push_str(&suite.body);
            os.push_str("  </testsuite>\n");
        }

        os.push_str("</testsuites>\n");
        out.write_all(os.as_bytes())
    }
}

/// Escapes text for XML attribute and element content.
/// 转义文本以用于 XML 属性和元素内容。
fn xml_esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{TestBody, TestKind};
    use chrono::Local;

    fn meta() -> RunMeta {
        RunMeta {
            project_name: "widgets".to_string(),
            project_version: "1.0".to_string(),
            project_description: String::new(),
            hostname: "host".to_string(),
            start_time: Local::now(),
            registered: 2,
            decl_errors: Vec::new(),
        }
    }

    fn make(name: &str, suite: &str, ok: bool) -> TestDescriptor {
        let mut t = TestDescriptor::new(
            name.to_string(),
            suite.to_string(),
            TestKind::Plain,
            String::new(),
            0,
            String::new(),
            String::new(),
            TestBody::Plain(Box::new(move |ctx| {
                ctx.check(ok, "checked < result", 5);
                Ok(())
            })),
        );
        t.run(0, 0);
        t
    }

    fn render(tests: &[TestDescriptor], meta: RunMeta, totals: RunTotals) -> String {
        let mut reporter = XmlReporter::new();
        let mut buf: Vec<u8> = Vec::new();
        reporter.begin(&mut buf, &meta).unwrap();
        for t in tests {
            reporter.report_test(&mut buf, t).unwrap();
        }
        reporter.end(&mut buf, &totals).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn groups_tests_into_suite_elements() {
        let tests = vec![make("a", "", true), make("b", "alpha", false)];
        let totals = RunTotals {
            total: 2,
            ran: 2,
            passed: 1,
            failed: 1,
            ..RunTotals::default()
        };
        let xml = render(&tests, meta(), totals);

        assert!(xml.contains("<testsuites name=\"widgets\" version=\"1.0\" tests=\"2\""));
        assert!(xml.contains("<testsuite name=\"DEFAULT\""));
        assert!(xml.contains("<testsuite name=\"alpha\""));
        assert!(xml.contains("<failure message=\"checked &lt; result [5]\" type=\"\"/>"));
        assert!(xml.contains("<declerr errors=\"0\"></declerr>"));
    }

    #[test]
    fn declaration_errors_are_listed() {
        let mut m = meta();
        m.decl_errors = vec!["duplicate 'x'".to_string()];
        let xml = render(&[], m, RunTotals::default());
        assert!(xml.contains("<declerr errors=\"1\">"));
        assert!(xml.contains("<error>duplicate &apos;x&apos;</error>"));
    }

    #[test]
    fn informational_events_reach_system_out() {
        let mut t = TestDescriptor::new(
            "wired".to_string(),
            "s".to_string(),
            TestKind::Plain,
            String::new(),
            0,
            String::new(),
            String::new(),
            TestBody::Plain(Box::new(|ctx| {
                ctx.print("wiring note");
                ctx.check(true, "aligned", 9);
                Ok(())
            })),
        );
        t.run(0, 0);
        let totals = RunTotals {
            total: 1,
            ran: 1,
            passed: 1,
            ..RunTotals::default()
        };
        let xml = render(&[t], meta(), totals);
        assert!(xml.contains("<system-out>wiring note&#xD;\nOK: aligned [9]</system-out>"));
    }

    #[test]
    fn skipped_tests_carry_the_skipped_element() {
        let mut t = make("victim", "s", true);
        t.record_mut().clear();
        t.record_mut().set_skipped();
        let totals = RunTotals {
            total: 1,
            skipped: 1,
            ..RunTotals::default()
        };
        let xml = render(&[t], meta(), totals);
        assert!(xml.contains("<skipped/>"));
        assert!(xml.contains("skipped=\"1\""));
    }
}
