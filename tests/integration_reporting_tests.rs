//! Integration tests for report file generation, configuration loading
//! and the command-line run directives.
//!
//! 报告文件生成、配置加载和命令行运行指令的集成测试。

use std::fs;
use suite_runner::cli;
use suite_runner::core::decl::{suite, TestDef};
use suite_runner::{ReportStyle, RunOutcome, Runner, RunnerConfig, Status};

fn quiet_runner() -> Runner {
    let mut runner = Runner::new();
    runner.set_default_report(ReportStyle::None).unwrap();
    runner
}

fn declare_sample(runner: &mut Runner) {
    TestDef::new("root_pass")
        .body(|ctx| {
            ctx.check(true, "holds", 0);
            Ok(())
        })
        .register(runner.registry_mut());
    suite(runner.registry_mut(), "widgets", |reg| {
        TestDef::new("assemble").body(|_| Ok(())).register(reg);
        TestDef::new("paint")
            .at("widgets.rs", 31)
            .body(|ctx| {
                ctx.check_eq(4, 5, "coat count", 32);
                Ok(())
            })
            .register(reg);
    });
}

mod report_files {
    use super::*;

    #[test]
    fn junit_xml_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/junit.xml");

        let mut runner = quiet_runner();
        runner.set_project_name("widgets").unwrap();
        runner.set_project_version("1.2").unwrap();
        runner.add_report(ReportStyle::JunitXml, path.clone()).unwrap();
        declare_sample(&mut runner);

        runner.run("*").unwrap();

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<testsuites name=\"widgets\" version=\"1.2\""));
        assert!(xml.contains("<testsuite name=\"DEFAULT\""));
        assert!(xml.contains("<testsuite name=\"widgets\""));
        assert!(xml.contains("<failure message=\"coat count [32]\""));
    }

    #[test]
    fn html_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.html");

        let mut runner = quiet_runner();
        runner.set_project_name("widgets").unwrap();
        runner
            .add_report(ReportStyle::HtmlVerbose, path.clone())
            .unwrap();
        declare_sample(&mut runner);

        runner.run("*").unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Test Report: widgets"));
        assert!(html.contains("widgets::paint"));
    }

    #[test]
    fn text_report_lists_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");

        let mut runner = quiet_runner();
        runner
            .add_report(ReportStyle::TextSummary, path.clone())
            .unwrap();
        declare_sample(&mut runner);

        runner.run("*").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("widgets::paint"));
        assert!(text.contains("declared: widgets.rs [31]"));
        assert!(!text.contains("widgets::assemble"));
    }

    #[test]
    fn declaration_errors_reach_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junit.xml");

        let mut runner = quiet_runner();
        runner.add_report(ReportStyle::JunitXml, path.clone()).unwrap();
        TestDef::new("dup").body(|_| Ok(())).register(runner.registry_mut());
        TestDef::new("dup").body(|_| Ok(())).register(runner.registry_mut());

        let _ = runner.run("*");

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.contains("<declerr errors=\"1\">"));
        assert!(xml.contains("already exists"));
    }
}

mod configuration {
    use super::*;

    #[test]
    fn config_file_drives_the_runner() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("out/junit.xml");
        let config_path = dir.path().join("runner.toml");
        fs::write(
            &config_path,
            format!(
                r#"
                [project]
                name = "configured"

                [run]
                sorted = true
                default_report = "none"

                [[reports]]
                style = "junit-xml"
                file = "{}"
                "#,
                report_path.display()
            ),
        )
        .unwrap();

        let mut runner = Runner::new();
        let config = RunnerConfig::from_path(&config_path).unwrap();
        config.apply(&mut runner).unwrap();
        declare_sample(&mut runner);

        runner.run("*").unwrap();
        let xml = fs::read_to_string(&report_path).unwrap();
        assert!(xml.contains("<testsuites name=\"configured\""));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunnerConfig::from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}

mod command_line {
    use super::*;

    #[test]
    fn directives_select_and_disable() {
        let mut runner = quiet_runner();
        declare_sample(&mut runner);

        let outcome = cli::run_cmdline(
            &mut runner,
            &["app", "--trun", "widgets::*", "--tdis", "widgets::paint"],
            false,
        )
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { failures: 0 }));
        assert_eq!(runner.test_status("widgets::assemble"), Some(Status::PassOk));
        assert_eq!(runner.test_status("widgets::paint"), Some(Status::Disabled));
        assert_eq!(runner.test_status("root_pass"), Some(Status::Ready));
    }

    #[test]
    fn default_run_kicks_in_without_directives() {
        let mut runner = quiet_runner();
        declare_sample(&mut runner);

        let outcome = cli::run_cmdline(&mut runner, &["app", "--other-flag"], true).unwrap();
        assert!(matches!(outcome, RunOutcome::Completed { failures: 1 }));
    }

    #[test]
    fn nothing_runs_without_directives_or_default() {
        let mut runner = quiet_runner();
        declare_sample(&mut runner);

        let outcome = cli::run_cmdline(&mut runner, &["app"], false).unwrap();
        assert_eq!(outcome, RunOutcome::RanNone);
        assert_eq!(runner.test_status("root_pass"), Some(Status::Ready));
    }
}
