//! # Command-Line Module / 命令行模块
//!
//! Run directives for embedding applications. A host program can hand its
//! raw arguments to the tolerant scanner, which picks out the test
//! directives and ignores everything else, or merge the clap command into
//! its own interface and use the typed accessors.
//!
//! 供嵌入应用使用的运行指令。宿主程序可以把原始参数交给宽容的扫描器，
//! 它只提取测试指令并忽略其余内容；也可以把 clap 命令合并进自己的
//! 接口并使用类型化的读取函数。
//!
//! ## Directives / 指令
//!
//! - `--trun NAMES` run the selected tests / 运行选中的测试
//! - `--trall` run everything / 运行全部测试
//! - `--tdis NAMES` disable the selected tests first / 先禁用选中的测试
//!
//! The `/trun:NAMES` and `/tdis:NAMES` forms are accepted too.

use crate::core::runner::{RunOutcome, Runner, RunnerError};
use crate::core::selector;
use crate::core::config::RunnerConfig;
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

/// The test directives found on a command line.
/// 命令行上找到的测试指令。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunDirectives {
    /// Normalized run selector list. `None` means no run directive was
    /// present.
    pub run_list: Option<String>,
    /// Normalized disable selector list, empty when absent.
    pub disable_list: String,
}

/// Scans raw arguments for test directives, ignoring anything it does not
/// recognize. Unknown flags end any open name list, so a host program's
/// own options never leak into the selectors.
///
/// 在原始参数中扫描测试指令，忽略无法识别的内容。未知标志会结束当前
/// 打开的名称列表，因此宿主程序自己的选项不会混入选择器。
pub fn parse_run_directives<S: AsRef<str>>(args: &[S]) -> RunDirectives {
    let mut run_out = String::new();
    let mut dis_out = String::new();
    let mut run_flag = false;
    let mut dis_flag = false;

    for raw in args {
        let mut arg = raw.as_ref().trim().to_string();

        match arg.as_str() {
            "--trun" | "/trun" | "/trun:" => {
                run_flag = true;
                dis_flag = false;
                continue;
            }
            "--trall" | "/trall" => {
                run_out = "*".to_string();
                run_flag = true;
                dis_flag = false;
                continue;
            }
            "--tdis" | "/tdis" => {
                dis_flag = true;
                run_flag = false;
                continue;
            }
            _ => {}
        }

        if let Some(rest) = arg.strip_prefix("/trun:") {
            run_flag = true;
            dis_flag = false;
            arg = rest.to_string();
        } else if let Some(rest) = arg.strip_prefix("/tdis:") {
            dis_flag = true;
            run_flag = false;
            arg = rest.to_string();
        }

        if arg.is_empty() {
            continue;
        }
        if arg.starts_with('-') || arg.starts_with('/') {
            run_flag = false;
            dis_flag = false;
        } else if run_flag {
            if !run_out.is_empty() {
                run_out.push(' ');
            }
            run_out.push_str(&arg);
        } else if dis_flag {
            if !dis_out.is_empty() {
                dis_out.push(' ');
            }
            dis_out.push_str(&arg);
        }
    }

    // A run directive with no surviving names falls back to the caller's
    // default behaviour, exactly like no directive at all
    let normalized = selector::split_list(&run_out).join(",");
    RunDirectives {
        run_list: if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        },
        disable_list: selector::split_list(&dis_out).join(","),
    }
}

/// Builds the clap command for hosts that want typed argument handling.
/// 为需要类型化参数处理的宿主构建 clap 命令。
pub fn command() -> Command {
    Command::new("suite-runner")
        .about("Runs registered test suites and generates reports")
        .arg(
            Arg::new("trun")
                .long("trun")
                .value_name("NAMES")
                .num_args(1..)
                .help("Run the tests the selector list reaches"),
        )
        .arg(
            Arg::new("trall")
                .long("trall")
                .action(ArgAction::SetTrue)
                .help("Run every registered test"),
        )
        .arg(
            Arg::new("tdis")
                .long("tdis")
                .value_name("NAMES")
                .num_args(1..)
                .help("Disable the tests the selector list reaches before running"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Load runner configuration from a TOML file"),
        )
}

/// Extracts the test directives from parsed clap matches.
pub fn directives_from_matches(matches: &ArgMatches) -> RunDirectives {
    let mut run_list = None;
    if matches.get_flag("trall") {
        run_list = Some("*".to_string());
    } else if let Some(values) = matches.get_many::<String>("trun") {
        let joined = values.cloned().collect::<Vec<_>>().join(",");
        run_list = Some(selector::split_list(&joined).join(","));
    }

    let disable_list = matches
        .get_many::<String>("tdis")
        .map(|values| {
            let joined = values.cloned().collect::<Vec<_>>().join(",");
            selector::split_list(&joined).join(",")
        })
        .unwrap_or_default();

    RunDirectives {
        run_list,
        disable_list,
    }
}

/// Applies directives to a runner and runs. With `def_run`, a command line
/// carrying no run directive still runs everything; without it, nothing
/// runs.
///
/// 将指令应用到运行器并运行。开启 `def_run` 时，不含运行指令的命令行
/// 仍会运行全部测试；否则不运行任何测试。
pub fn run_cmdline<S: AsRef<str>>(
    runner: &mut Runner,
    args: &[S],
    def_run: bool,
) -> Result<RunOutcome, RunnerError> {
    let directives = parse_run_directives(args);
    apply_directives(runner, &directives, def_run)
}

/// Applies a config file (when given) and the parsed clap matches, then
/// runs.
pub fn run_from_matches(
    runner: &mut Runner,
    matches: &ArgMatches,
    def_run: bool,
) -> anyhow::Result<RunOutcome> {
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        let config = RunnerConfig::from_path(Path::new(path))?;
        config
            .apply(runner)
            .context("Failed to apply runner configuration")?;
    }
    let directives = directives_from_matches(matches);
    apply_directives(runner, &directives, def_run).map_err(Into::into)
}

fn apply_directives(
    runner: &mut Runner,
    directives: &RunDirectives,
    def_run: bool,
) -> Result<RunOutcome, RunnerError> {
    if directives.run_list.is_none() && !def_run {
        return Ok(RunOutcome::RanNone);
    }
    if !directives.disable_list.is_empty() {
        runner.set_enabled(&directives.disable_list, false)?;
    }
    match &directives.run_list {
        Some(list) => runner.run(list),
        None => runner.run("*"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_collects_run_names() {
        let d = parse_run_directives(&["app", "--trun", "alpha", "beta::*", "--verbose"]);
        assert_eq!(d.run_list.as_deref(), Some("alpha,beta::*"));
        assert!(d.disable_list.is_empty());
    }

    #[test]
    fn scanner_handles_colon_forms() {
        let d = parse_run_directives(&["/trun:alpha,beta", "/tdis:slow::*"]);
        assert_eq!(d.run_list.as_deref(), Some("alpha,beta"));
        assert_eq!(d.disable_list, "slow::*");
    }

    #[test]
    fn trall_selects_everything() {
        let d = parse_run_directives(&["--trall"]);
        assert_eq!(d.run_list.as_deref(), Some("*"));
    }

    #[test]
    fn unknown_flags_close_open_lists() {
        let d = parse_run_directives(&["--trun", "alpha", "--jobs", "4"]);
        // "4" follows an unknown flag, so it is not a selector
        assert_eq!(d.run_list.as_deref(), Some("alpha"));
    }

    #[test]
    fn absent_directives_yield_none() {
        let d = parse_run_directives(&["app", "--help"]);
        assert!(d.run_list.is_none());
        assert!(d.disable_list.is_empty());
    }

    #[test]
    fn clap_command_round_trips_directives() {
        let matches = command()
            .try_get_matches_from(["suite-runner", "--trun", "a", "b::*", "--tdis", "slow::"])
            .unwrap();
        let d = directives_from_matches(&matches);
        assert_eq!(d.run_list.as_deref(), Some("a,b::*"));
        assert_eq!(d.disable_list, "slow::");
    }
}
