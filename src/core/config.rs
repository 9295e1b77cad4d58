//! # Configuration Module / 配置模块
//!
//! Optional TOML configuration for embedding applications: project
//! identity for report headers, run behaviour, and the report files to
//! generate. Loading is lenient, every section and key has a default.
//!
//! 供嵌入应用使用的可选 TOML 配置：报告头的项目信息、运行行为
//! 以及要生成的报告文件。加载是宽松的，每个节和键都有默认值。

use crate::core::runner::{Runner, RunnerError};
use crate::reporting::ReportStyle;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project identity shown in report headers.
/// 报告头中显示的项目信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Run behaviour knobs. / 运行行为开关。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Sort tests by name instead of registration order.
    pub sorted: bool,
    /// Global per-test time limit in milliseconds, 0 for none.
    pub time_limit_ms: u64,
    /// Global per-test warning threshold in milliseconds, 0 for none.
    pub time_warn_ms: u64,
    /// Report style streamed to standard output.
    pub default_report: ReportStyle,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sorted: false,
            time_limit_ms: 0,
            time_warn_ms: 0,
            default_report: ReportStyle::Console,
        }
    }
}

/// One report file to generate after each run.
/// 每次运行后要生成的一个报告文件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub style: ReportStyle,
    pub file: PathBuf,
}

/// The full runner configuration. / 完整的运行器配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub project: ProjectConfig,
    pub run: RunConfig,
    pub reports: Vec<ReportConfig>,
}

impl RunnerConfig {
    /// Loads a configuration from a TOML file.
    /// 从 TOML 文件加载配置。
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Applies every setting to a runner. Fails when the runner is locked
    /// by a run in progress.
    pub fn apply(&self, runner: &mut Runner) -> Result<(), RunnerError> {
        runner.set_project_name(&self.project.name)?;
        runner.set_project_version(&self.project.version)?;
        runner.set_project_description(&self.project.description)?;
        runner.set_sorted(self.run.sorted)?;
        runner.set_global_time_limit(self.run.time_limit_ms)?;
        runner.set_global_time_warning(self.run.time_warn_ms)?;
        runner.set_default_report(self.run.default_report)?;
        runner.clear_reports()?;
        for report in &self.reports {
            runner.add_report(report.style, report.file.clone())?;
        }
        Ok(())
    }
}
