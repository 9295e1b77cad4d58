//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides a self-contained unit-testing engine: tests are
//! declared and registered into hierarchical named suites, then a runner
//! selects, orders, executes, times and classifies them, streaming the
//! results to pluggable text/HTML/JUnit-XML report renderers.
//!
//! 此库提供一个自包含的单元测试引擎：测试被声明并注册到分层的命名套件中，
//! 然后由运行器选择、排序、执行、计时和分类，并将结果流式传输到
//! 可插拔的文本/HTML/JUnit-XML 报告渲染器。
//!
//! ## Modules / 模块
//!
//! - `core` - Test model, registry, selector, ordering and the run engine
//! - `infra` - Infrastructure services like timestamps and report file output
//! - `reporting` - Report renderers and the reporter contract
//! - `cli` - Command-line run directives for embedding applications
//!
//! - `core` - 测试模型、注册表、选择器、排序和运行引擎
//! - `infra` - 基础设施服务，如时间戳和报告文件输出
//! - `reporting` - 报告渲染器和报告器契约
//! - `cli` - 供嵌入应用使用的命令行运行指令

pub mod core;
pub mod infra;
pub mod reporting;
pub mod cli;

// Re-export commonly used items
pub use crate::core::config::RunnerConfig;
pub use crate::core::context::{TestAbort, TestContext};
pub use crate::core::decl::TestDef;
pub use crate::core::model::{Event, EventKind, Status, TestDescriptor, TestKind};
pub use crate::core::registry::Registry;
pub use crate::core::runner::{RunOutcome, Runner, RunnerError, StatKind};
pub use crate::reporting::ReportStyle;

use once_cell::sync::Lazy;
use std::sync::Mutex;

/// The process-wide default runner instance, created on first use.
/// 进程级默认运行器实例，首次使用时创建。
static DEFAULT_RUNNER: Lazy<Mutex<Runner>> = Lazy::new(|| Mutex::new(Runner::new()));

/// Runs a closure against the lazily-initialized default runner.
///
/// This is the ergonomic entry point for applications that register all of
/// their tests against one process-wide runner. The default instance is
/// guarded: if a test body executing under the default runner calls back
/// into this function, the access is refused with
/// [`RunnerError::RunInProgress`] instead of deadlocking. This is the
/// reentrancy guard for the default instance; explicit [`Runner`] values
/// rely on the per-runner guard instead.
///
/// 针对惰性初始化的默认运行器运行一个闭包。
/// 如果在默认运行器执行测试期间再次调用此函数，访问会被拒绝并返回
/// [`RunnerError::RunInProgress`]，而不会死锁。
pub fn with_default_runner<R>(f: impl FnOnce(&mut Runner) -> R) -> Result<R, RunnerError> {
    let mut guard = DEFAULT_RUNNER
        .try_lock()
        .map_err(|_| RunnerError::RunInProgress)?;
    Ok(f(&mut guard))
}
