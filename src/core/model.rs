//! # Test Model Module / 测试模型模块
//!
//! This module defines the core data structures of the engine: the test
//! descriptor with its identity and executable body, the status and event
//! enumerations, and the panic boundary that converts any failure escaping
//! a test body into a classified error on the test's run record.
//!
//! 此模块定义引擎的核心数据结构：带有标识和可执行主体的测试描述符、
//! 状态与事件枚举，以及将逃逸出测试主体的任何失败转换为
//! 运行记录上已分类错误的 panic 边界。

use crate::core::context::{TestAbort, TestContext};
use crate::core::record::RunRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// The suite name separator used in fully-qualified test names.
/// 完全限定测试名中使用的套件名分隔符。
pub const NAME_SEP: &str = "::";

/// Identifies how a test was declared.
/// 标识测试的声明方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    /// A vanilla test case. / 普通测试用例。
    Plain,
    /// One instantiation of a repeated test body. / 重复测试主体的一个实例。
    Repeated,
    /// A test with setup and teardown lifecycle hooks. / 带 setup/teardown 生命周期钩子的测试。
    Fixture,
    /// A test exercising protected access to a type. / 测试类型受保护访问的测试。
    Protected,
}

impl TestKind {
    /// Returns the report label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            TestKind::Plain => "TEST",
            TestKind::Repeated => "REPEATED",
            TestKind::Fixture => "FIXTURE",
            TestKind::Protected => "PROTECTED",
        }
    }
}

/// The status of a single test case.
/// 单个测试用例的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Ready to run. / 准备运行。
    Ready,
    /// Passed without warnings. / 无警告通过。
    PassOk,
    /// Passed, but a warning was raised. / 通过，但产生了警告。
    PassWarn,
    /// One or more assertions failed. / 一个或多个断言失败。
    Failed,
    /// A raised or uncaught error, i.e. a probable test implementation defect.
    /// 抛出或未捕获的错误，即可能的测试实现缺陷。
    Error,
    /// Enabled, but skipped during the run (e.g. suite setup failed).
    /// 已启用，但在运行中被跳过（例如套件 setup 失败）。
    Skipped,
    /// Disabled by the author or a disable selector. / 被作者或禁用选择器禁用。
    Disabled,
    /// The run was aborted by test declaration errors. / 运行因测试声明错误而中止。
    DeclError,
}

impl Status {
    /// Returns the report label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ready => "NOT RUN",
            Status::PassOk => "PASS (OK)",
            Status::PassWarn => "PASS (WARN)",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
            Status::Skipped => "SKIPPED",
            Status::Disabled => "DISABLED",
            Status::DeclError => "DECL ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of a single event log entry.
/// 单条事件日志的类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Informational output from the test body. / 测试主体的信息输出。
    Info,
    /// A passing assertion. / 通过的断言。
    Pass,
    /// A failed assertion or raised failure. / 失败的断言或显式失败。
    Fail,
    /// A raised or uncaught error. / 抛出或未捕获的错误。
    Error,
    /// A warning. / 警告。
    Warn,
}

impl EventKind {
    /// Returns the report label for this event kind. Info has none.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Info => "",
            EventKind::Pass => "OK",
            EventKind::Fail => "FAIL",
            EventKind::Error => "ERROR",
            EventKind::Warn => "WARNING",
        }
    }
}

/// One entry of a test's ordered event log.
/// 测试有序事件日志中的一条记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The trimmed message text. / 修剪后的消息文本。
    pub message: String,
    /// The event kind. / 事件类别。
    pub kind: EventKind,
    /// Source line number, 0 when unknown. / 源码行号，0 表示未知。
    pub line: u32,
}

/// Classification of a raised or escaped error. This is a closed set:
/// the harness boundary maps every failure mode onto one of these tags.
///
/// 抛出或逃逸错误的分类。这是一个封闭集合：
/// 边界会将每种失败模式映射到其中一个标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Explicitly raised through the test context. / 通过测试上下文显式抛出。
    Raised,
    /// An unwinding panic escaped the test body. / panic 逃逸出测试主体。
    Panic,
    /// A panic with a payload that is not a string. / 负载不是字符串的 panic。
    Unknown,
}

impl ErrorClass {
    /// Stable classification string, used as the `type` in XML reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Raised => "raised",
            ErrorClass::Panic => "panic",
            ErrorClass::Unknown => "unknown",
        }
    }
}

/// Result type of a test body. `Err` means an error was raised and the
/// body returned immediately; the details are already on the record.
pub type BodyResult = Result<(), TestAbort>;

/// An executable test body.
/// 可执行的测试主体。
pub type TestFn = Box<dyn FnMut(&mut TestContext<'_>) -> BodyResult + Send>;

/// The body variants of a test. The kind only affects how lifecycle hooks
/// are invoked, never the test's identity.
///
/// 测试的主体变体。种类只影响生命周期钩子的调用方式，不影响测试标识。
pub enum TestBody {
    /// A single body function. / 单个主体函数。
    Plain(TestFn),
    /// A body wrapped by setup and teardown hooks. / 由 setup 与 teardown 包裹的主体。
    Fixture {
        setup: TestFn,
        body: TestFn,
        teardown: TestFn,
    },
}

/// A registered test case: immutable identity and declaration metadata,
/// the executable body, and exactly one mutable run record.
///
/// 一个已注册的测试用例：不可变的标识与声明元数据、
/// 可执行主体，以及恰好一个可变的运行记录。
pub struct TestDescriptor {
    short_name: String,
    suite: String,
    full_name: String,
    kind: TestKind,
    file: String,
    line: u32,
    user_type: String,
    repeat_type: String,
    body: TestBody,
    record: RunRecord,
}

impl TestDescriptor {
    /// Creates a descriptor. The fully-qualified name is assembled once
    /// here and never changes afterwards.
    pub(crate) fn new(
        short_name: String,
        suite: String,
        kind: TestKind,
        file: String,
        line: u32,
        user_type: String,
        repeat_type: String,
        body: TestBody,
    ) -> Self {
        let short_name = short_name.trim().to_string();
        // Clean up a leading separator on the suite path
        let suite = suite
            .trim()
            .strip_prefix(NAME_SEP)
            .unwrap_or(suite.trim())
            .to_string();

        let full_name = if suite.is_empty() {
            short_name.clone()
        } else {
            format!("{}{}{}", suite, NAME_SEP, short_name)
        };

        Self {
            short_name,
            suite,
            full_name,
            kind,
            file: file.trim().to_string(),
            line,
            user_type,
            repeat_type,
            body,
            record: RunRecord::new(),
        }
    }

    /// The short test name. / 短测试名。
    pub fn name(&self) -> &str {
        &self.short_name
    }

    /// The suite path joined by `::`, empty for the default suite.
    /// 以 `::` 连接的套件路径，默认套件为空。
    pub fn suite_name(&self) -> &str {
        &self.suite
    }

    /// The immutable fully-qualified name. / 不可变的完全限定名。
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The declaration kind. / 声明种类。
    pub fn kind(&self) -> TestKind {
        self.kind
    }

    /// Optional documentation label for the user type under test.
    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    /// Optional documentation label for a repeated test instantiation.
    pub fn repeat_type(&self) -> &str {
        &self.repeat_type
    }

    /// Renders the declaration location as `"file [line]"`, or an empty
    /// string when the file is unknown.
    pub fn file_location(&self) -> String {
        let mut rslt = String::new();
        if !self.file.is_empty() {
            rslt.push_str(&self.file);
            if self.line > 0 {
                rslt.push_str(&format!(" [{}]", self.line));
            }
        }
        rslt
    }

    /// True if this test belongs to the setup bucket of its suite: the
    /// short name begins `setup` (case-insensitive, ignoring leading
    /// underscores).
    pub fn is_setup(&self) -> bool {
        bucket_prefix(&self.short_name, "setup")
    }

    /// True if this test belongs to the teardown bucket of its suite.
    pub fn is_teardown(&self) -> bool {
        bucket_prefix(&self.short_name, "teardown")
    }

    /// Read access to the run record. / 运行记录的只读访问。
    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Mutable access to the run record. / 运行记录的可变访问。
    pub(crate) fn record_mut(&mut self) -> &mut RunRecord {
        &mut self.record
    }

    /// Executes the test body inside the panic boundary.
    ///
    /// Does nothing when the record refuses to start (disabled or
    /// pre-marked skipped). Any panic escaping the body is converted into
    /// an error event with a stable classification, so a failing test can
    /// never abort the run.
    ///
    /// 在 panic 边界内执行测试主体。任何逃逸出主体的 panic
    /// 都会被转换为带稳定分类的错误事件，因此失败的测试不会中止整个运行。
    pub(crate) fn run(&mut self, global_limit_ms: u64, global_warn_ms: u64) {
        if !self.record.start(global_limit_ms, global_warn_ms) {
            return;
        }

        let outcome = {
            let record = &mut self.record;
            let body = &mut self.body;
            panic::catch_unwind(AssertUnwindSafe(move || {
                let mut ctx = TestContext::new(record);
                match body {
                    TestBody::Plain(f) => {
                        // An Err here means an error was raised and logged;
                        // there is nothing further to do.
                        let _ = f(&mut ctx);
                    }
                    TestBody::Fixture {
                        setup,
                        body,
                        teardown,
                    } => run_fixture(&mut ctx, setup, body, teardown),
                }
            }))
        };

        if let Err(payload) = outcome {
            // Classify whatever escaped the body
            if let Some(msg) = payload.downcast_ref::<&str>() {
                self.record.raise_error(
                    &format!("unhandled panic ('{}') in test", msg),
                    0,
                    ErrorClass::Panic,
                );
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                self.record.raise_error(
                    &format!("unhandled panic ('{}') in test", msg),
                    0,
                    ErrorClass::Panic,
                );
            } else {
                self.record
                    .raise_error("unknown panic payload in test", 0, ErrorClass::Unknown);
            }
        }

        self.record.stop();
    }
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDescriptor")
            .field("full_name", &self.full_name)
            .field("kind", &self.kind)
            .field("status", &self.record.status())
            .finish_non_exhaustive()
    }
}

/// Fixture lifecycle: setup, body, teardown. Teardown is guaranteed to run
/// even when the body panics; the panic is then resumed so the outer
/// boundary records it.
fn run_fixture(
    ctx: &mut TestContext<'_>,
    setup: &mut TestFn,
    body: &mut TestFn,
    teardown: &mut TestFn,
) {
    match setup(ctx) {
        Ok(()) => {
            ctx.check(true, "fixture setup()", 0);
        }
        Err(_) => {
            // Error already on the record; count the failed hook and stop.
            ctx.check(false, "fixture setup()", 0);
            return;
        }
    }

    let body_panic = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = body(ctx);
    }));

    let teardown_res = panic::catch_unwind(AssertUnwindSafe(|| teardown(ctx)));
    let teardown_ok = matches!(&teardown_res, Ok(Ok(())));
    ctx.check(teardown_ok, "fixture teardown()", 0);

    if let Err(p) = body_panic {
        panic::resume_unwind(p);
    }
    if let Err(p) = teardown_res {
        panic::resume_unwind(p);
    }
}

/// Bucket classification helper: case-insensitive prefix match on the
/// short name after stripping leading underscores.
fn bucket_prefix(name: &str, prefix: &str) -> bool {
    if name.len() < prefix.len() {
        return false;
    }
    let trimmed = name.trim_start_matches('_').as_bytes();
    trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
