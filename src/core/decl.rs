//! # Declaration Module / 声明模块
//!
//! The builder-style declaration surface. A [`TestDef`] collects a test's
//! name, kind, body and metadata, then registers it; [`suite`] opens a
//! named scope around a declaration closure so nesting mirrors the suite
//! hierarchy in the source.
//!
//! 构建器风格的声明接口。[`TestDef`] 收集测试的名称、种类、主体和
//! 元数据后进行注册；[`suite`] 围绕声明闭包打开命名作用域，
//! 使源码中的嵌套与套件层级一致。

use crate::core::context::TestContext;
use crate::core::model::{BodyResult, TestBody, TestFn, TestKind};
use crate::core::registry::Registry;

/// A test declaration under construction.
/// 构建中的测试声明。
pub struct TestDef {
    name: String,
    file: String,
    line: u32,
    user_type: String,
    repeat_type: String,
    kind: TestKind,
    body: Option<TestBody>,
}

impl TestDef {
    /// Starts a declaration with the short test name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            file: String::new(),
            line: 0,
            user_type: String::new(),
            repeat_type: String::new(),
            kind: TestKind::Plain,
            body: None,
        }
    }

    /// Records the declaration location, usually `file!()` and `line!()`.
    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.file = file.to_string();
        self.line = line;
        self
    }

    /// Labels the user type this test exercises.
    pub fn user_type(mut self, name: &str) -> Self {
        self.user_type = name.to_string();
        self.kind = TestKind::Protected;
        self
    }

    /// Marks this declaration as one instantiation of a repeated body,
    /// labelled with the instantiation type.
    pub fn repeated(mut self, repeat_type: &str) -> Self {
        self.repeat_type = repeat_type.to_string();
        self.kind = TestKind::Repeated;
        self
    }

    /// Supplies a plain body. / 提供普通主体。
    pub fn body(
        mut self,
        f: impl FnMut(&mut TestContext<'_>) -> BodyResult + Send + 'static,
    ) -> Self {
        self.body = Some(TestBody::Plain(Box::new(f)));
        self
    }

    /// Supplies a fixture lifecycle: setup runs first, teardown always
    /// runs last, even when the body panics.
    ///
    /// 提供夹具生命周期：setup 最先运行，teardown 总是最后运行，
    /// 即使主体 panic。
    pub fn fixture(
        mut self,
        setup: impl FnMut(&mut TestContext<'_>) -> BodyResult + Send + 'static,
        body: impl FnMut(&mut TestContext<'_>) -> BodyResult + Send + 'static,
        teardown: impl FnMut(&mut TestContext<'_>) -> BodyResult + Send + 'static,
    ) -> Self {
        self.body = Some(TestBody::Fixture {
            setup: Box::new(setup) as TestFn,
            body: Box::new(body) as TestFn,
            teardown: Box::new(teardown) as TestFn,
        });
        self.kind = TestKind::Fixture;
        self
    }

    /// Registers the declaration under the registry's open scope. Returns
    /// false and records a declaration error when the declaration is
    /// invalid or collides with an existing name.
    pub fn register(self, registry: &mut Registry) -> bool {
        let Some(body) = self.body else {
            registry.note_decl_error(format!("test '{}' has no body", self.name.trim()));
            return false;
        };
        registry.register(
            &self.name,
            self.kind,
            &self.file,
            self.line,
            &self.user_type,
            &self.repeat_type,
            body,
        )
    }
}

/// Opens a suite scope for the duration of `f`. Scopes nest.
/// 在 `f` 执行期间打开一个套件作用域。作用域可以嵌套。
pub fn suite<R>(registry: &mut Registry, name: &str, f: impl FnOnce(&mut Registry) -> R) -> R {
    registry.begin_suite(name);
    let rslt = f(registry);
    registry.end_suite();
    rslt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Status;

    #[test]
    fn builder_registers_under_nested_scopes() {
        let mut reg = Registry::new();
        suite(&mut reg, "math", |reg| {
            suite(reg, "vectors", |reg| {
                assert!(TestDef::new("dot_product")
                    .at("math.rs", 10)
                    .body(|ctx| {
                        ctx.check(true, "", 0);
                        Ok(())
                    })
                    .register(reg));
            });
        });
        let t = reg.find("math::vectors::dot_product").unwrap();
        assert_eq!(t.file_location(), "math.rs [10]");
        assert_eq!(t.record().status(), Status::Ready);
    }

    #[test]
    fn missing_body_is_a_declaration_error() {
        let mut reg = Registry::new();
        assert!(!TestDef::new("ghost").register(&mut reg));
        assert!(reg
            .declaration_errors()
            .iter()
            .any(|e| e.contains("ghost")));
    }

    #[test]
    fn fixture_declaration_carries_its_kind() {
        let mut reg = Registry::new();
        assert!(TestDef::new("lifecycle")
            .fixture(|_| Ok(()), |_| Ok(()), |_| Ok(()))
            .register(&mut reg));
        assert_eq!(
            reg.find("lifecycle").unwrap().kind(),
            crate::core::model::TestKind::Fixture
        );
    }
}
