//! # Registry Module / 注册表模块
//!
//! The registry holds every declared test in registration order, tracks
//! the currently open suite scope during declaration, and collects the
//! declaration errors (duplicate names, empty names, unbalanced suite
//! scopes) that later abort a run.
//!
//! 注册表按注册顺序保存所有已声明的测试，跟踪声明期间当前打开的
//! 套件作用域，并收集之后会中止运行的声明错误
//! （重名、空名、不平衡的套件作用域）。

use crate::core::model::{TestBody, TestDescriptor, TestKind, NAME_SEP};
use crate::core::selector;

/// The test registry. One per runner.
/// 测试注册表。每个运行器一个。
pub struct Registry {
    tests: Vec<TestDescriptor>,
    decl_errors: Vec<String>,
    scope: Vec<String>,
    // Tracks begin/end pairing even after the scope stack has drained,
    // so a stray end is still reported.
    scope_balance: i64,
    has_suites: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tests: Vec::new(),
            decl_errors: Vec::new(),
            scope: Vec::new(),
            scope_balance: 0,
            has_suites: false,
        }
    }

    /// Opens a nested suite scope. Tests registered until the matching
    /// [`Registry::end_suite`] belong to this suite.
    pub fn begin_suite(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || name.contains(NAME_SEP) {
            self.decl_errors
                .push(format!("invalid suite name '{}'", name));
        }
        self.scope.push(name.to_string());
        self.scope_balance += 1;
    }

    /// Closes the innermost suite scope.
    pub fn end_suite(&mut self) {
        self.scope.pop();
        self.scope_balance -= 1;
    }

    /// The `::`-joined path of the open scope, empty at the root.
    pub fn current_suite(&self) -> String {
        self.scope.join(NAME_SEP)
    }

    /// Registers a test under the open scope. Returns false and records a
    /// declaration error when the name is empty, contains the suite
    /// separator, or collides with an existing fully-qualified name.
    ///
    /// 在当前作用域下注册一个测试。名称为空、含套件分隔符或与既有
    /// 完全限定名冲突时返回 false 并记录声明错误。
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        name: &str,
        kind: TestKind,
        file: &str,
        line: u32,
        user_type: &str,
        repeat_type: &str,
        body: TestBody,
    ) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.decl_errors.push("test name is empty".to_string());
            return false;
        }
        if trimmed.contains(NAME_SEP) {
            self.decl_errors
                .push(format!("test name '{}' contains '{}'", trimmed, NAME_SEP));
            return false;
        }

        let suite = self.current_suite();
        let desc = TestDescriptor::new(
            trimmed.to_string(),
            suite,
            kind,
            file.to_string(),
            line,
            user_type.to_string(),
            repeat_type.to_string(),
            body,
        );

        if self.exists(desc.full_name()) {
            self.decl_errors
                .push(format!("test name '{}' already exists", desc.full_name()));
            return false;
        }

        if !desc.suite_name().is_empty() {
            self.has_suites = true;
        }
        self.tests.push(desc);
        true
    }

    /// Records a declaration error produced outside the registry itself.
    pub(crate) fn note_decl_error(&mut self, message: String) {
        self.decl_errors.push(message);
    }

    /// True when any registered test lives outside the default suite.
    pub fn has_suites(&self) -> bool {
        self.has_suites
    }

    /// Number of registered tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Registered tests in registration order.
    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    pub(crate) fn tests_mut(&mut self) -> &mut [TestDescriptor] {
        &mut self.tests
    }

    /// Finds the first test matching a precise full name.
    pub fn find(&self, full_name: &str) -> Option<&TestDescriptor> {
        let wanted = full_name.trim();
        self.tests
            .iter()
            .find(|t| selector::name_matches(wanted, t.full_name(), t.suite_name(), true))
    }

    /// True if a test with exactly this fully-qualified name is registered.
    pub fn exists(&self, full_name: &str) -> bool {
        self.find(full_name).is_some()
    }

    /// The collected declaration errors, plus a scope-imbalance entry when
    /// the begin/end pairing never settled back to the root.
    ///
    /// 已收集的声明错误，若 begin/end 配对未回到根则附加一条
    /// 作用域不平衡错误。
    pub fn declaration_errors(&self) -> Vec<String> {
        let mut errors = self.decl_errors.clone();
        if self.scope_balance > 0 {
            errors.push(format!(
                "{} suite scope(s) opened but never closed",
                self.scope_balance
            ));
        } else if self.scope_balance < 0 {
            errors.push(format!(
                "{} suite scope(s) closed without being opened",
                -self.scope_balance
            ));
        }
        errors
    }

    /// Resets every run record to ready. Enabled flags and author labels
    /// survive.
    pub fn clear_results(&mut self) {
        for t in &mut self.tests {
            t.record_mut().clear();
        }
    }

    /// Empties the registry: tests, declaration errors and any open scope.
    /// 清空注册表：测试、声明错误和任何打开的作用域。
    pub fn clear_all(&mut self) {
        self.tests.clear();
        self.decl_errors.clear();
        self.scope.clear();
        self.scope_balance = 0;
        self.has_suites = false;
    }

    /// Fully-qualified names of every registered test, sorted.
    pub fn enumerate_test_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tests.iter().map(|t| t.full_name().to_string()).collect();
        names.sort();
        names
    }

    /// Distinct suite paths in use, sorted. The default suite appears as an
    /// empty string when any test lives there.
    pub fn enumerate_suite_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tests
            .iter()
            .map(|t| t.suite_name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TestBody {
        TestBody::Plain(Box::new(|_| Ok(())))
    }

    fn register(reg: &mut Registry, name: &str) -> bool {
        reg.register(name, TestKind::Plain, "", 0, "", "", noop())
    }

    #[test]
    fn scope_stamps_the_suite_path() {
        let mut reg = Registry::new();
        register(&mut reg, "root");
        reg.begin_suite("outer");
        reg.begin_suite("inner");
        register(&mut reg, "deep");
        reg.end_suite();
        register(&mut reg, "shallow");
        reg.end_suite();

        let names: Vec<&str> = reg.tests().iter().map(|t| t.full_name()).collect();
        assert_eq!(names, vec!["root", "outer::inner::deep", "outer::shallow"]);
        assert!(reg.has_suites());
        assert!(reg.declaration_errors().is_empty());
    }

    #[test]
    fn duplicate_full_name_is_rejected_and_recorded() {
        let mut reg = Registry::new();
        assert!(register(&mut reg, "alpha"));
        assert!(!register(&mut reg, "alpha"));
        assert_eq!(reg.len(), 1);
        let errors = reg.declaration_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("alpha"));
    }

    #[test]
    fn same_short_name_in_different_suites_is_fine() {
        let mut reg = Registry::new();
        assert!(register(&mut reg, "alpha"));
        reg.begin_suite("s");
        assert!(register(&mut reg, "alpha"));
        reg.end_suite();
        assert_eq!(reg.len(), 2);
        assert!(reg.declaration_errors().is_empty());
    }

    #[test]
    fn empty_and_separator_names_are_declaration_errors() {
        let mut reg = Registry::new();
        assert!(!register(&mut reg, "   "));
        assert!(!register(&mut reg, "a::b"));
        assert_eq!(reg.declaration_errors().len(), 2);
    }

    #[test]
    fn unbalanced_scopes_are_reported() {
        let mut reg = Registry::new();
        reg.begin_suite("s");
        assert_eq!(reg.declaration_errors().len(), 1);

        let mut reg = Registry::new();
        reg.end_suite();
        assert_eq!(reg.declaration_errors().len(), 1);
    }

    #[test]
    fn enumeration_is_sorted_and_deduplicated() {
        let mut reg = Registry::new();
        reg.begin_suite("zeta");
        register(&mut reg, "b");
        register(&mut reg, "a");
        reg.end_suite();
        register(&mut reg, "root");

        assert_eq!(
            reg.enumerate_test_names(),
            vec!["root", "zeta::a", "zeta::b"]
        );
        assert_eq!(reg.enumerate_suite_names(), vec!["", "zeta"]);
    }

    #[test]
    fn clear_all_empties_the_registry() {
        let mut reg = Registry::new();
        register(&mut reg, "t");
        register(&mut reg, "t");
        reg.clear_all();
        assert!(reg.is_empty());
        assert!(reg.declaration_errors().is_empty());
    }

    #[test]
    fn exists_is_precise() {
        let mut reg = Registry::new();
        reg.begin_suite("s");
        register(&mut reg, "t");
        reg.end_suite();
        assert!(reg.exists("s::t"));
        assert!(reg.exists("::s::t"));
        assert!(!reg.exists("s::*"));
        assert!(!reg.exists("*"));
        assert!(!reg.exists("t"));
    }
}
