//! # Selector Module / 选择器模块
//!
//! Selector expressions pick tests by name: an exact full name, a suite
//! with `::` (the suite's own tests) or `::*` (the suite and everything
//! below it), the bare wildcard `*` for every test, or `::` for the
//! default suite. Lists of expressions are normalized before use.
//!
//! 选择器表达式按名称挑选测试：精确的完全限定名、带 `::` 的套件
//! （套件自身的测试）或 `::*`（套件及其下的所有内容）、匹配所有测试的
//! 裸通配符 `*`，以及表示默认套件的 `::`。表达式列表在使用前会被规范化。

use crate::core::model::NAME_SEP;

/// Splits a selector list on commas and whitespace, normalizing each item.
///
/// Leading `::` is stripped from items, except the lone `::` which keeps
/// its meaning as the default suite. Empty items vanish. The operation is
/// idempotent: splitting an already-normalized list changes nothing.
///
/// 按逗号和空白拆分选择器列表并规范化每一项。此操作是幂等的。
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            if item == NAME_SEP {
                item.to_string()
            } else {
                item.strip_prefix(NAME_SEP).unwrap_or(item).to_string()
            }
        })
        .collect()
}

/// Tests a single selector expression against a test's identity.
///
/// In precise mode only an exact full-name match counts; wildcards and
/// suite forms are inert.
///
/// 针对测试标识检验单个选择器表达式。精确模式下只有完全限定名的
/// 完全匹配才算命中。
pub fn name_matches(pattern: &str, full_name: &str, suite: &str, precise: bool) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }

    // The default suite designator
    if pattern == NAME_SEP {
        return !precise && suite.is_empty();
    }

    if !precise && (pattern == "*" || pattern == "::*") {
        return true;
    }

    let pattern = pattern.strip_prefix(NAME_SEP).unwrap_or(pattern);

    if pattern == full_name {
        return true;
    }
    if precise {
        return false;
    }

    // "SUITE::*" reaches the suite and all of its descendants
    if let Some(stem) = pattern.strip_suffix('*') {
        if stem.ends_with(NAME_SEP) {
            let mut suite_sep = String::with_capacity(suite.len() + NAME_SEP.len());
            suite_sep.push_str(suite);
            suite_sep.push_str(NAME_SEP);
            return suite.starts_with(stem) || suite_sep == stem;
        }
        return false;
    }

    // "SUITE::" reaches exactly the suite's own tests
    if let Some(stem) = pattern.strip_suffix(NAME_SEP) {
        return suite == stem;
    }

    false
}

/// True if any expression in the list matches the test.
pub fn matches_any(patterns: &[String], full_name: &str, suite: &str, precise: bool) -> bool {
    patterns
        .iter()
        .any(|p| name_matches(p, full_name, suite, precise))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_normalizes_commas_whitespace_and_prefixes() {
        let items = split_list("  alpha, ::beta::t ,, gamma::* \n delta");
        assert_eq!(items, vec!["alpha", "beta::t", "gamma::*", "delta"]);
    }

    #[test]
    fn split_preserves_default_suite_designator() {
        assert_eq!(split_list("::, x"), vec!["::", "x"]);
    }

    #[test]
    fn split_is_idempotent() {
        let once = split_list("a, ::b, c::* ::");
        let again = split_list(&once.join(","));
        assert_eq!(once, again);
    }

    #[test]
    fn wildcard_matches_everything_unless_precise() {
        assert!(name_matches("*", "s::t", "s", false));
        assert!(name_matches("::*", "t", "", false));
        assert!(!name_matches("*", "s::t", "s", true));
    }

    #[test]
    fn exact_full_name_matches_in_both_modes() {
        assert!(name_matches("s::t", "s::t", "s", false));
        assert!(name_matches("s::t", "s::t", "s", true));
        assert!(name_matches("::s::t", "s::t", "s", false));
        assert!(!name_matches("s::t", "s::t2", "s", false));
    }

    #[test]
    fn suite_form_reaches_only_direct_members() {
        assert!(name_matches("s::", "s::t", "s", false));
        assert!(!name_matches("s::", "s::sub::t", "s::sub", false));
        assert!(!name_matches("s::", "s2::t", "s2", false));
    }

    #[test]
    fn suite_star_form_reaches_descendants() {
        assert!(name_matches("s::*", "s::t", "s", false));
        assert!(name_matches("s::*", "s::sub::t", "s::sub", false));
        assert!(!name_matches("s::*", "ss::t", "ss", false));
    }

    #[test]
    fn default_suite_designator_matches_only_root_tests() {
        assert!(name_matches("::", "t", "", false));
        assert!(!name_matches("::", "s::t", "s", false));
    }

    #[test]
    fn empty_pattern_never_matches() {
        assert!(!name_matches("", "t", "", false));
        assert!(!name_matches("   ", "t", "", false));
    }
}
