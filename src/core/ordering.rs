//! # Ordering Module / 排序模块
//!
//! Computes the execution order of registered tests. The sort is stable:
//! the default suite always comes first, within each suite the setup
//! bucket leads and the teardown bucket trails, and a suite's teardown
//! runs only after every descendant suite has finished. Without the full
//! sort flag, registration order is preserved inside each bucket.
//!
//! 计算已注册测试的执行顺序。排序是稳定的：默认套件始终在最前，
//! 每个套件内 setup 桶领先而 teardown 桶殿后，套件的 teardown
//! 只在所有后代套件完成后运行。未开启完全排序时，
//! 每个桶内保持注册顺序。

use crate::core::model::TestDescriptor;

/// Strict-weak ordering over two tests. Returns true when `a` must run
/// before `b`.
///
/// The target shape, with nesting:
///
/// ```text
/// setup
/// test
/// suiteA::setup
/// suiteA::testA
/// suiteA::zuiteB::setup
/// suiteA::zuiteB::test
/// suiteA::zuiteB::teardown
/// suiteA::teardown
/// teardown
/// ```
fn order_less(a: &TestDescriptor, b: &TestDescriptor, full_sort: bool) -> bool {
    let setup_a = a.is_setup();
    let setup_b = b.is_setup();
    let teardown_a = a.is_teardown();
    let teardown_b = b.is_teardown();
    let sname_a = a.suite_name();
    let sname_b = b.suite_name();
    let tname_a = a.name();
    let tname_b = b.name();
    let tname_lwr_a = tname_a.to_ascii_lowercase();
    let tname_lwr_b = tname_b.to_ascii_lowercase();

    // Teardown trails its own suite and every nested suite below it
    if teardown_a || teardown_b {
        if sname_a == sname_b {
            if !teardown_a || !teardown_b {
                if setup_a || teardown_b {
                    return true;
                }
                if setup_b || teardown_a {
                    return false;
                }
            }

            if tname_lwr_a != tname_lwr_b {
                return tname_lwr_a < tname_lwr_b;
            }
            return tname_a < tname_b;
        }

        if teardown_a && sname_b.starts_with(sname_a) {
            return false;
        }
        if teardown_b && sname_a.starts_with(sname_b) {
            return true;
        }
    }

    // Different suites compare on the lowercased path, ties case-sensitive
    let sname_lwr_a = sname_a.to_ascii_lowercase();
    let sname_lwr_b = sname_b.to_ascii_lowercase();

    if sname_lwr_a != sname_lwr_b {
        return sname_lwr_a < sname_lwr_b;
    }
    if sname_a != sname_b {
        return sname_a < sname_b;
    }

    // Two hooks of the same bucket order by name
    if (setup_a && setup_b) || (teardown_a && teardown_b) {
        if tname_lwr_a != tname_lwr_b {
            return tname_lwr_a < tname_lwr_b;
        }
        return tname_a < tname_b;
    }

    if setup_a || teardown_b {
        return true;
    }
    if setup_b || teardown_a {
        return false;
    }

    if full_sort {
        if tname_lwr_a != tname_lwr_b {
            return tname_lwr_a < tname_lwr_b;
        }
        return tname_a < tname_b;
    }

    false
}

/// Computes the execution order as indices into `tests`. The underlying
/// sort is stable, so equal elements keep their registration order.
///
/// 计算执行顺序并返回 `tests` 的索引。底层排序是稳定的，
/// 相等元素保持注册顺序。
pub fn execution_order(tests: &[TestDescriptor], full_sort: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tests.len()).collect();
    order.sort_by(|&i, &j| {
        if order_less(&tests[i], &tests[j], full_sort) {
            std::cmp::Ordering::Less
        } else if order_less(&tests[j], &tests[i], full_sort) {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{TestBody, TestKind};

    fn case(name: &str, suite: &str) -> TestDescriptor {
        TestDescriptor::new(
            name.to_string(),
            suite.to_string(),
            TestKind::Plain,
            String::new(),
            0,
            String::new(),
            String::new(),
            TestBody::Plain(Box::new(|_| Ok(()))),
        )
    }

    fn ordered_names(tests: &[TestDescriptor], full: bool) -> Vec<String> {
        execution_order(tests, full)
            .into_iter()
            .map(|i| tests[i].full_name().to_string())
            .collect()
    }

    #[test]
    fn nested_teardown_runs_after_descendants() {
        let tests = vec![
            case("teardown", ""),
            case("teardown", "suiteA"),
            case("test", "suiteA::zuiteB"),
            case("teardown", "suiteA::zuiteB"),
            case("setup", "suiteA::zuiteB"),
            case("testA", "suiteA"),
            case("setup", "suiteA"),
            case("test", ""),
            case("setup", ""),
        ];
        assert_eq!(
            ordered_names(&tests, false),
            vec![
                "setup",
                "test",
                "suiteA::setup",
                "suiteA::testA",
                "suiteA::zuiteB::setup",
                "suiteA::zuiteB::test",
                "suiteA::zuiteB::teardown",
                "suiteA::teardown",
                "teardown",
            ]
        );
    }

    #[test]
    fn default_suite_sorts_first() {
        let tests = vec![case("t", "aaa"), case("root", "")];
        assert_eq!(ordered_names(&tests, false), vec!["root", "aaa::t"]);
    }

    #[test]
    fn registration_order_survives_without_full_sort() {
        let tests = vec![
            case("zebra", "s"),
            case("apple", "s"),
            case("mango", "s"),
        ];
        assert_eq!(
            ordered_names(&tests, false),
            vec!["s::zebra", "s::apple", "s::mango"]
        );
    }

    #[test]
    fn full_sort_orders_test_names() {
        let tests = vec![
            case("zebra", "s"),
            case("apple", "s"),
            case("Mango", "s"),
        ];
        assert_eq!(
            ordered_names(&tests, true),
            vec!["s::apple", "s::Mango", "s::zebra"]
        );
    }

    #[test]
    fn suites_compare_case_insensitively_first() {
        let tests = vec![case("t", "Beta"), case("t", "alpha")];
        assert_eq!(ordered_names(&tests, false), vec!["alpha::t", "Beta::t"]);
    }
}
