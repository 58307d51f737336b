//! Shared test utilities for kt.

pub mod fixtures;

pub use fixtures::UnitTestFixture;

/// One row of a table-driven test.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

impl<I, E> TestCase<I, E> {
    pub const fn new(name: &'static str, input: I, expected: E) -> Self {
        Self {
            name,
            input,
            expected,
        }
    }
}

/// Run every case and report all mismatches together.
///
/// Cases run in order; a failing row does not stop the rows after it, so one
/// run shows every query or fixture that regressed.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, test_fn: F) -> Result<(), String>
where
    I: std::fmt::Debug,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E,
{
    let total = cases.len();
    let mut failures = Vec::new();
    for case in cases {
        let input = format!("{:?}", case.input);
        let actual = test_fn(case.input);
        if actual == case.expected {
            println!("[TEST] ok   {}", case.name);
        } else {
            println!("[TEST] FAIL {} input={input}", case.name);
            failures.push(format!(
                "'{}': expected {:?}, got {:?}",
                case.name, case.expected, actual
            ));
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} of {total} cases failed:\n  {}",
            failures.len(),
            failures.join("\n  ")
        ))
    }
}
