// Integration tests for the rafmath pipeline
//
// Each test case feeds one or more lines through lex -> parse -> evaluate
// against a persistent Environment, the way the interactive shell does,
// and checks the printed form of the last line's result.

use rafmath::error::CalcError;
use rafmath::evaluator::Environment;
use rafmath::repl::run_line;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case: a session of input lines and the expected
/// printed output of the last one.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub lines: Vec<String>,
    pub expected_output: Option<String>,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Feeds each line through the pipeline with the trailing space the shell
/// appends, returning the printed form of the last line's value.
fn run_session(lines: &[String]) -> Result<String, CalcError> {
    let mut environment = Environment::new();
    let mut output = String::new();

    for line in lines {
        let mut source = line.clone();
        source.push(' ');
        let value = run_line(&source, &mut environment)?;
        output = value.to_string();
    }

    Ok(output)
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    // Catch any panics to detect crashes
    let result = std::panic::catch_unwind(|| run_session(&test.lines));

    match result {
        Ok(session_result) => match (session_result, test.should_succeed) {
            (Ok(output), true) => {
                if let Some(expected) = &test.expected_output {
                    if &output == expected {
                        TestResult::Pass
                    } else {
                        TestResult::Fail(format!("Expected '{}', got '{}'", expected, output))
                    }
                } else {
                    TestResult::Pass
                }
            }
            (Ok(output), false) => TestResult::Fail(format!(
                "Expected evaluation to fail, but it produced '{}'",
                output
            )),
            (Err(error), false) => {
                if let Some(expected) = &test.expected_error_contains {
                    if error.message.contains(expected) {
                        TestResult::Pass
                    } else {
                        TestResult::Fail(format!(
                            "Error message '{}' doesn't contain expected text '{}'",
                            error.message, expected
                        ))
                    }
                } else {
                    TestResult::Pass // Any error is acceptable
                }
            }
            (Err(error), true) => TestResult::Fail(format!(
                "Expected evaluation to succeed, but got error: {}",
                error.message
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Test case builders for convenience
impl TestCase {
    pub fn evaluates_to(name: &str, input: &str, expected: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: vec![input.to_string()],
            expected_output: Some(expected.to_string()),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn session(name: &str, lines: &[&str], expected: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            expected_output: Some(expected.to_string()),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: vec![input.to_string()],
            expected_output: None,
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: vec![input.to_string()],
            expected_output: None,
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }

    pub fn session_should_fail_with_message(
        name: &str,
        lines: &[&str],
        expected_msg: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            expected_output: None,
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_arithmetic_tests() -> TestSuite {
    let mut suite = TestSuite::new("Arithmetic");

    suite.add_test(TestCase::evaluates_to("addition", "2 + 3", "5"));
    suite.add_test(TestCase::evaluates_to("precedence", "2 + 3 * 4", "14"));
    suite.add_test(TestCase::evaluates_to("parentheses", "(2 + 3) * 4", "20"));
    suite.add_test(TestCase::evaluates_to("unary_minus", "-3", "-3"));
    suite.add_test(TestCase::evaluates_to("nested_unary", "--3", "3"));
    suite.add_test(TestCase::evaluates_to("mixed_unary", "+-3", "-3"));
    suite.add_test(TestCase::evaluates_to("unary_binds_tight", "-2 * 3", "-6"));

    // Integer division floors toward negative infinity
    suite.add_test(TestCase::evaluates_to("int_division_floors", "7 / 2", "3"));
    suite.add_test(TestCase::evaluates_to(
        "negative_int_division_floors",
        "-7 / 2",
        "-4",
    ));
    suite.add_test(TestCase::evaluates_to("float_division", "7 / 2.0", "3.5"));
    suite.add_test(TestCase::evaluates_to(
        "float_division_rounds_display",
        "1 / 3.0",
        "0.333",
    ));
    suite.add_test(TestCase::evaluates_to("modulo", "10 % 3", "1"));
    suite.add_test(TestCase::evaluates_to("float_modulo", "7.5 % 2", "1.5"));
    suite.add_test(TestCase::evaluates_to(
        "int_float_promotion",
        "1 + 2.5",
        "3.5",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "division_by_zero",
        "1 / 0",
        "Division by zero",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "float_division_by_zero",
        "1.0 / 0.0",
        "Division by zero",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "modulo_by_zero",
        "10 % 0",
        "Modulo by zero",
    ));

    suite
}

fn create_function_tests() -> TestSuite {
    let mut suite = TestSuite::new("Functions and Constants");

    // Integer arguments truncate the result back to an integer
    suite.add_test(TestCase::evaluates_to("sqrt_int", "sqrt(4)", "2"));
    suite.add_test(TestCase::evaluates_to("sqrt_float", "sqrt(4.0)", "2.0"));
    suite.add_test(TestCase::evaluates_to("sqrt_truncates", "sqrt(2)", "1"));
    suite.add_test(TestCase::evaluates_to("pow_squares", "pow(3)", "9"));
    suite.add_test(TestCase::evaluates_to("pow_float", "pow(2.5)", "6.25"));
    suite.add_test(TestCase::evaluates_to("log_base_10", "log(100)", "2"));
    suite.add_test(TestCase::evaluates_to("sin_int_truncates", "sin(1)", "0"));
    suite.add_test(TestCase::evaluates_to("sin_float", "sin(1.0)", "0.841"));
    suite.add_test(TestCase::evaluates_to("cos_int", "cos(0)", "1"));
    suite.add_test(TestCase::evaluates_to("tan_float", "tg(1.0)", "1.557"));
    suite.add_test(TestCase::evaluates_to(
        "cot_is_tan_reciprocal",
        "ctg(1.0)",
        "0.642",
    ));
    suite.add_test(TestCase::evaluates_to("radians_to_degrees", "deg(PI )", "180.0"));
    suite.add_test(TestCase::evaluates_to("degrees_to_radians", "rad(180)", "3"));
    suite.add_test(TestCase::evaluates_to("pi_constant", "PI", "3.142"));
    suite.add_test(TestCase::evaluates_to("e_constant", "E", "2.718"));
    suite.add_test(TestCase::evaluates_to(
        "function_argument_expression",
        "sqrt(2 + 2)",
        "2",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "function_missing_closing_paren",
        "sqrt(4",
        "Expected ')' after function argument",
    ));

    suite
}

fn create_comparison_and_shift_tests() -> TestSuite {
    let mut suite = TestSuite::new("Comparisons and Shifts");

    // A statement containing a comparison prints its truth value
    suite.add_test(TestCase::evaluates_to("less_than_true", "3 < 5", "true"));
    suite.add_test(TestCase::evaluates_to("less_than_false", "5 < 3", "false"));
    suite.add_test(TestCase::evaluates_to("greater_than", "5 > 3", "true"));
    suite.add_test(TestCase::evaluates_to("less_equal", "3 <= 3", "true"));
    suite.add_test(TestCase::evaluates_to("greater_equal", "4 >= 5", "false"));
    suite.add_test(TestCase::evaluates_to("equality", "2 == 2", "true"));
    suite.add_test(TestCase::evaluates_to(
        "mixed_type_comparison",
        "2 == 2.0",
        "true",
    ));

    // Right-associative chains AND their outcomes together
    suite.add_test(TestCase::evaluates_to("chained_all_hold", "1 < 2 < 3", "true"));
    suite.add_test(TestCase::evaluates_to(
        "chained_outer_fails",
        "3 < 2 < 5",
        "false",
    ));

    suite.add_test(TestCase::evaluates_to("shift_left", "1 << 3", "8"));
    suite.add_test(TestCase::evaluates_to("shift_right", "16 >> 2", "4"));
    suite.add_test(TestCase::evaluates_to(
        "shift_binds_remainder",
        "1 << 1 + 2",
        "8",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "shift_rejects_double",
        "1.5 << 2",
        "Cannot shift",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "shift_rejects_negative_amount",
        "1 << -2",
        "Shift amount out of range",
    ));

    suite
}

fn create_variable_tests() -> TestSuite {
    let mut suite = TestSuite::new("Variables and Assignment");

    suite.add_test(TestCase::evaluates_to("assignment_yields_value", "x = 5", "5"));
    suite.add_test(TestCase::session("read_after_assign", &["x = 5", "x"], "5"));
    suite.add_test(TestCase::session(
        "assignment_with_expression",
        &["x = 2 + 3 * 4"],
        "14",
    ));
    suite.add_test(TestCase::session(
        "reassignment",
        &["x = 5", "x = x + 1", "x"],
        "6",
    ));

    // Compound assignment fixes its value at parse time
    suite.add_test(TestCase::session("add_assign", &["x = 5", "x += 3"], "8"));
    suite.add_test(TestCase::session(
        "add_assign_persists",
        &["x = 5", "x += 3", "x"],
        "8",
    ));
    suite.add_test(TestCase::session("sub_assign", &["x = 5", "x -= 3", "x"], "2"));
    suite.add_test(TestCase::session("mul_assign", &["x = 5", "x *= 3", "x"], "15"));
    suite.add_test(TestCase::session(
        "div_assign_floors",
        &["x = 7", "x /= 2", "x"],
        "3",
    ));
    suite.add_test(TestCase::session(
        "mul_assign_promotes",
        &["f = 2.5", "f *= 2"],
        "5.0",
    ));
    suite.add_test(TestCase::session(
        "compound_rhs_reads_variables",
        &["x = 4", "x += x", "x"],
        "8",
    ));

    // Float round trip: read back rounded to 3 decimals, idempotently
    suite.add_test(TestCase::session("float_round_trip", &["f = 1 / 3.0", "f"], "0.333"));
    suite.add_test(TestCase::session(
        "float_round_trip_repeated",
        &["f = 1 / 3.0", "f", "f"],
        "0.333",
    ));

    // A comparison on an assignment's right side controls the printed
    // result, but the stored value is the comparison's left operand
    suite.add_test(TestCase::session(
        "assign_comparison_prints_truth",
        &["b = 3 < 5"],
        "true",
    ));
    suite.add_test(TestCase::session(
        "assign_comparison_stores_left_value",
        &["b = 3 < 5", "b"],
        "3",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "undefined_variable",
        "y",
        "Undefined variable",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "compound_assign_to_undefined",
        "y += 1",
        "Undefined variable",
    ));
    suite.add_test(TestCase::session_should_fail_with_message(
        "assignment_mid_expression",
        &["x = 1", "1 + x = 2"],
        "Assignment must start the statement",
    ));

    suite
}

fn create_error_tests() -> TestSuite {
    let mut suite = TestSuite::new("Lex and Parse Errors");

    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_character",
        "2 $ 3",
        "Unexpected character",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "multiple_dots",
        "1.2.3",
        "Invalid number",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "integer_out_of_range",
        "99999999999999999999",
        "Invalid integer",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "trailing_tokens",
        "1 2",
        "after expression",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "assignment_target_not_variable",
        "2 = 3",
        "after expression",
    ));
    suite.add_test(TestCase::should_fail("trailing_operator", "1 +"));
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        "Expected ')' after expression",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        "after expression",
    ));

    suite
}

fn create_scanner_quirk_tests() -> TestSuite {
    let mut suite = TestSuite::new("Scanner Quirks");

    // The bool keyword lookahead never rejects, so `True` reaches the
    // parser as a plain variable read
    suite.add_test(TestCase::should_fail_with_message(
        "bool_keyword_is_a_variable",
        "True",
        "Undefined variable",
    ));
    suite.add_test(TestCase::session(
        "bool_keyword_assignable",
        &["True = 1", "True"],
        "1",
    ));

    // ')' is an identifier character, so `(x)` scans the name as `x)`
    suite.add_test(TestCase::session_should_fail_with_message(
        "closing_paren_joins_identifier",
        &["x = 1", "(x)"],
        "Undefined variable",
    ));
    suite.add_test(TestCase::session(
        "space_before_closing_paren",
        &["x = 1", "(x )"],
        "1",
    ));

    // The same applies to constants used as function arguments
    suite.add_test(TestCase::should_fail_with_message(
        "constant_argument_joins_closing_paren",
        "deg(PI)",
        "Undefined variable",
    ));

    // `tan` is not a keyword; only `tg(` is
    suite.add_test(TestCase::should_fail_with_message(
        "tan_is_not_a_function",
        "tan(1.0)",
        "Undefined variable",
    ));

    // `x ==` lookahead keeps the name a read reference
    suite.add_test(TestCase::session(
        "equality_after_variable",
        &["x = 2", "x == 2"],
        "true",
    ));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_pipeline_tests() {
    let mut all_passed = true;
    let mut failures = Vec::new();

    let suites = vec![
        create_arithmetic_tests(),
        create_function_tests(),
        create_comparison_and_shift_tests(),
        create_variable_tests(),
        create_error_tests(),
        create_scanner_quirk_tests(),
    ];

    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            all_passed = false;
            for (name, result) in &results.results {
                if !matches!(result, TestResult::Pass) {
                    failures.push(format!("{}::{}", results.suite_name, name));
                }
            }
        }
    }

    assert!(all_passed, "failing cases: {}", failures.join(", "));
}
