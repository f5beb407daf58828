use super::Interpreter;
use crate::error::{InterpreterError, RunError};
use crate::token::Code;

fn run_ok(src: &str) -> Interpreter {
    let mut interp = Interpreter::new(src.as_bytes().to_vec());
    interp.run().expect("program should run to completion");
    interp
}

fn global(interp: &Interpreter, name: &str) -> i64 {
    interp
        .globals
        .iter()
        .find(|v| v.name == name)
        .unwrap_or_else(|| panic!("no such global: {name}"))
        .value
}

#[test]
fn empty_expression_evaluates_to_zero() {
    let mut interp = Interpreter::new(b";".to_vec());
    let value = interp.eval_exp().unwrap();
    assert_eq!(value, 0);
}

#[test]
fn call_frame_is_fully_restored_after_return() {
    let interp = run_ok("int g(int n) { int y; y = n + 1; return y; } int main() { int x; x = g(10); }");
    assert_eq!(interp.lvartos, 0);
    assert_eq!(interp.functos, 0);
}

#[test]
fn locals_shadow_globals_without_touching_them() {
    let interp = run_ok(
        "int x; int g_r; \
         int f() { int x; x = 99; return x; } \
         int main() { x = 1; g_r = f(); }",
    );
    assert_eq!(global(&interp, "x"), 1);
    assert_eq!(global(&interp, "g_r"), 99);
}

#[test]
fn recursive_calls_compute_the_right_value() {
    let interp = run_ok(
        "int result; \
         int f(int n) { if (n == 0) return 1; return n * f(n - 1); } \
         int main() { result = f(5); }",
    );
    assert_eq!(global(&interp, "result"), 120);
}

#[test]
fn break_exits_only_the_enclosing_loop() {
    let interp = run_ok(
        "int count; \
         int main() { count = 0; while (count < 10) { count = count + 1; if (count == 3) break; } }",
    );
    assert_eq!(global(&interp, "count"), 3);
}

#[test]
fn continue_skips_the_rest_of_the_for_body() {
    let interp = run_ok(
        "int sum; \
         int main() { int i; sum = 0; for (i=0; i<3; i=i+1) { if (i == 1) continue; sum = sum + i; } }",
    );
    assert_eq!(global(&interp, "sum"), 2);
}

#[test]
fn unbraced_then_branch_skips_only_one_statement() {
    let interp = run_ok(
        "int a; int b; \
         int main() { a = 0; b = 0; if (0) a = 1; b = 2; }",
    );
    assert_eq!(global(&interp, "a"), 0);
    assert_eq!(global(&interp, "b"), 2);
}

#[test]
fn unbraced_then_branch_with_trailing_else_runs_the_else_arm() {
    let interp = run_ok(
        "int taken; int after; \
         int main() { taken = 0; after = 0; if (0) taken = 1; else taken = 2; after = 3; }",
    );
    assert_eq!(global(&interp, "taken"), 2);
    assert_eq!(global(&interp, "after"), 3);
}

#[test]
fn do_while_runs_the_body_at_least_once() {
    let interp = run_ok(
        "int n; \
         int main() { n = 0; do { n = n + 1; } while (n < 3); }",
    );
    assert_eq!(global(&interp, "n"), 3);
}

#[test]
fn division_by_zero_is_a_fatal_error() {
    let mut interp = Interpreter::new(b"int main() { int x; x = 10 / 0; }".to_vec());
    let err = interp.run().unwrap_err();
    match err {
        RunError::Fatal(d) => assert_eq!(d.kind, InterpreterError::DivByZero),
        other => panic!("expected a fatal diagnostic, got {other:?}"),
    }
}

#[test]
fn modulo_by_zero_is_also_a_fatal_error() {
    let mut interp = Interpreter::new(b"int main() { int x; x = 10 % 0; }".to_vec());
    let err = interp.run().unwrap_err();
    match err {
        RunError::Fatal(d) => assert_eq!(d.kind, InterpreterError::DivByZero),
        other => panic!("expected a fatal diagnostic, got {other:?}"),
    }
}

#[test]
fn missing_main_is_reported_distinctly() {
    let mut interp = Interpreter::new(b"int f() { return 1; }".to_vec());
    let err = interp.run().unwrap_err();
    assert_eq!(err, RunError::MainNotFound);
}

#[test]
fn prescan_indexes_functions_and_globals_before_main_runs() {
    let mut interp = Interpreter::new(b"int total; int add(int a, int b) { return a + b; } int main() { }".to_vec());
    interp.prescan().unwrap();
    assert!(interp.find_function("main").is_some());
    assert!(interp.find_function("add").is_some());
    assert!(interp.is_var("total"));
}

#[test]
fn relational_and_arithmetic_precedence() {
    let mut interp = Interpreter::new(b"1 + 2 * 3 < 10".to_vec());
    let value = interp.eval_exp().unwrap();
    assert_eq!(value, 1);
}

#[test]
fn pending_else_is_skipped_when_the_if_branch_ran() {
    let interp = run_ok(
        "int taken; \
         int main() { taken = 0; if (1) { taken = 1; } else { taken = 2; } }",
    );
    assert_eq!(global(&interp, "taken"), 1);
}

#[test]
fn else_branch_runs_when_condition_is_false() {
    let interp = run_ok(
        "int taken; \
         int main() { taken = 0; if (0) { taken = 1; } else { taken = 2; } }",
    );
    assert_eq!(global(&interp, "taken"), 2);
}

#[test]
fn keyword_lookup_is_case_insensitive_but_identifiers_are_not() {
    let mut interp = Interpreter::new(b"IF".to_vec());
    let tok = interp.get_token().unwrap();
    assert_eq!(tok.code, Code::If);
}
