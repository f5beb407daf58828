//! End-to-end scenarios (spec §8): each one writes a MiniC source file to a
//! temp dir and runs the built binary against it, checking stdout and exit
//! status rather than calling into the library directly.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn source_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("create temp source file");
    f.write_all(contents.as_bytes()).expect("write source");
    f
}

fn minic() -> Command {
    Command::cargo_bin("minic").expect("find minic binary")
}

#[test]
fn arithmetic_precedence_and_end_keyword() {
    let f = source_file("int main() { print(1+2*3); end; }");
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("7 "));
}

#[test]
fn while_loop_counts_down() {
    let f = source_file(
        "int x; int main() { x = 10; while (x > 7) { print(x); x = x - 1; } end; }",
    );
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("10 9 8 "));
}

#[test]
fn user_function_call_with_arguments() {
    let f = source_file("int add(int a, int b) { return a + b; } int main() { print(add(2,3)); end; }");
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("5 "));
}

#[test]
fn for_loop_with_continue() {
    let f = source_file(
        "int main() { int i; for (i=0; i<3; i=i+1) { if (i == 1) continue; print(i); } end; }",
    );
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("0 2 "));
}

#[test]
fn division_by_zero_reports_line_and_exits_with_failure() {
    let f = source_file("int main() { int x; x = 10 / 0; end; }");
    minic()
        .arg(f.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("division by zero in line 1"));
}

#[test]
fn recursive_factorial() {
    let f = source_file(
        "int f(int n) { if (n == 0) return 1; return n * f(n - 1); } int main() { print(f(5)); end; }",
    );
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("120 "));
}

#[test]
fn puts_prints_string_with_trailing_newline() {
    let f = source_file(r#"int main() { puts("hi"); end; }"#);
    minic()
        .arg(f.path())
        .assert()
        .success()
        .stdout(predicate::eq("hi\n"));
}

#[test]
fn missing_main_is_a_usage_failure() {
    let f = source_file("int f() { return 1; }");
    minic().arg(f.path()).assert().failure().code(1);
}

#[test]
fn unreadable_source_path_is_a_usage_failure() {
    minic()
        .arg("/no/such/file-for-minic-tests.mc")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn program_without_end_falls_off_main_and_exits_success() {
    let f = source_file("int main() { int x; x = 1 + 1; }");
    minic().arg(f.path()).assert().success();
}

#[test]
fn putch_writes_the_raw_low_byte_not_its_utf8_encoding() {
    // 200 (0xC8) re-encoded as UTF-8 would be the two bytes 0xC3 0x88;
    // putch must write the single raw byte instead.
    let f = source_file("int main() { putch(200); end; }");
    let output = minic().arg(f.path()).output().expect("run minic");
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![200u8]);
}
