mod common;

use common::run;

#[test]
fn exit_status() {
    assert_eq!(run("exit(42);"), 42);
    assert_eq!(run("exit(0);"), 0);
}

#[test]
fn precedence() {
    assert_eq!(run("exit(1 + 2 * 3);"), 7);
    assert_eq!(run("exit((1 + 2) * 3);"), 9);
    assert_eq!(run("exit(2 * 3 + 4 * 5);"), 26);
}

#[test]
fn left_associativity() {
    assert_eq!(run("exit(10 - 3 - 2);"), 5);
    assert_eq!(run("exit(100 / 10 / 5);"), 2);
    assert_eq!(run("exit(20 / 2 * 5);"), 50);
}

#[test]
fn variables() {
    assert_eq!(run("let x = 4; let y = x * 2; exit(y + x);"), 12);
    assert_eq!(run("let x = 1; x = x + 10; x = x * 2; exit(x);"), 22);
}

#[test]
fn shadowing() {
    assert_eq!(run("let x = 1; { let x = 2; exit(x); }"), 2);
    assert_eq!(run("let x = 1; { let x = 2; } exit(x);"), 1);
    assert_eq!(run("let x = 1; { let y = 5; x = y; } exit(x);"), 5);
}

#[test]
fn assignment_targets_innermost_binding() {
    assert_eq!(run("let x = 1; { let x = 2; x = 9; } exit(x);"), 1);
}

#[test]
fn stack_is_restored_after_scope() {
    let source = "
let a = 3;
{
    let b = 4;
    {
        let c = 5;
        a = a + b + c;
    }
    let d = 100;
}
let e = 7;
exit(a + e);
";
    assert_eq!(run(source), 19);
}

#[test]
fn branching() {
    assert_eq!(run("if (0) { exit(1); } else { exit(2); }"), 2);
    assert_eq!(
        run("if (1) { exit(1); } elif (1) { exit(2); } else { exit(3); }"),
        1
    );
    assert_eq!(
        run("if (0) { exit(1); } elif (1) { exit(2); } else { exit(3); }"),
        2
    );
    assert_eq!(
        run("if (0) { exit(1); } elif (0) { exit(2); } else { exit(3); }"),
        3
    );
}

#[test]
fn elif_without_else_falls_through() {
    assert_eq!(run("if (0) { exit(1); } elif (0) { exit(2); } exit(4);"), 4);
}

#[test]
fn if_without_tail() {
    assert_eq!(run("let x = 5; if (x - 5) { x = 1; } exit(x);"), 5);
    assert_eq!(run("let x = 5; if (x) { x = 1; } exit(x);"), 1);
}

#[test]
fn branch_locals_are_released() {
    let source = "
let x = 2;
if (x - 2) {
    let a = 10;
    x = a;
} elif (x) {
    let b = 20;
    let c = 1;
    x = b + c;
} else {
    x = 0;
}
let y = 3;
exit(x + y);
";
    assert_eq!(run(source), 24);
}

#[test]
fn default_exit_is_zero() {
    assert_eq!(run("if (0) { exit(9); }"), 0);
}

#[test]
fn status_wraps_to_a_byte() {
    assert_eq!(run("exit(256 + 3);"), 3);
}

#[test]
fn negative_division_truncates() {
    assert_eq!(run("exit((0 - 7) / 2 + 10);"), 7);
}

#[test]
fn comments() {
    let source = "
// exit(1);
let x = 2; /* x = 3;
exit(x); */
exit(x);
";
    assert_eq!(run(source), 2);
}
