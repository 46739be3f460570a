use lockstep::debugger::parse_input_assignments;
use lockstep::interpreter::engine::Interpreter;
use lockstep::interpreter::errors::RuntimeError;
use lockstep::interpreter::value::Value;
use lockstep::parser::parse::Parser;
use lockstep::trace::{TracePosition, TraceState};

fn run_source(
    source: &str,
    input: &str,
    max_iterations: usize,
    max_function_calls: usize,
) -> Result<Vec<TraceState>, RuntimeError> {
    let program = Parser::new(source)
        .expect("Lexing failed")
        .parse_program()
        .expect("Parsing failed");

    let mut interpreter = Interpreter::new("A", program, max_iterations, max_function_calls);
    for (name, value) in parse_input_assignments(input) {
        interpreter.bind_input(&name, value);
    }
    interpreter.run()
}

fn run(source: &str) -> Vec<TraceState> {
    run_source(source, "", 1000, 1000).expect("Execution failed")
}

#[test]
fn single_assignment_produces_single_state() {
    let trace = run("a = 3-2;");

    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].line(), 1);
    assert_eq!(trace[0].position(), TracePosition::Normal);
    assert_eq!(trace[0].snapshot().value_of("a"), Some(&Value::Int(1)));
}

#[test]
fn straight_line_trace_length_equals_statement_count() {
    let trace = run("a = 1;\nb = 2;\nc = a + b;");

    assert_eq!(trace.len(), 3);
    assert_eq!(
        trace.iter().map(|s| s.line()).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(trace[2].snapshot().value_of("c"), Some(&Value::Int(3)));
}

#[test]
fn assigned_value_round_trips_through_variable_reference() {
    let trace = run("a = 41;\nb = a + 1;");
    assert_eq!(
        trace.last().unwrap().snapshot().value_of("b"),
        Some(&Value::Int(42))
    );
}

#[test]
fn typed_declaration_enforces_later_assignments() {
    let err = run_source("int a = 1;\na = true;", "", 1000, 1000).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeMismatch { line: 2, .. }));
}

#[test]
fn unbound_identifier_fails() {
    let err = run_source("a = b + 1;", "", 1000, 1000).unwrap_err();
    match err {
        RuntimeError::IdentifierNotFound { name, line } => {
            assert_eq!(name, "b");
            assert_eq!(line, 1);
        }
        other => panic!("Expected IdentifierNotFound, got {:?}", other),
    }
}

#[test]
fn division_by_zero_is_fatal() {
    let err = run_source("a = 1 / 0;", "", 1000, 1000).unwrap_err();
    assert!(matches!(err, RuntimeError::DivisionByZero { line: 1 }));
}

#[test]
fn double_division_by_zero_yields_infinity() {
    // Promotion makes this a double division, not an integer one
    let trace = run("a = 5.3 / 0;");
    match trace[0].snapshot().value_of("a") {
        Some(Value::Double(d)) => assert!(d.is_infinite()),
        other => panic!("Expected an infinite double, got {:?}", other),
    }
}

#[test]
fn conditional_runs_exactly_one_branch() {
    let trace = run("int a = 1;\nif (a == 1) {\na = 2;\n} else {\na = 3;\n}");

    // The conditional itself emits nothing; only the taken branch does
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[1].line(), 3);
    assert_eq!(trace[1].snapshot().value_of("a"), Some(&Value::Int(2)));
}

#[test]
fn non_boolean_guard_fails() {
    let err = run_source("if (3) {\na = 1;\n}", "", 1000, 1000).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeMismatch { line: 1, .. }));
}

#[test]
fn block_declarations_do_not_leak() {
    let trace = run("int a = 1;\nif (true) {\nint b = 2;\n}\na = 3;");

    let last = trace.last().unwrap().snapshot();
    assert_eq!(last.value_of("a"), Some(&Value::Int(3)));
    assert_eq!(last.value_of("b"), None);
}

#[test]
fn loop_at_exact_iteration_ceiling_succeeds() {
    let source = "int i = 0;\nwhile (i < 3) {\ni = i + 1;\n}";
    let trace = run_source(source, "", 3, 1000).expect("Execution failed");
    assert_eq!(
        trace.last().unwrap().snapshot().value_of("i"),
        Some(&Value::Int(3))
    );
}

#[test]
fn loop_exceeding_iteration_ceiling_fails() {
    let source = "int i = 0;\nwhile (i < 4) {\ni = i + 1;\n}";
    let err = run_source(source, "", 3, 1000).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::MaximumIterationsExceeded { limit: 3, line: 2 }
    ));
}

#[test]
fn iteration_counter_is_shared_across_loops() {
    let source = "int i = 0;\nwhile (i < 2) {\ni = i + 1;\n}\nint j = 0;\nwhile (j < 2) {\nj = j + 1;\n}";
    let err = run_source(source, "", 3, 1000).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::MaximumIterationsExceeded { .. }
    ));
}

#[test]
fn recursion_at_exact_call_ceiling_succeeds() {
    let source = "int f(int n) {\nif (n == 0) {\nreturn 0;\n}\nint r = 0;\nr = f(n - 1);\nreturn r;\n}\nint x = 9;\nx = f(2);";
    // f(2), f(1), f(0): exactly three calls
    let trace = run_source(source, "", 1000, 3).expect("Execution failed");
    assert_eq!(
        trace.last().unwrap().snapshot().value_of("x"),
        Some(&Value::Int(0))
    );
}

#[test]
fn recursion_exceeding_call_ceiling_fails() {
    let source = "int f(int n) {\nif (n == 0) {\nreturn 0;\n}\nint r = 0;\nr = f(n - 1);\nreturn r;\n}\nint x = 9;\nx = f(3);";
    let err = run_source(source, "", 1000, 3).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::MaximumFunctionCallsExceeded { limit: 3, .. }
    ));
}

#[test]
fn routine_with_typed_arguments_returns_through_register() {
    let source = "boolean amIRight(int a, long b, double c, char d) {\nreturn true;\n}\nboolean x = false;\nx = amIRight(1, 2L, 3.0, 'c');";
    let trace = run(source);

    let last = trace.last().unwrap();
    assert_eq!(last.position(), TracePosition::AfterReturn);
    assert_eq!(last.line(), 5);
    assert_eq!(last.snapshot().value_of("x"), Some(&Value::Bool(true)));
    assert_eq!(last.snapshot().return_value(), Some(&Value::Bool(true)));
}

#[test]
fn calling_assignment_requires_declared_target() {
    let source = "int f() {\nreturn 1;\n}\ny = f();";
    let err = run_source(source, "", 1000, 1000).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::IdentifierNotFound { line: 4, .. }
    ));
}

#[test]
fn routine_arity_is_checked() {
    let source = "int f(int n) {\nreturn n;\n}\nint x = 0;\nx = f(1, 2);";
    let err = run_source(source, "", 1000, 1000).unwrap_err();
    match err {
        RuntimeError::ArgumentCountMismatch {
            routine,
            expected,
            got,
            ..
        } => {
            assert_eq!(routine, "f");
            assert_eq!(expected, 1);
            assert_eq!(got, 2);
        }
        other => panic!("Expected ArgumentCountMismatch, got {:?}", other),
    }
}

#[test]
fn return_type_is_checked() {
    let source = "boolean f() {\nreturn 1;\n}\nboolean x = false;\nx = f();";
    let err = run_source(source, "", 1000, 1000).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
}

#[test]
fn routine_parameters_do_not_see_caller_bindings() {
    let source = "int f(int n) {\nreturn n + a;\n}\nint a = 1;\nint x = 0;\nx = f(2);";
    let err = run_source(source, "", 1000, 1000).unwrap_err();
    match err {
        RuntimeError::IdentifierNotFound { name, .. } => assert_eq!(name, "a"),
        other => panic!("Expected IdentifierNotFound, got {:?}", other),
    }
}

#[test]
fn logical_operators_evaluate_both_operands() {
    // With short-circuiting the unbound `c` would never be reached
    let err = run_source("a = true;\nb = a || c;", "", 1000, 1000).unwrap_err();
    match err {
        RuntimeError::IdentifierNotFound { name, line } => {
            assert_eq!(name, "c");
            assert_eq!(line, 2);
        }
        other => panic!("Expected IdentifierNotFound, got {:?}", other),
    }
}

#[test]
fn input_assignments_are_visible_to_the_program() {
    let trace = run_source("b = a * 2;", "a = 21", 1000, 1000).expect("Execution failed");
    assert_eq!(
        trace[0].snapshot().value_of("b"),
        Some(&Value::Int(42))
    );
}

#[test]
fn double_arithmetic_keeps_decimal_formatting() {
    let trace = run("double a = 5.3;\nb = 3 + a;");
    let b = trace.last().unwrap().snapshot().value_of("b").unwrap();
    assert_eq!(b.to_string(), "8.3");
}

#[test]
fn mixed_boolean_expressions_evaluate() {
    let trace = run("a = true || false;\nb = !!true;\nc = (5+3)*2 == 5+3*2;\nd = 3 < 1+3;");

    let last = trace.last().unwrap().snapshot();
    assert_eq!(last.value_of("a"), Some(&Value::Bool(true)));
    assert_eq!(last.value_of("b"), Some(&Value::Bool(true)));
    assert_eq!(last.value_of("c"), Some(&Value::Bool(false)));
    assert_eq!(last.value_of("d"), Some(&Value::Bool(true)));
}

#[test]
fn loop_revisits_lines_in_index_order() {
    let trace = run("int i = 0;\nwhile (i < 2) {\ni = i + 1;\n}");

    // Line numbers repeat; only index order is chronological
    assert_eq!(
        trace.iter().map(|s| s.line()).collect::<Vec<_>>(),
        vec![1, 3, 3]
    );
    assert_eq!(trace[1].snapshot().value_of("i"), Some(&Value::Int(1)));
    assert_eq!(trace[2].snapshot().value_of("i"), Some(&Value::Int(2)));
}
