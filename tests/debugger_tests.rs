use lockstep::debugger::expressions::ScopeRange;
use lockstep::debugger::{DebugError, Debugger, ProgramInput, StepMode, StopCause};
use lockstep::interpreter::value::Value;
use lockstep::session::Session;

fn counting_program(id: &str) -> ProgramInput {
    // Lines 1..=3 produce one trace state each
    ProgramInput::new(id, "a = 1;\na = 2;\na = 3;", "")
}

fn launched(programs: Vec<ProgramInput>) -> Debugger {
    let mut debugger = Debugger::new();
    debugger.launch_run(programs).expect("Launch failed");
    debugger
}

#[test]
fn launch_positions_all_cursors_at_the_first_state() {
    let debugger = launched(vec![counting_program("A"), counting_program("B")]);

    assert!(debugger.is_running());
    assert_eq!(debugger.current_line("A").unwrap(), Some(1));
    assert_eq!(debugger.current_line("B").unwrap(), Some(1));
    assert_eq!(debugger.value_of("A", "a").unwrap(), Some(Value::Int(1)));
}

#[test]
fn stepping_operations_require_a_running_debugger() {
    let mut debugger = Debugger::new();

    assert!(matches!(
        debugger.step(StepMode::Sized),
        Err(DebugError::IllegalState { .. })
    ));
    assert!(matches!(
        debugger.single_step("A"),
        Err(DebugError::IllegalState { .. })
    ));
    assert!(matches!(
        debugger.continue_debug(),
        Err(DebugError::IllegalState { .. })
    ));
}

#[test]
fn submitting_programs_requires_edit_mode() {
    let mut debugger = launched(vec![counting_program("A")]);
    let err = debugger.submit_programs(vec![counting_program("A")]);
    assert!(matches!(err, Err(DebugError::IllegalState { .. })));

    // The live run is untouched
    assert!(debugger.is_running());
    assert_eq!(debugger.current_line("A").unwrap(), Some(1));
}

#[test]
fn step_advances_each_program_by_its_own_step_size() {
    let mut debugger = launched(vec![counting_program("A"), counting_program("B")]);
    debugger.set_step_size("A", 2).unwrap();

    debugger.step(StepMode::Sized).unwrap();
    assert_eq!(debugger.current_line("A").unwrap(), Some(3));
    assert_eq!(debugger.current_line("B").unwrap(), Some(2));
}

#[test]
fn step_clamps_at_the_last_state() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.set_step_size("A", 99).unwrap();

    debugger.step(StepMode::Sized).unwrap();
    assert_eq!(debugger.current_line("A").unwrap(), Some(3));
    assert!(debugger.at_end("A").unwrap());

    debugger.step(StepMode::Sized).unwrap();
    assert_eq!(debugger.current_line("A").unwrap(), Some(3));
}

#[test]
fn step_size_below_one_is_raised_to_one() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.set_step_size("A", 0).unwrap();
    assert_eq!(debugger.step_size("A").unwrap(), 1);
}

#[test]
fn single_step_moves_one_program_only() {
    let mut debugger = launched(vec![counting_program("A"), counting_program("B")]);

    debugger.single_step("A").unwrap();
    assert_eq!(debugger.current_line("A").unwrap(), Some(2));
    assert_eq!(debugger.current_line("B").unwrap(), Some(1));
}

#[test]
fn continue_stops_on_a_line_breakpoint() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.create_breakpoint("A", 2).unwrap();

    let cause = debugger.continue_debug().unwrap();
    assert_eq!(
        cause,
        StopCause::Breakpoint {
            program_id: "A".to_string(),
            line: 2
        }
    );
    assert_eq!(debugger.value_of("A", "a").unwrap(), Some(Value::Int(2)));

    // No further breakpoint: runs to the end of all traces
    let cause = debugger.continue_debug().unwrap();
    assert_eq!(cause, StopCause::EndOfTraces);
    assert!(debugger.at_end("A").unwrap());
}

#[test]
fn breakpoint_on_a_finished_programs_last_line_fires_once() {
    // A parks on its breakpoint line while B still has states left
    let short = ProgramInput::new("A", "a = 1;\na = 2;", "");
    let long = ProgramInput::new("B", "a = 1;\na = 2;\na = 3;\na = 4;\na = 5;", "");
    let mut debugger = launched(vec![short, long]);
    debugger.create_breakpoint("A", 2).unwrap();

    let cause = debugger.continue_debug().unwrap();
    assert_eq!(
        cause,
        StopCause::Breakpoint {
            program_id: "A".to_string(),
            line: 2
        }
    );
    assert!(debugger.at_end("A").unwrap());

    // A's cursor no longer moves, so its breakpoint must not re-fire;
    // B runs through to the end of its trace
    let cause = debugger.continue_debug().unwrap();
    assert_eq!(cause, StopCause::EndOfTraces);
    assert!(debugger.at_end("B").unwrap());
    assert_eq!(debugger.current_line("B").unwrap(), Some(5));
}

#[test]
fn deleted_breakpoint_no_longer_stops() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.create_breakpoint("A", 2).unwrap();
    debugger.delete_breakpoint("A", 2).unwrap();

    assert_eq!(debugger.continue_debug().unwrap(), StopCause::EndOfTraces);
}

#[test]
fn continue_stops_on_a_true_conditional_breakpoint() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger
        .create_conditional_breakpoint(7, "A.a == 2", vec![])
        .unwrap();

    let cause = debugger.continue_debug().unwrap();
    assert_eq!(cause, StopCause::ConditionalBreakpoint { id: 7 });
    assert_eq!(debugger.current_line("A").unwrap(), Some(2));
}

#[test]
fn out_of_range_conditional_breakpoint_is_ignored() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger
        .create_conditional_breakpoint(7, "A.a == 2", vec![ScopeRange::new("A", 3, 3)])
        .unwrap();

    // a == 2 only holds at line 2, outside the declared range
    assert_eq!(debugger.continue_debug().unwrap(), StopCause::EndOfTraces);
}

#[test]
fn conditional_stop_interrupts_all_programs_consistently() {
    let mut debugger = launched(vec![counting_program("A"), counting_program("B")]);
    debugger
        .create_conditional_breakpoint(1, "A.a == 3", vec![])
        .unwrap();

    let cause = debugger.continue_debug().unwrap();
    assert_eq!(cause, StopCause::ConditionalBreakpoint { id: 1 });
    // Both cursors sit at the same distance from the start
    assert_eq!(debugger.current_line("A").unwrap(), Some(3));
    assert_eq!(debugger.current_line("B").unwrap(), Some(3));
}

#[test]
fn watch_expression_evaluates_and_changes() {
    let mut debugger = launched(vec![ProgramInput::new("A", "a = 3-2;", "")]);
    debugger.create_watch(1, "3-2", vec![]).unwrap();
    assert_eq!(debugger.watch_value(1).unwrap(), Some("1".to_string()));

    debugger.change_watch(1, "(4%2)+3", vec![]).unwrap();
    assert_eq!(debugger.watch_value(1).unwrap(), Some("3".to_string()));
}

#[test]
fn watch_reads_another_programs_snapshot() {
    let mut debugger = launched(vec![ProgramInput::new("A", "double a = 5.3;", "")]);
    debugger.create_watch(1, "3+A.a", vec![]).unwrap();
    assert_eq!(debugger.watch_value(1).unwrap(), Some("8.3".to_string()));
}

#[test]
fn watch_outside_its_ranges_has_no_value() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger
        .create_watch(1, "A.a", vec![ScopeRange::new("A", 2, 3)])
        .unwrap();

    assert_eq!(debugger.watch_value(1).unwrap(), None);
    debugger.single_step("A").unwrap();
    assert_eq!(debugger.watch_value(1).unwrap(), Some("2".to_string()));
}

#[test]
fn unqualified_watch_reference_is_an_evaluation_error() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.create_watch(1, "a", vec![]).unwrap();
    assert!(matches!(
        debugger.watch_value(1),
        Err(DebugError::Evaluation(_))
    ));
}

#[test]
fn changing_an_unknown_expression_fails() {
    let mut debugger = Debugger::new();
    assert!(matches!(
        debugger.change_watch(9, "1", vec![]),
        Err(DebugError::UnknownExpression { id: 9 })
    ));
    assert!(matches!(
        debugger.delete_conditional_breakpoint(9),
        Err(DebugError::UnknownExpression { id: 9 })
    ));
}

#[test]
fn failed_launch_installs_nothing() {
    let mut debugger = Debugger::new();
    let result = debugger.launch_run(vec![
        counting_program("A"),
        ProgramInput::new("B", "a = b;", ""),
    ]);

    match result {
        Err(DebugError::Generation { program_id, .. }) => assert_eq!(program_id, "B"),
        other => panic!("Expected generation failure, got {:?}", other),
    }
    assert!(!debugger.is_running());
}

#[test]
fn exceeded_ceiling_surfaces_through_launch() {
    let mut debugger = Debugger::new();
    debugger.set_maximum_iterations(2);

    let endless = ProgramInput::new("A", "int i = 0;\nwhile (i < 9) {\ni = i + 1;\n}", "");
    let result = debugger.launch_run(vec![endless]);
    assert!(matches!(result, Err(DebugError::Generation { .. })));
}

#[test]
fn reset_keeps_breakpoints_across_relaunches() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.create_breakpoint("A", 2).unwrap();

    let first = debugger.continue_debug().unwrap();
    debugger.reset();
    assert!(!debugger.is_running());

    debugger.start_run().unwrap();
    let second = debugger.continue_debug().unwrap();
    assert_eq!(first, second);
}

#[test]
fn reset_keeps_watches_and_conditional_breakpoints() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.create_watch(1, "A.a", vec![]).unwrap();
    debugger
        .create_conditional_breakpoint(2, "A.a == 2", vec![])
        .unwrap();

    debugger.end_run();
    debugger.start_run().unwrap();

    assert_eq!(debugger.watch_value(1).unwrap(), Some("1".to_string()));
    assert_eq!(
        debugger.continue_debug().unwrap(),
        StopCause::ConditionalBreakpoint { id: 2 }
    );
}

#[test]
fn inputs_flow_into_the_launched_program() {
    let program = ProgramInput::new("A", "b = a * 2;", " a = 21 ; junk == 1 ");
    let debugger = launched(vec![program]);
    assert_eq!(debugger.value_of("A", "b").unwrap(), Some(Value::Int(42)));
}

#[test]
fn return_value_is_visible_at_the_final_state() {
    let source = "boolean amIRight(int a, long b, double c, char d) {\nreturn true;\n}\nboolean x = false;\nx = amIRight(1, 2L, 3.0, 'c');";
    let mut debugger = launched(vec![ProgramInput::new("A", source, "")]);

    debugger.continue_debug().unwrap();
    assert_eq!(
        debugger.return_value("A").unwrap(),
        Some(Value::Bool(true))
    );
    assert_eq!(debugger.value_of("A", "x").unwrap(), Some(Value::Bool(true)));
}

#[test]
fn session_round_trip_restores_behavior() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.set_step_size("A", 2).unwrap();
    debugger.create_breakpoint("A", 2).unwrap();
    debugger.create_watch(1, "A.a", vec![]).unwrap();
    debugger
        .create_conditional_breakpoint(2, "A.a == 3", vec![ScopeRange::new("A", 1, 3)])
        .unwrap();
    debugger.set_maximum_iterations(50);
    debugger.set_maximum_function_calls(25);

    let json = Session::capture(&debugger).to_json().unwrap();
    let restored = Session::from_json(&json).unwrap();

    let mut replayed = restored.apply().unwrap();
    assert!(!replayed.is_running());
    assert_eq!(replayed.step_size("A").unwrap(), 2);
    assert_eq!(replayed.breakpoints("A").unwrap(), vec![2]);
    assert_eq!(replayed.maximum_iterations(), 50);
    assert_eq!(replayed.maximum_function_calls(), 25);

    replayed.start_run().unwrap();
    assert_eq!(replayed.watch_value(1).unwrap(), Some("1".to_string()));
    assert_eq!(
        replayed.continue_debug().unwrap(),
        StopCause::Breakpoint {
            program_id: "A".to_string(),
            line: 2
        }
    );
}

#[test]
fn captured_session_records_the_last_reached_line() {
    let mut debugger = launched(vec![counting_program("A")]);
    debugger.single_step("A").unwrap();

    let session = Session::capture(&debugger);
    assert_eq!(session.programs[0].last_line, Some(2));
}

#[test]
fn unknown_program_ids_are_rejected() {
    let mut debugger = launched(vec![counting_program("A")]);
    assert!(matches!(
        debugger.single_step("Z"),
        Err(DebugError::UnknownProgram { .. })
    ));
    assert!(matches!(
        debugger.create_breakpoint("Z", 1),
        Err(DebugError::UnknownProgram { .. })
    ));
}
