// Lockstep: multi-program line-stepping debugger simulator

use std::path::Path;

use lockstep::debugger::StopCause;
use lockstep::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("lockstep");
        eprintln!("Error: No session file provided");
        eprintln!();
        eprintln!("Usage: {} <session.json>", program_name);
        eprintln!();
        eprintln!("The session file lists the programs to run, their inputs,");
        eprintln!("step sizes, breakpoints and watch expressions.");
        std::process::exit(1);
    }

    let session_file = &args[1];

    if !Path::new(session_file).exists() {
        eprintln!("Error: File '{}' not found", session_file);
        std::process::exit(1);
    }

    let session = match Session::load(session_file) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Session error: {}", e);
            std::process::exit(1);
        }
    };

    let mut debugger = match session.apply() {
        Ok(debugger) => debugger,
        Err(e) => {
            eprintln!("Session error: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("Generating traces for {} program(s)...", session.programs.len());
    if let Err(e) = debugger.start_run() {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    }

    for id in debugger.program_ids().into_iter().map(str::to_string) {
        let length = debugger.trace_length(&id)?;
        println!("Program {}: {} trace state(s)", id, length);
    }

    // Walk to every stop point, printing watch values as we go
    let watch_ids: Vec<u32> = debugger.watches().map(|(id, _)| id).collect();
    loop {
        print_watches(&debugger, &watch_ids);

        match debugger.continue_debug()? {
            StopCause::Breakpoint { program_id, line } => {
                println!("Stopped: breakpoint in {} at line {}", program_id, line);
            }
            StopCause::ConditionalBreakpoint { id } => {
                println!("Stopped: conditional breakpoint {}", id);
            }
            StopCause::EndOfTraces => {
                println!("All traces exhausted.");
                break;
            }
        }

        for id in debugger.program_ids().into_iter().map(str::to_string) {
            if let Some(line) = debugger.current_line(&id)? {
                println!("  {} at line {}", id, line);
            }
        }
    }

    print_watches(&debugger, &watch_ids);
    debugger.end_run();
    Ok(())
}

fn print_watches(debugger: &lockstep::debugger::Debugger, watch_ids: &[u32]) {
    for id in watch_ids {
        match debugger.watch_value(*id) {
            Ok(Some(value)) => println!("  watch {}: {}", id, value),
            Ok(None) => println!("  watch {}: (not applicable)", id),
            Err(e) => println!("  watch {}: error: {}", id, e),
        }
    }
}
