//! Command-line entry point (§4.9): load a MiniC source file and run it.

mod error;
mod interpreter;
mod token;

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use error::InterpreterError;
use interpreter::{Interpreter, PROG_SIZE};

/// Interpreter for MiniC, a small imperative subset of C
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Source file to run
    source: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = match fs::read(&args.source) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{}: {err}", args.source);
            return ExitCode::FAILURE;
        }
    };

    if source.len() >= PROG_SIZE {
        let diag = error::diagnose(&source, source.len(), InterpreterError::ProgramTooLarge);
        println!("{diag}");
        return ExitCode::FAILURE;
    }

    let mut interpreter = Interpreter::new(source);
    match interpreter.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}
