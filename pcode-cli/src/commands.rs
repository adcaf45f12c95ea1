//! CLI command implementations.

use std::fs;

use pcode_common::Program;
use pcode_vm::{Machine, State};

/// Compile a .p0 source file to .pcb binary.
pub fn compile(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: compile requires an input file");
        eprintln!("Usage: pcode compile <input.p0> [-o output.pcb]");
        return Err(1);
    }

    let input = &args[0];
    let output = output_path(args, input, ".p0");

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let compiled = pcode_compiler::compile(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = compiled.program.encode();
    let instr_count = compiled.program.len();

    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "compiled {instr_count} instructions ({} bytes) -> {output}",
        bytes.len()
    );
    Ok(())
}

/// Assemble a .pca text file to .pcb binary.
pub fn asm(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: asm requires an input file");
        eprintln!("Usage: pcode asm <input.pca> [-o output.pcb]");
        return Err(1);
    }

    let input = &args[0];
    let output = output_path(args, input, ".pca");

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let program = pcode_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = program.encode();
    let instr_count = program.len();

    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "assembled {instr_count} instructions ({} bytes) -> {output}",
        bytes.len()
    );
    Ok(())
}

/// Disassemble a .pcb binary to text.
pub fn disasm(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disasm requires an input file");
        eprintln!("Usage: pcode disasm <input.pcb>");
        return Err(1);
    }

    let program = read_binary(&args[0])?;
    print!("{}", pcode_assembler::disassemble(&program));
    Ok(())
}

/// Verify a .pcb binary program.
pub fn verify(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: verify requires an input file");
        eprintln!("Usage: pcode verify <input.pcb>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_binary(input)?;

    match pcode_verifier::verify(&program) {
        Ok(()) => {
            println!("OK: {input} ({} instructions)", program.len());
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            Err(2)
        }
    }
}

/// Verify and execute a program.
///
/// Source files (`.p0`) are compiled first and report every variable's
/// final value; anything else is decoded as a binary and reports the
/// value the top-level return leaves behind.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: pcode run <input.p0|.pcb> [--trace]");
        return Err(1);
    }

    let input = &args[0];
    let trace = args[1..].iter().any(|a| a == "--trace");

    if input.ends_with(".p0") {
        let text = fs::read_to_string(input).map_err(|e| {
            eprintln!("error: cannot read '{input}': {e}");
            1
        })?;
        let compiled = pcode_compiler::compile(&text).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
        check(&compiled.program)?;
        let machine = execute(&compiled.program, trace)?;
        for (name, &offset) in &compiled.symbols {
            if let Some(value) = machine.local(offset) {
                println!("{name} = {value}");
            }
        }
        Ok(())
    } else {
        let program = read_binary(input)?;
        check(&program)?;
        let machine = execute(&program, trace)?;
        // The top-level return parks its value just above the entry base.
        println!("{}", machine.stack()[1]);
        Ok(())
    }
}

// --- Helpers ---

/// Resolve `-o`, defaulting to the input with its extension swapped
/// for `.pcb`.
fn output_path(args: &[String], input: &str, ext: &str) -> String {
    if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if let Some(stem) = input.strip_suffix(ext) {
        format!("{stem}.pcb")
    } else {
        format!("{input}.pcb")
    }
}

/// Read and decode a .pcb binary file.
fn read_binary(path: &str) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })
}

fn check(program: &Program) -> Result<(), i32> {
    if let Err(errors) = pcode_verifier::verify(program) {
        for e in &errors {
            eprintln!("error: {e}");
        }
        return Err(2);
    }
    Ok(())
}

/// Run a program to completion, optionally tracing each instruction
/// to stderr.
fn execute(program: &Program, trace: bool) -> Result<Machine<'_>, i32> {
    let mut machine = Machine::new(program);

    if trace {
        while machine.state() == State::Running {
            let at = machine.p();
            if let Some(instr) = program.instructions.get(at) {
                eprintln!("[{at}] {instr} | b={} t={}", machine.b(), machine.t());
            }
            machine.step().map_err(|e| {
                eprintln!("runtime error: {e}");
                3
            })?;
        }
    } else {
        machine.execute().map_err(|e| {
            eprintln!("runtime error: {e}");
            3
        })?;
    }

    Ok(machine)
}
