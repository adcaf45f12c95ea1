//! P-code CLI — compile, assemble, verify, and execute.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/decode/compile/assembly error
//! - 2: Verification failure
//! - 3: Runtime fault

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "compile" => commands::compile(&args[2..]),
        "asm" => commands::asm(&args[2..]),
        "disasm" => commands::disasm(&args[2..]),
        "verify" => commands::verify(&args[2..]),
        "run" => commands::run(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: pcode <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compile <input.p0> [-o output.pcb]   Compile source to binary");
    eprintln!("  asm <input.pca> [-o output.pcb]      Assemble text to binary");
    eprintln!("  disasm <input.pcb>                   Disassemble binary to text");
    eprintln!("  verify <input.pcb>                   Verify a binary program");
    eprintln!("  run <input.p0|.pcb> [--trace]        Verify and execute a program");
}
