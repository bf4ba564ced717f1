use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use clap_stdin::FileOrStdin;
use tracing::{debug, Level};

use hydroc::{
    compile_with,
    driver::{self, Toolchain},
    parser::DEFAULT_ARENA_CAPACITY,
    CompileOptions,
};

/// Compile a Hydrogen source file into an x86-64 Linux executable.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Source file, or `-` to read from stdin
    input: FileOrStdin,

    /// Path of the produced executable
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Only write `<output>.asm`, do not assemble or link
    #[arg(short = 'S', long)]
    emit_asm: bool,

    /// Bytes reserved for the syntax tree
    #[arg(long, default_value_t = DEFAULT_ARENA_CAPACITY)]
    arena_size: usize,

    #[arg(long, default_value = "nasm")]
    assembler: String,

    #[arg(long, default_value = "ld")]
    linker: String,

    /// More output per occurrence (info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let source = args
        .input
        .contents()
        .context("failed to read source")?;
    debug!(bytes = source.len(), "loaded source");

    let options = CompileOptions {
        arena_capacity: args.arena_size,
    };
    let asm = compile_with(&source, &options)?;

    let asm_path = driver::write_asm(&asm, &args.output)?;
    if args.emit_asm {
        return Ok(());
    }

    let toolchain = Toolchain {
        assembler: args.assembler,
        linker: args.linker,
    };
    toolchain.build(&asm_path, &args.output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
