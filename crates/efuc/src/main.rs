//! The EFU compiler CLI.
//!
//! `efuc [FLAGS] <input-file>` drives the full pipeline: read source,
//! tokenize, parse, type-check, emit for the selected target, write the
//! output file. Options:
//!
//! - `-t, --target <go|js>` - backend selection (default: go)
//! - `-o, --out <path>` - output path; a directory derives the basename
//!   from the input file and appends the target extension
//! - `-r, --run` - spawn the target toolchain on the output after emission
//! - `--runtime <node|bun|deno>` - dynamic-target host used by `--run`
//! - `--debug-ir` - print one line per top-level AST node and exit
//!
//! Exit code 0 on success, 1 on any failure. Diagnostics go to stderr as
//! `<file>:<line>:<col>: [ERROR] <message>` lines.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use efu_common::span::LineIndex;
use efu_parser::debug_ir;
use efu_typeck::diagnostics;

#[derive(Parser)]
#[command(name = "efuc", version, about = "The EFU compiler")]
struct Cli {
    /// Backend to emit
    #[arg(short = 't', long = "target", value_enum, default_value = "go")]
    target: Target,

    /// Output path; a trailing slash or an existing directory derives the
    /// file name from the input
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Spawn the target toolchain on the output after emission
    #[arg(short = 'r', long = "run")]
    run: bool,

    /// Dynamic-target host used by --run
    #[arg(long = "runtime", value_enum, default_value = "node")]
    runtime: Runtime,

    /// Print one line per top-level AST node and exit without emitting
    #[arg(long = "debug-ir")]
    debug_ir: bool,

    /// The EFU source file
    input: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Go,
    Js,
}

impl Target {
    fn extension(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::Js => "js",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Runtime {
    Node,
    Bun,
    Deno,
}

fn main() {
    let cli = Cli::parse();
    match compile(&cli) {
        Ok(code) => process::exit(code),
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    }
}

fn compile(cli: &Cli) -> Result<i32, String> {
    let file = cli.input.display().to_string();
    let source = fs::read_to_string(&cli.input)
        .map_err(|err| format!("cannot read {file}: {err}"))?;
    let index = LineIndex::new(&source);

    let parsed = efu_parser::parse(&source);
    // Lex errors are tolerated (the lexer recovers); still surface them.
    for err in &parsed.lex_errors {
        eprintln!("{}", diagnostics::render_line(&file, &index, err.span, err));
    }
    if !parsed.errors.is_empty() {
        for err in &parsed.errors {
            eprintln!("{}", diagnostics::render_line(&file, &index, err.span, err));
        }
        return Ok(1);
    }
    let mut nodes = parsed.nodes;

    if cli.debug_ir {
        for node in &nodes {
            println!("{}", debug_ir::format_node(node));
        }
        return Ok(0);
    }

    let checked = efu_typeck::check(&mut nodes);
    if !checked.ok() {
        for err in &checked.errors {
            eprintln!("{}", diagnostics::render_type_error(&file, &index, err));
        }
        return Ok(1);
    }

    let output = match cli.target {
        Target::Go => efu_codegen::go::emit(&mut nodes),
        Target::Js => efu_codegen::js::emit(&nodes),
    }
    .map_err(|err| diagnostics::render_line(&file, &index, err.span, &err))?;

    let out_path = output_path(cli);
    fs::write(&out_path, output)
        .map_err(|err| format!("cannot write {}: {err}", out_path.display()))?;

    if cli.run {
        return run_output(cli, &out_path);
    }
    Ok(0)
}

/// Resolve the output path: explicit file, directory + derived name, or the
/// input with the target extension.
fn output_path(cli: &Cli) -> PathBuf {
    let ext = cli.target.extension();
    match &cli.out {
        None => cli.input.with_extension(ext),
        Some(out) => {
            let is_dir = out.as_os_str().to_string_lossy().ends_with('/') || out.is_dir();
            if is_dir {
                let stem = cli
                    .input
                    .file_stem()
                    .map(OsString::from)
                    .unwrap_or_else(|| OsString::from("out"));
                out.join(stem).with_extension(ext)
            } else {
                out.clone()
            }
        }
    }
}

/// Spawn the downstream toolchain on the emitted file and propagate its
/// exit status.
fn run_output(cli: &Cli, path: &Path) -> Result<i32, String> {
    let mut command = match (cli.target, cli.runtime) {
        (Target::Go, _) => {
            let mut cmd = process::Command::new("go");
            cmd.arg("run").arg(path);
            cmd
        }
        (Target::Js, Runtime::Node) => {
            let mut cmd = process::Command::new("node");
            cmd.arg(path);
            cmd
        }
        (Target::Js, Runtime::Bun) => {
            let mut cmd = process::Command::new("bun");
            cmd.arg("run").arg(path);
            cmd
        }
        (Target::Js, Runtime::Deno) => {
            let mut cmd = process::Command::new("deno");
            cmd.arg("run").arg(path);
            cmd
        }
    };
    let status = command
        .status()
        .map_err(|err| format!("cannot spawn {:?}: {err}", command.get_program()))?;
    Ok(status.code().unwrap_or(1))
}
