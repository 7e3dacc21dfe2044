// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run an Intcode program, printing its output one value per line

use clap::{Parser, ValueEnum};
use intcode_vm::disasm::disassemble;
use intcode_vm::prelude::*;
use log::{LevelFilter, debug};
use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::fs;
use std::io::Write;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

#[derive(PartialEq, Clone, Copy, ValueEnum)]
enum CodeFormat {
    /// decimal values separated by commas, as puzzle inputs are published
    #[value(alias("text"))]
    Ascii,
    /// packed 8-byte words, least significant byte first
    #[value(name("binary-little-endian"), alias("binle"))]
    LittleEndian,
    /// packed 8-byte words, most significant byte first
    #[value(name("binary-big-endian"), alias("binbe"))]
    BigEndian,
}

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));
const INPUT_HELP: &str = "Input values for the program\n\
    either a file containing comma-separated values, or the values themselves";

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode runner", long_about = None)]
struct Args {
    #[arg(long, help = "File containing the program")]
    ram: PathBuf,
    #[arg(short, long, allow_hyphen_values = true)]
    #[arg(help = INPUT_HELP.split_once('\n').unwrap().0)]
    #[arg(long_help = INPUT_HELP)]
    input: Option<String>,
    #[arg(help = "Format of the program file")]
    #[arg(short, long)]
    #[arg(default_value = "ascii")]
    format: CodeFormat,
    #[arg(long = "poke", value_name = "ADDR=VALUE", value_parser = parse_poke)]
    #[arg(help = "Override memory before running (repeatable)")]
    pokes: Vec<(u64, i64)>,
    #[arg(long = "peek", value_name = "ADDR")]
    #[arg(help = "Print memory at ADDR after running (repeatable)")]
    peeks: Vec<u64>,
    #[arg(short, long, help = "Print the program's disassembly instead of running it")]
    disassemble: bool,
    #[arg(long, help = "Run the program on its own thread, feeding it over channels")]
    channel: bool,
    #[arg(short, long, help = "Log each instruction as it executes")]
    verbose: bool,
}

fn parse_poke(s: &str) -> Result<(u64, i64), String> {
    let (addr, val) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {s:?}"))?;
    Ok((
        addr.trim().parse().map_err(|e| format!("bad address {addr:?}: {e}"))?,
        val.trim().parse().map_err(|e| format!("bad value {val:?}: {e}"))?,
    ))
}

fn parse_values(text: &str) -> Result<Vec<i64>, ParseIntError> {
    match text.trim() {
        "" => Ok(Vec::new()),
        text => text.split(',').map(str::trim).map(str::parse).collect(),
    }
}

fn load_words(path: &Path, from_bytes: fn([u8; 8]) -> i64) -> Result<Ram, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    let (words, trailing) = bytes.as_chunks::<8>();
    if let Some(len) = std::num::NonZeroUsize::new(trailing.len()) {
        return Err(Box::new(TrailingBytes(len)));
    }
    Ok(words.iter().copied().map(from_bytes).collect())
}

impl CodeFormat {
    fn load(self, path: &Path) -> Result<Ram, Box<dyn Error>> {
        match self {
            CodeFormat::Ascii => Ok(Ram::load(path)?),
            CodeFormat::LittleEndian => load_words(path, i64::from_le_bytes),
            CodeFormat::BigEndian => load_words(path, i64::from_be_bytes),
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .format(|buf, record| {
            let level = record.level().as_str().chars().next().unwrap_or('?');
            writeln!(
                buf,
                "{level} {}:{} {}",
                record.module_path().unwrap_or("?"),
                record.line().unwrap_or_default(),
                record.args()
            )
        })
        .init();
}

fn run_buffered(mut ram: Ram, input: Vec<i64>) -> Result<(Ram, Vec<i64>), RunFailed> {
    let mut io = BufferedIo::new(input);
    run(&mut ram, &mut io, 0).map_err(RunFailed)?;
    if io.remaining() > 0 {
        debug!("{} input values left unread", io.remaining());
    }
    Ok((ram, io.into_written()))
}

fn run_channel(ram: Ram, input: Vec<i64>) -> Result<(Ram, Vec<i64>), RunFailed> {
    let mut vm = run_async("main", ram);
    for val in input {
        if vm.send(val).is_err() {
            debug!("machine stopped before reading all input");
            break;
        }
    }
    vm.close_input();

    let mut output = Vec::new();
    while let Some(msg) = vm.recv() {
        if let Message::Value(v) = msg {
            output.push(v);
        }
    }
    let ram = vm.join().map_err(RunFailed)?;
    Ok((ram, output))
}

fn main() -> Result<(), DisplayedError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut ram = args.format.load(&args.ram).map_err(DisplayedError)?;
    debug!("loaded {} words from {}", ram.extent(), args.ram.display());
    for &(addr, val) in &args.pokes {
        ram.write(addr, val);
    }

    if args.disassemble {
        print!("{}", disassemble(&ram));
        return Ok(());
    }

    let input = match args.input.as_deref() {
        Some(arg) if Path::new(arg).is_file() => parse_values(&fs::read_to_string(arg)?)?,
        Some(arg) => parse_values(arg)?,
        None => Vec::new(),
    };

    let (ram, output) = if args.channel {
        run_channel(ram, input)?
    } else {
        run_buffered(ram, input)?
    };

    for val in output {
        println!("{val}");
    }
    for addr in args.peeks {
        println!("{addr}: {}", ram.read(addr));
    }
    Ok(())
}

#[derive(Debug)]
struct TrailingBytes(std::num::NonZeroUsize);

impl Display for TrailingBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file ends with {} bytes that don't make up a full word", self.0)
    }
}
impl Error for TrailingBytes {}

#[derive(Debug)]
struct RunFailed(RunError);

impl Display for RunFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program failed: {}", self.0)
    }
}
impl Error for RunFailed {}

/// Returned from `main`, so that failures are reported with their [Display] text rather than
/// their [Debug] representation
struct DisplayedError(Box<dyn Error>);
impl<E: Error + 'static> From<E> for DisplayedError {
    fn from(e: E) -> Self {
        Self(Box::from(e))
    }
}

impl Debug for DisplayedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
