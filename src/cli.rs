// Command-line front end for oxibr.
//
// Explicit subcommands with long-form options. `decode` streams a Brotli
// file (or stdin) through the staged session decoder; `config` prints the
// build configuration and defaults.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::session::SessionOptions;
use crate::stream::{self, DEFAULT_INPUT_REGION_LEN, DEFAULT_OUTPUT_REGION_LEN, StreamOptions};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound for either staging region.
const MAX_REGION_LEN: u64 = 1 << 30; // 1 GiB

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

fn parse_region_size(s: &str) -> Result<u64, String> {
    let n = parse_byte_size(s)?;
    if n == 0 {
        return Err("region size must be at least 1 byte".into());
    }
    if n > MAX_REGION_LEN {
        return Err(format!("region size {n} exceeds max {MAX_REGION_LEN}"));
    }
    Ok(n)
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Streaming Brotli decoder.
#[derive(Parser, Debug)]
#[command(
    name = "oxibr",
    version,
    about = "Streaming Brotli decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decompress a Brotli stream.
    Decode(DecodeArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Input staging region size (supports K/M/G suffix).
    #[arg(long = "input-buffer-size", value_parser = parse_region_size, default_value_t = DEFAULT_INPUT_REGION_LEN as u64)]
    input_region_len: u64,

    /// Output staging region size (supports K/M/G suffix).
    #[arg(long = "output-buffer-size", value_parser = parse_region_size, default_value_t = DEFAULT_OUTPUT_REGION_LEN as u64)]
    output_region_len: u64,

    /// Reject streams that use the large-window extension.
    #[arg(long = "no-large-window")]
    no_large_window: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Decode,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    large_window: bool,
    input_region_len: usize,
    output_region_len: usize,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let force = cli.force;
    let quiet = cli.quiet;
    let verbose = cli.verbose.min(2);
    let json_output = cli.json_output;

    match cli.command {
        Cmd::Decode(args) => Options {
            command: Command::Decode,
            use_stdout: args.stdout,
            force,
            quiet,
            verbose,
            no_output: args.no_output,
            large_window: !args.no_large_window,
            input_region_len: args.input_region_len as usize,
            output_region_len: args.output_region_len as usize,
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            json_output,
        },
        Cmd::Config => Options {
            command: Command::Config,
            use_stdout: false,
            force,
            quiet,
            verbose,
            no_output: false,
            large_window: SessionOptions::default().large_window,
            input_region_len: DEFAULT_INPUT_REGION_LEN,
            output_region_len: DEFAULT_OUTPUT_REGION_LEN,
            input_file: None,
            output_file: None,
            json_output,
        },
    }
}

fn stream_options(opts: &Options) -> StreamOptions {
    StreamOptions {
        input_region_len: opts.input_region_len,
        output_region_len: opts.output_region_len,
        session: SessionOptions {
            large_window: opts.large_window,
        },
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxibr".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = stream_options(&opts);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config(opts: &Options) -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    let file_io = cfg!(feature = "file-io") as u8;
    let large_window = SessionOptions::default().large_window as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    if opts.json_output {
        let json = serde_json::json!({
            "version": version,
            "file_io": file_io == 1,
            "large_window": large_window == 1,
            "input_region_len": DEFAULT_INPUT_REGION_LEN,
            "output_region_len": DEFAULT_OUTPUT_REGION_LEN,
            "max_region_len": MAX_REGION_LEN,
        });
        eprintln!("{json:#}");
        return 0;
    }

    eprintln!("oxibr version {version} (Rust), Copyright (C) oxibr contributors");
    eprintln!("FILE_IO={file_io}");
    eprintln!("LARGE_WINDOW={large_window}");
    eprintln!("DEFAULT_INPUT_REGION_LEN={DEFAULT_INPUT_REGION_LEN}");
    eprintln!("DEFAULT_OUTPUT_REGION_LEN={DEFAULT_OUTPUT_REGION_LEN}");
    eprintln!("MAX_REGION_LEN={MAX_REGION_LEN}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let mut input_reader: Box<dyn Read> = match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => {
                eprintln!("oxibr: input file: {}: {e}", path.display());
                return 1;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut output_writer: Box<dyn Write> = match (&opts.output_file, opts.no_output) {
        (_, true) => Box::new(io::sink()),
        (Some(path), false) if !opts.use_stdout => {
            if path.exists() && !opts.force {
                eprintln!(
                    "oxibr: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return 1;
            }
            match File::create(path) {
                Ok(f) => Box::new(BufWriter::with_capacity(BUF_SIZE, f)),
                Err(e) => {
                    eprintln!("oxibr: output file: {}: {e}", path.display());
                    return 1;
                }
            }
        }
        _ => Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock())),
    };

    let totals = match stream::pump(&mut input_reader, &mut output_writer, stream_options(opts)) {
        Ok(totals) => totals,
        Err(e) => {
            eprintln!("oxibr: decode error: {e}");
            return 1;
        }
    };
    if let Err(e) = output_writer.flush() {
        eprintln!("oxibr: write flush error: {e}");
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxibr: decoder: input size: {}, output size: {}, steps: {}",
            totals.consumed_input, totals.produced_output, totals.steps
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "input_size": totals.consumed_input,
            "output_size": totals.produced_output,
            "steps": totals.steps,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Decode => cmd_decode(&opts),
        Command::Config => cmd_config(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
