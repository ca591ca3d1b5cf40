/// BIC command-line tool: decode, fingerprint, and re-fragment binary
/// files with the byte inflow stack.
///
/// # Command overview
///
/// ```text
/// bic <COMMAND> [OPTIONS]
///
/// Commands:
///   dump     Decode a file as a comma-separated layout of primitive fields
///   digest   BLAKE3-hash a region of a file through a recording session
///   chain    Load a file as a fragment chain and recut it
///   help     Print help information
///
/// Global options:
///   -v, --verbose    Print decoder diagnostics on stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Success                                        |
/// | 1    | Error (missing file, truncated data, etc.)     |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod cmd_chain;
mod cmd_digest;
mod cmd_dump;
mod source;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The BIC (byte inflow and chain) command-line tool.
#[derive(Parser)]
#[command(name = "bic", version, about = "Byte inflow and chain CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print decoder diagnostics (buffer size, bytes consumed, end-of-source).
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decode a file as a sequence of primitive fields.
    Dump(DumpArgs),
    /// Print the BLAKE3 digest of a region of a file.
    Digest(DigestArgs),
    /// Load a file as a fragment chain and recut it.
    Chain(ChainArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `bic dump`.
///
/// Decodes the listed fields in order and prints one line per field:
///
/// ```text
/// 0       u16     300
/// 2       uint    300
/// 4       utf8    "ok"
/// ```
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                               │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ --layout L   │ Comma-separated field kinds, e.g. `u16,uint,utf8`    │
/// │ --json       │ Print a JSON array of `{kind, value}` objects        │
/// │ --buffer N   │ Working buffer size in bytes (default 4096)          │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DumpArgs {
    /// Path to the file to decode.
    pub file: PathBuf,

    /// Comma-separated field kinds to decode in order.
    ///
    /// Recognised kinds: `i8 u8 i16 u16 i32 i64 f32 f64 uint31 uint32
    /// vertex uint str8 utf8 flags8 i32[] i64[] f32[] f64[] bytes:N`.
    #[arg(long)]
    pub layout: String,

    /// Emit JSON instead of aligned text.
    #[arg(long)]
    pub json: bool,

    /// Working buffer size in bytes.
    #[arg(long, default_value_t = bic_inflow::config::DEFAULT_BUFFER_CAPACITY)]
    pub buffer: usize,
}

/// Arguments for `bic digest`.
///
/// Skips `--skip` bytes, records the next `--length` bytes (or the rest of
/// the file) into a hashing sink, and prints the digest with the number of
/// bytes hashed.
#[derive(clap::Args)]
pub struct DigestArgs {
    /// Path to the file to hash.
    pub file: PathBuf,

    /// Bytes to skip before recording starts.
    #[arg(long, default_value_t = 0)]
    pub skip: u64,

    /// Bytes to record. Defaults to the rest of the file.
    #[arg(long)]
    pub length: Option<u64>,
}

/// Arguments for `bic chain`.
///
/// Loads the file as a chain of `--chunk`-sized fragments, recuts it to
/// `--recut`-sized fragments, and prints both shapes.
#[derive(clap::Args)]
pub struct ChainArgs {
    /// Path to the file to load.
    pub file: PathBuf,

    /// Fragment length after recutting.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub recut: u64,

    /// Fragment length used when loading the file.
    #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk: u64,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump(args) => cmd_dump::run(&args, cli.verbose),
        Commands::Digest(args) => cmd_digest::run(&args, cli.verbose),
        Commands::Chain(args) => cmd_chain::run(&args, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
