use clap::{Args, Subcommand};
use std::path::PathBuf;

use crcframe_frame::DEFAULT_MAX_PAYLOAD;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one frame from a code and payload.
    Encode(EncodeArgs),
    /// Read frames from a file or stdin and print them.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message code carried in the header.
    #[arg(long, short = 'c', default_value = "0")]
    pub code: u16,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload (whitespace ignored).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Write the frame bytes to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Append to --output instead of truncating it.
    #[arg(long, requires = "output")]
    pub append: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding concatenated frames. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Stop after N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Reject frames declaring a larger payload than this.
    #[arg(long, env = "CRCFRAME_MAX_PAYLOAD", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
