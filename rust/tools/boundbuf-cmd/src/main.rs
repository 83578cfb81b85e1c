use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Capacity of the buffer in the demonstrated overflow.
const DEFAULT_CAPACITY: i64 = 16;

#[derive(Parser)]
#[command(name = "boundbuf-cmd")]
#[command(about = "Feeds untrusted input through a bounds-checked byte buffer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the input into a fresh buffer and print its content
    Copy {
        /// Buffer capacity in bytes
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY, allow_negative_numbers = true)]
        capacity: i64,

        /// Destination offset of the copy
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,

        /// Copy as a C string, always keeping one byte for the NUL terminator
        #[arg(short = 'z', long)]
        nul_terminate: bool,

        /// Input bytes to copy
        input: String,
    },

    /// Replay the out-of-bounds access pattern of an unchecked heap buffer
    Replay {
        /// Buffer capacity in bytes
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY, allow_negative_numbers = true)]
        capacity: i64,

        /// Input copied into the buffer after the indexed writes
        input: String,
    },

    /// Read bytes at the given offsets and report each result
    Peek {
        /// Buffer capacity in bytes
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY, allow_negative_numbers = true)]
        capacity: i64,

        /// Text copied into the buffer before probing
        #[arg(short, long)]
        fill: Option<String>,

        /// Offsets to read (may be negative)
        #[arg(required = true, allow_negative_numbers = true)]
        offsets: Vec<i64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Copy {
            capacity,
            offset,
            nul_terminate,
            input,
        } => commands::copy::run(input, capacity, offset, nul_terminate),
        Commands::Replay { capacity, input } => commands::replay::run(input, capacity),
        Commands::Peek {
            capacity,
            fill,
            offsets,
        } => commands::peek::run(offsets, capacity, fill),
    }
}
