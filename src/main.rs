mod logger;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, info_span};

use huffpack::{CodecConfig, HuffmanCodec, SENTINEL};

#[derive(Parser)]
#[command(name = "huffpack", version)]
#[command(about = "Static Huffman file compressor.", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Byte value that always receives one extra count
        #[arg(long, default_value_t = SENTINEL)]
        sentinel: u8,
    },
    /// Decompress a file
    Decode {
        input: PathBuf,
        output: PathBuf,
        /// Original length; trims bytes decoded from the final pad bits
        #[arg(long)]
        length: Option<u64>,
    },
    /// Print the frequency and code tables encode would use
    Table {
        input: PathBuf,
        #[arg(long, default_value_t = SENTINEL)]
        sentinel: u8,
        /// Also print the tree
        #[arg(long)]
        tree: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> huffpack::Result<()> {
    match command {
        Commands::Encode {
            input,
            output,
            sentinel,
        } => {
            let codec = HuffmanCodec::new(CodecConfig::default().with_sentinel(sentinel));
            let span = info_span!("encode", input = %input.display(), output = %output.display());
            let _enter = span.enter();
            let stats = codec.encode_file(&input, &output)?;
            info!(
                bytes_in = stats.bytes_in,
                bytes_out = stats.bytes_out,
                ratio = %format!("{:.1}%", stats.ratio() * 100.0),
                "encoded"
            );
        }
        Commands::Decode {
            input,
            output,
            length,
        } => {
            let mut config = CodecConfig::default();
            if let Some(len) = length {
                config = config.with_expected_len(len);
            }
            let codec = HuffmanCodec::new(config);
            let span = info_span!("decode", input = %input.display(), output = %output.display());
            let _enter = span.enter();
            let stats = codec.decode_file(&input, &output)?;
            info!(
                bytes_in = stats.bytes_in,
                bytes_out = stats.bytes_out,
                "decoded"
            );
        }
        Commands::Table {
            input,
            sentinel,
            tree,
        } => print_table(&input, sentinel, tree)?,
    }
    Ok(())
}

fn print_table(input: &Path, sentinel: u8, tree: bool) -> huffpack::Result<()> {
    let codec = HuffmanCodec::new(CodecConfig::default().with_sentinel(sentinel));
    let analysis = codec.analyze_file(input)?;

    println!("{:>6} {:>12}  code", "byte", "count");
    for (byte, count) in analysis.frequencies.iter() {
        let code = analysis
            .codes
            .get(byte)
            .map(|c| c.to_string())
            .unwrap_or_default();
        println!("{byte:>6} {count:>12}  {code}");
    }
    println!(
        "{} symbols, {} packed bits, {} bytes encoded",
        analysis.frequencies.len(),
        analysis.packed_bits(sentinel),
        analysis.encoded_len(sentinel)
    );
    if tree {
        print!("{}", analysis.tree);
    }
    Ok(())
}
