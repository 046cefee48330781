#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::Context;
use clap::Parser;
use keytab::convert::{Converter, Options};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Convert a JSON lines file into TLV records, tagging field names with
/// small integers in first-seen order.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON lines input, one object per line.
    #[arg(default_value = "test.json")]
    input: PathBuf,

    /// Binary output.
    #[arg(default_value = "binary_tlv_format.bin")]
    output: PathBuf,

    /// Nest each record under tag 0 so record boundaries can be recovered.
    #[arg(long)]
    framed: bool,

    /// Skip malformed lines instead of stopping at the first one.
    #[arg(long)]
    skip_invalid: bool,

    /// Print the field name to tag dictionary after converting.
    #[arg(long)]
    dump_tags: bool,

    /// Log filter, e.g. `info` or `keytab=debug`.
    #[arg(long, env = "JSON2TLV_LOG", default_value = "info")]
    log_level: String,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            skip_invalid: self.skip_invalid,
            framed: self.framed,
        }
    }
}

fn init_logging(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let input = File::open(&args.input)
        .with_context(|| format!("opening input {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("creating output {}", args.output.display()))?;

    let mut converter = Converter::new(args.options());
    let summary = converter
        .run(BufReader::new(input), BufWriter::new(output))
        .with_context(|| format!("converting {}", args.input.display()))?;

    info!(
        records = summary.records,
        skipped_records = summary.skipped_records,
        skipped_values = summary.skipped_values,
        bytes = summary.bytes,
        fields = converter.tags().len(),
        output = %args.output.display(),
        "done"
    );

    if args.dump_tags {
        for (tag, name) in converter.tags().dictionary() {
            println!("{tag}\t{name}");
        }
    }
    Ok(())
}
