/// Implementation of `bic digest`.
///
/// Opens a recording session with a [`DigestSink`] so only the selected
/// region is hashed, however many buffer compactions it spans.
///
/// # Output format
///
/// ```text
/// 5c1d...e0a2  1048576 bytes
/// ```
use std::fs::File;

use anyhow::{Context, Result};
use bic_inflow::{ByteInflow, DigestSink, InflowConfig, InflowError};

use crate::{DigestArgs, source};

/// Run the `bic digest` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or if it ends before
/// `--skip` plus `--length` bytes.
pub fn run(args: &DigestArgs, verbose: bool) -> Result<()> {
    let file = source::open(&args.file)?;
    let mut inflow: ByteInflow<File, DigestSink> = ByteInflow::open(file, InflowConfig::default())
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    inflow
        .skip(args.skip)
        .with_context(|| format!("cannot skip {} bytes", args.skip))?;

    let ((), sink) = inflow
        .record(DigestSink::new(), |inflow| match args.length {
            Some(length) => inflow.skip(length),
            None => drain(inflow),
        })
        .context("cannot read the region to hash")?;

    println!("{}  {} bytes", sink.finalize().to_hex(), sink.bytes_hashed());

    if verbose {
        eprintln!(
            "buffer {} bytes, consumed {} bytes, end of source: {}",
            inflow.capacity(),
            inflow.count(),
            inflow.is_end_of_source()
        );
    }

    Ok(())
}

/// Consume everything up to end-of-source.
fn drain(inflow: &mut ByteInflow<File, DigestSink>) -> Result<(), InflowError> {
    loop {
        let buffered = inflow.buffered() as u64;
        inflow.skip(buffered)?;
        if inflow.prefetch()? == 0 && inflow.is_end_of_source() {
            return Ok(());
        }
    }
}
