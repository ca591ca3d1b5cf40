/// Implementation of `bic chain`.
///
/// Loads the file as a [`ByteChain`] of `--chunk`-sized fragments and
/// recuts it. Fragment lengths are printed run-length encoded.
///
/// # Output format
///
/// ```text
/// loaded:  3 fragments [4096 x2, 1808]  10000 bytes
/// recut:   10 fragments [1000 x10]  10000 bytes
/// ```
use anyhow::{Context, Result, ensure};
use bic_wire::ByteChain;

use crate::{ChainArgs, source};

/// Run the `bic chain` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a length does not fit
/// in memory.
pub fn run(args: &ChainArgs, verbose: bool) -> Result<()> {
    let chunk = usize::try_from(args.chunk).context("--chunk is too large")?;
    let fragment_length = usize::try_from(args.recut).context("--recut is too large")?;

    let bytes = source::read(&args.file)?;
    let loaded = ByteChain::from_chunks(&bytes, chunk);
    let recut = loaded.recut(fragment_length);

    ensure!(
        recut.bytecount() == loaded.bytecount(),
        "recut changed the byte count from {} to {}",
        loaded.bytecount(),
        recut.bytecount()
    );

    print_shape("loaded:", &loaded);
    print_shape("recut:", &recut);

    if verbose {
        let first = recut.window().len();
        let tail = recut.tail().len();
        eprintln!("first fragment {first} bytes, tail fragment {tail} bytes");
    }

    Ok(())
}

fn print_shape(label: &str, chain: &ByteChain) {
    println!(
        "{label:<9}{} fragment{} [{}]  {} bytes",
        chain.fragment_count(),
        if chain.fragment_count() == 1 { "" } else { "s" },
        run_lengths(&chain.fragment_lengths()),
        chain.bytecount()
    );
}

/// `[4, 4, 4, 2]` becomes `4 x3, 2`.
fn run_lengths(lengths: &[usize]) -> String {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &len in lengths {
        match runs.last_mut() {
            Some((last, count)) if *last == len => *count += 1,
            _ => runs.push((len, 1)),
        }
    }
    runs.iter()
        .map(|&(len, count)| {
            if count == 1 {
                len.to_string()
            } else {
                format!("{len} x{count}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
