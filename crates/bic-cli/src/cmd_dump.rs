/// Implementation of `bic dump`.
///
/// Streams the file through a [`ByteInflow`] and decodes one field per
/// layout entry. Text output is printed as each field decodes, so a
/// truncated file still shows every field before the failure.
///
/// # Output format
///
/// ```text
/// 0       u16     300
/// 2       uint    300
/// 4       utf8    "ok"
/// 7       flags8  10100000
/// 8       bytes:2 dead
/// ```
///
/// With `--json` the same fields are printed as one array:
///
/// ```json
/// [{ "offset": 0, "kind": "u16", "value": 300 }, ...]
/// ```
use anyhow::{Context, Result};
use bic_inflow::{ByteInflow, InflowConfig, Value, parse_layout};
use serde::Serialize;

use crate::{DumpArgs, source};

/// One decoded field with its stream position.
#[derive(Serialize)]
struct Entry {
    offset: u64,
    #[serde(flatten)]
    value: Value,
}

/// Run the `bic dump` command.
///
/// # Errors
///
/// Returns an error if the layout does not parse, the file cannot be
/// opened, or a field cannot be decoded.
pub fn run(args: &DumpArgs, verbose: bool) -> Result<()> {
    let kinds = parse_layout(&args.layout).context("invalid --layout")?;
    let file = source::open(&args.file)?;
    let mut inflow: ByteInflow<_> = ByteInflow::open(file, InflowConfig::with_buffer_capacity(args.buffer))
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let mut entries = Vec::with_capacity(kinds.len());
    for (idx, kind) in kinds.iter().enumerate() {
        let offset = inflow.count();
        let value = inflow
            .read_field(*kind)
            .with_context(|| format!("field {idx} ({kind}) at offset {offset}"))?;

        if args.json {
            entries.push(Entry { offset, value });
        } else {
            println!("{offset:<8}{:<8}{value}", kind.to_string());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }

    if verbose {
        eprintln!(
            "buffer {} bytes, consumed {} bytes, {} buffered, end of source: {}",
            inflow.capacity(),
            inflow.count(),
            inflow.buffered(),
            inflow.is_end_of_source()
        );
    }

    Ok(())
}
