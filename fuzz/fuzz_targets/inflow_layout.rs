#![no_main]

use arbitrary::Arbitrary;
use bic_inflow::{ByteInflow, FieldKind, InflowConfig};
use bic_wire::ByteChain;
use libfuzzer_sys::fuzz_target;

// Fuzz target: typed reads over arbitrary bytes.
//
// Any field sequence over any input, buffer size, and fragmentation must
// either decode or fail with an error. It must never panic, hang, or let
// the consumed count run past the input.

#[derive(Arbitrary, Debug)]
struct Input {
    kinds: Vec<u8>,
    capacity: u8,
    chunk: u8,
    data: Vec<u8>,
}

fn kind(selector: u8) -> FieldKind {
    match selector % 20 {
        0 => FieldKind::I8,
        1 => FieldKind::U8,
        2 => FieldKind::I16,
        3 => FieldKind::U16,
        4 => FieldKind::I32,
        5 => FieldKind::I64,
        6 => FieldKind::F32,
        7 => FieldKind::F64,
        8 => FieldKind::Uint31,
        9 => FieldKind::Uint32,
        10 => FieldKind::VertexIndex,
        11 => FieldKind::Uint,
        12 => FieldKind::Str8,
        13 => FieldKind::Utf8,
        14 => FieldKind::Flags8,
        15 => FieldKind::I32Array,
        16 => FieldKind::I64Array,
        17 => FieldKind::F32Array,
        18 => FieldKind::F64Array,
        _ => FieldKind::Bytes(usize::from(selector / 20)),
    }
}

fuzz_target!(|input: Input| {
    let chain = ByteChain::from_chunks(&input.data, usize::from(input.chunk.max(1)));
    let config = InflowConfig::with_buffer_capacity(usize::from(input.capacity));
    let mut inflow: ByteInflow<_> = ByteInflow::new(chain.reader(), config);

    for &selector in input.kinds.iter().take(64) {
        if inflow.read_field(kind(selector)).is_err() {
            break;
        }
    }
    assert!(inflow.count() <= input.data.len() as u64);
});
