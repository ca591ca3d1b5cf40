#![no_main]

use arbitrary::Arbitrary;
use bic_inflow::{ByteInflow, InflowConfig};
use libfuzzer_sys::fuzz_target;

// Fuzz target: recording across compaction.
//
// Whatever mix of reads runs inside a session, the recording must equal
// the bytes consumed between start and stop.

#[derive(Arbitrary, Debug)]
struct Input {
    lead: u8,
    reads: Vec<u8>,
    capacity: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let config = InflowConfig::with_buffer_capacity(usize::from(input.capacity));
    let mut inflow: ByteInflow<_> = ByteInflow::new(&input.data[..], config);
    if inflow.skip(u64::from(input.lead)).is_err() {
        return;
    }

    let start = inflow.count() as usize;
    inflow.start_recording(Vec::new()).unwrap();
    for &read in &input.reads {
        let result = match read % 4 {
            0 => inflow.get_u8().map(drop),
            1 => inflow.get_i64().map(drop),
            2 => inflow.get_uint().map(drop),
            _ => inflow.get_byte_array(usize::from(read)).map(drop),
        };
        if result.is_err() {
            break;
        }
    }
    let end = inflow.count() as usize;
    let recorded = inflow.stop_recording().unwrap();
    assert_eq!(recorded, &input.data[start..end]);
});
