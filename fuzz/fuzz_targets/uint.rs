#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: variable-length uint decoding.
//
// Catches bugs in:
// - Zero-length and truncated input
// - Fifth-byte termination with the high bit set
// - Values above u32::MAX
fuzz_target!(|data: &[u8]| {
    if let Ok((_, consumed)) = bic_wire::varint::decode_uint(data) {
        assert!(consumed >= 1 && consumed <= bic_wire::varint::MAX_UINT_BYTES);
        assert!(consumed <= data.len());
    }
});
