#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: uint encode->decode roundtrip.
//
// Takes 4 bytes of fuzz input as a u32, encodes it, decodes it, and
// asserts both the value and the byte count match.
fuzz_target!(|value: u32| {
    let mut buf = [0u8; bic_wire::varint::MAX_UINT_BYTES];
    let encoded_len = bic_wire::varint::encode_uint(value, &mut buf);

    let (decoded, decoded_len) = bic_wire::varint::decode_uint(&buf[..encoded_len]).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded_len, encoded_len);
});
