#![no_main]

use bic_wire::ByteChain;
use libfuzzer_sys::fuzz_target;

// Fuzz target: chain recut invariants.
//
// Recutting any chain to any positive fragment length must keep every
// byte in order, and only the last fragment may be short.
fuzz_target!(|input: (Vec<Vec<u8>>, u8)| {
    let (fragments, k) = input;
    let k = usize::from(k.max(1));
    let chain = ByteChain::from_fragments(fragments);

    let recut = chain.recut(k);
    assert_eq!(recut.bytecount(), chain.bytecount());
    assert_eq!(recut.to_byte_array(), chain.to_byte_array());

    let lengths = recut.fragment_lengths();
    if let Some((_, rest)) = lengths.split_last() {
        assert!(rest.iter().all(|&len| len == k));
    }
});
