//! Property tests over arbitrary values, buffer sizes, and fragmentations.
//!
//! Fixed examples live next to the code in each crate's unit tests. These
//! properties check that the same behaviour holds whatever shape the input
//! arrives in: tiny buffers force compaction on nearly every read, and
//! chunked sources split values across reads.

use bic_inflow::{ByteInflow, ChainSink, InflowConfig};
use bic_tests::PayloadBuilder;
use bic_wire::ByteChain;
use bic_wire::varint::{MAX_UINT_BYTES, decode_uint, encode_uint, uint_len};
use proptest::prelude::*;

fn chunked_inflow(bytes: &[u8], chunk: usize, capacity: usize) -> (ByteChain, InflowConfig) {
    (
        ByteChain::from_chunks(bytes, chunk),
        InflowConfig::with_buffer_capacity(capacity),
    )
}

/// Chains with arbitrary fragment lengths, empty fragments included.
fn arb_chain() -> impl Strategy<Value = ByteChain> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..12), 1..10)
        .prop_map(ByteChain::from_fragments)
}

proptest! {
    // ── Variable-length uint ──────────────────────────────────────────────────

    #[test]
    fn uint_roundtrip(value in any::<u32>()) {
        let mut buf = [0u8; MAX_UINT_BYTES];
        let len = encode_uint(value, &mut buf);
        prop_assert_eq!(len, uint_len(value));
        prop_assert_eq!(decode_uint(&buf[..len]).unwrap(), (value, len));
    }

    #[test]
    fn uint_stream_consumes_exactly_the_encoding(
        values in proptest::collection::vec(any::<u32>(), 1..64),
        chunk in 1usize..9,
        capacity in 16usize..48,
    ) {
        let payload = values
            .iter()
            .fold(PayloadBuilder::new(), |b, &v| b.uint(v))
            .u8(0xEE)
            .build();
        let (chain, config) = chunked_inflow(&payload, chunk, capacity);
        let mut inflow: ByteInflow<_> = ByteInflow::new(chain.reader(), config);

        let mut expected_count = 0u64;
        for &value in &values {
            prop_assert_eq!(inflow.get_uint().unwrap(), value);
            expected_count += uint_len(value) as u64;
            prop_assert_eq!(inflow.count(), expected_count);
        }
        prop_assert_eq!(inflow.get_u8().unwrap(), 0xEE);
    }

    // ── Fixed-width values across compaction ──────────────────────────────────

    #[test]
    fn mixed_fields_survive_any_fragmentation(
        a in any::<i64>(),
        b in any::<f64>(),
        text in "[a-zA-Z0-9 ]{0,40}",
        ints in proptest::collection::vec(any::<i32>(), 0..20),
        chunk in 1usize..7,
        capacity in 16usize..40,
    ) {
        let payload = PayloadBuilder::new()
            .i64(a)
            .f64(b)
            .utf8(&text)
            .i32_array(&ints)
            .str8(&text)
            .build();
        let (chain, config) = chunked_inflow(&payload, chunk, capacity);
        let mut inflow: ByteInflow<_> = ByteInflow::new(chain.reader(), config);

        prop_assert_eq!(inflow.get_i64().unwrap(), a);
        prop_assert_eq!(inflow.get_f64().unwrap().to_bits(), b.to_bits());
        prop_assert_eq!(inflow.get_l32_string_utf8().unwrap(), Some(text.clone()));
        prop_assert_eq!(inflow.get_i32_array().unwrap(), ints);
        prop_assert_eq!(inflow.get_l8_string_ascii().unwrap(), text);
        prop_assert_eq!(inflow.count(), payload.len() as u64);
    }

    // ── Recording ─────────────────────────────────────────────────────────────

    #[test]
    fn recording_equals_consumed_interval(
        data in proptest::collection::vec(any::<u8>(), 64..400),
        lead in 0usize..32,
        reads in proptest::collection::vec(0usize..40, 1..12),
        capacity in 16usize..64,
    ) {
        let mut inflow: ByteInflow<_, ChainSink> =
            ByteInflow::new(&data[..], InflowConfig::with_buffer_capacity(capacity));
        inflow.skip(lead as u64).unwrap();

        inflow.start_recording(ChainSink::new()).unwrap();
        for &n in &reads {
            if inflow.count() as usize + n > data.len() {
                break;
            }
            inflow.get_byte_array(n).unwrap();
        }
        let end = inflow.count() as usize;
        let chain = inflow.stop_recording().unwrap().finish();

        prop_assert_eq!(chain.to_byte_array(), &data[lead..end]);
    }

    // ── Chain recut ───────────────────────────────────────────────────────────

    #[test]
    fn recut_preserves_bytes(chain in arb_chain(), k in 1usize..20) {
        let recut = chain.recut(k);
        prop_assert_eq!(recut.bytecount(), chain.bytecount());
        prop_assert_eq!(recut.flatten(), chain.flatten());

        // Every fragment but the last is exactly k, and none is empty unless
        // the whole chain is
        let lengths = recut.fragment_lengths();
        let (last, rest) = lengths.split_last().unwrap();
        prop_assert!(rest.iter().all(|&len| len == k));
        prop_assert!(*last <= k);
        prop_assert!(*last > 0 || chain.bytecount() == 0);
    }

    #[test]
    fn append_adds_bytecounts(a in arb_chain(), b in arb_chain()) {
        let expected = [a.flatten(), b.flatten()].concat();
        let b_tail_len = b.tail().len();
        let mut a = a;
        let tail = a.append(b);
        prop_assert_eq!(tail.len(), b_tail_len);
        prop_assert_eq!(a.bytecount(), expected.len());
        prop_assert_eq!(a.to_byte_array(), expected);
    }
}
