//! Snapshot tests for layout decoding: text and JSON renderings of decoded
//! fields, and the debug shape of fragment chains.
//!
//! Snapshots are inline so the expected output sits next to the input that
//! produces it. A changed rendering fails here first; accept deliberate
//! changes with `cargo insta review`.

use bic_inflow::{ByteInflow, InflowConfig, Value, parse_layout};
use bic_tests::PayloadBuilder;
use bic_wire::ByteChain;
use insta::{assert_debug_snapshot, assert_snapshot};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Decode `payload` with `layout` and return the values in order.
fn decode(payload: &[u8], layout: &str) -> Vec<Value> {
    let mut inflow: ByteInflow<_> =
        ByteInflow::open(payload, InflowConfig::with_buffer_capacity(16)).unwrap();
    parse_layout(layout)
        .unwrap()
        .into_iter()
        .map(|kind| inflow.read_field(kind).unwrap())
        .collect()
}

/// Render values one per line, the way `bic dump` does without offsets.
fn render(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn sample() -> Vec<u8> {
    PayloadBuilder::new()
        .u8(0xFF)
        .i16(-2)
        .u32(0xFFFF_FFFF)
        .raw(&[0x80, 0, 0, 0, 0, 0, 0, 0x2A])
        .uint(16384)
        .str8("id-7")
        .utf8("naïve")
        .utf8_absent()
        .u8(0b0100_0001)
        .i32_array(&[3, -1, 4])
        .f64_array(&[0.5])
        .raw(&[0xCA, 0xFE, 0xBA, 0xBE])
        .build()
}

const SAMPLE_LAYOUT: &str =
    "i8,i16,uint31,vertex,uint,str8,utf8,utf8,flags8,i32[],f64[],bytes:4";

// ── Text rendering ────────────────────────────────────────────────────────────

#[test]
fn sample_text() {
    let values = decode(&sample(), SAMPLE_LAYOUT);
    assert_snapshot!(render(&values), @r#"
    -1
    -2
    2147483647
    42
    16384
    "id-7"
    "naïve"
    <absent>
    01000001
    [3, -1, 4]
    [0.5]
    cafebabe
    "#);
}

#[test]
fn same_bytes_different_layout() {
    let bytes = PayloadBuilder::new().u32(0x8000_0001).build();
    assert_snapshot!(render(&decode(&bytes, "uint31")), @"1");
    assert_snapshot!(render(&decode(&bytes, "uint32")), @"2147483649");
    assert_snapshot!(render(&decode(&bytes, "i32")), @"-2147483647");
    assert_snapshot!(render(&decode(&bytes, "u16,u16")), @r"
    32768
    1
    ");
}

// ── JSON rendering ────────────────────────────────────────────────────────────

#[test]
fn strings_json() {
    let bytes = PayloadBuilder::new()
        .uint(16384)
        .utf8("naïve")
        .utf8_absent()
        .raw(&[0xCA, 0xFE, 0xBA, 0xBE])
        .build();
    let json = serde_json::to_string(&decode(&bytes, "uint,utf8,utf8,bytes:4")).unwrap();
    assert_snapshot!(json, @r#"[{"kind":"uint","value":16384},{"kind":"utf8","value":"naïve"},{"kind":"utf8","value":null},{"kind":"bytes","value":"cafebabe"}]"#);
}

#[test]
fn arrays_json() {
    let bytes = PayloadBuilder::new().i32_array(&[]).f64_array(&[1.5, -2.0]).build();
    let json = serde_json::to_string(&decode(&bytes, "i32[],f64[]")).unwrap();
    assert_snapshot!(json, @r#"[{"kind":"i32_array","value":[]},{"kind":"f64_array","value":[1.5,-2.0]}]"#);
}

// ── Chain shapes ──────────────────────────────────────────────────────────────

#[test]
fn chain_debug_shape() {
    let parts: [&'static [u8]; 3] = [b"abc", b"defgh", b"ij"];
    let chain = ByteChain::from_fragments(parts);
    assert_debug_snapshot!(chain, @r"
    ByteChain {
        fragments: [
            3,
            5,
            2,
        ],
        bytecount: 10,
    }
    ");
    assert_snapshot!(format!("{:?}", chain.recut(4).fragment_lengths()), @"[4, 4, 2]");
}
