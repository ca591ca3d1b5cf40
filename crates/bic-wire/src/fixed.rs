//! Fixed-width layouts that need more than `from_be_bytes`.
//!
//! Plain integers and floats are big-endian and decode with the standard
//! `from_be_bytes` constructors. The two "index" encodings reserve their
//! top bit, and flags pack eight booleans into one byte:
//!
//! ```text
//!   uint31       [0x7F & b0, b1, b2, b3]                    → u32 < 2^31
//!   vertex index [0x7F & b0, b1, b2, b3, b4, b5, b6, b7]    → u64 < 2^63
//!   flags8       b7 b6 b5 b4 b3 b2 b1 b0                    → [bool; 8], b7 first
//! ```

/// Width of a `uint31` field in bytes.
pub const UINT31_SIZE: usize = 4;

/// Width of a vertex index field in bytes.
pub const VERTEX_INDEX_SIZE: usize = 8;

/// Decode a `uint31`: big-endian, bit 31 ignored.
#[must_use]
pub fn decode_uint31(bytes: [u8; UINT31_SIZE]) -> u32 {
    u32::from_be_bytes(bytes) & 0x7FFF_FFFF
}

/// Decode a vertex index: big-endian, bit 63 ignored.
#[must_use]
pub fn decode_vertex_index(bytes: [u8; VERTEX_INDEX_SIZE]) -> u64 {
    u64::from_be_bytes(bytes) & 0x7FFF_FFFF_FFFF_FFFF
}

/// Unpack one byte into eight flags, most significant bit first.
#[must_use]
pub fn unpack_flags8(byte: u8) -> [bool; 8] {
    std::array::from_fn(|i| byte & (0x80 >> i) != 0)
}
