use crate::error::WireError;

/// Maximum number of bytes a variable-length uint can occupy.
///
/// The fifth byte is always terminal, whatever its high bit says, so a
/// uint carries at most 5 × 7 = 35 payload bits.
pub const MAX_UINT_BYTES: usize = 5;

/// Number of bytes [`encode_uint`] emits for `value`.
#[must_use]
pub fn uint_len(value: u32) -> usize {
    let bits = (u32::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(7).max(1)
}

/// Encode a `u32` in the variable-length layout into the provided buffer.
///
/// The layout is the reverse of LEB128: the most significant 7-bit group
/// comes first, and every byte but the last has its high bit set.
///
/// # Returns
///
/// The number of bytes written (1–5).
///
/// # Panics
///
/// Panics if `buf` is shorter than [`uint_len`]`(value)`. A 5-byte buffer
/// is always sufficient.
///
/// # Wire format examples
///
/// | Value        | Encoded bytes                    | Length |
/// |--------------|----------------------------------|--------|
/// | 0            | `[0x00]`                         | 1      |
/// | 127          | `[0x7F]`                         | 1      |
/// | 128          | `[0x81, 0x00]`                   | 2      |
/// | 300          | `[0x82, 0x2C]`                   | 2      |
/// | 16383        | `[0xFF, 0x7F]`                   | 2      |
/// | 16384        | `[0x81, 0x80, 0x00]`             | 3      |
/// | `u32::MAX`   | `[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]` | 5      |
pub fn encode_uint(value: u32, buf: &mut [u8]) -> usize {
    let len = uint_len(value);
    for (i, slot) in buf[..len].iter_mut().enumerate() {
        let shift = 7 * (len - 1 - i);
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = ((value >> shift) & 0x7F) as u8;
        if i + 1 < len {
            byte |= 0x80;
        }
        *slot = byte;
    }
    len
}

/// Decode a variable-length uint from the front of `buf`.
///
/// # Returns
///
/// `(decoded_value, bytes_consumed)` on success.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if the slice ends before a terminal byte.
/// - [`WireError::UintOverflow`] if the accumulated value needs more than
///   32 bits (only possible with a 5-byte encoding).
pub fn decode_uint(buf: &[u8]) -> Result<(u32, usize), WireError> {
    let mut value: u64 = 0;

    for (i, &byte) in buf.iter().take(MAX_UINT_BYTES).enumerate() {
        value = (value << 7) | u64::from(byte & 0x7F);

        // High bit clear ends the run, and the fifth byte ends it unconditionally
        if byte & 0x80 == 0 || i + 1 == MAX_UINT_BYTES {
            let value = u32::try_from(value).map_err(|_| WireError::UintOverflow { value })?;
            return Ok((value, i + 1));
        }
    }

    Err(WireError::UnexpectedEof { offset: buf.len() })
}

/// Whether `byte` tells the reader that another uint byte follows.
#[must_use]
pub fn has_continuation(byte: u8) -> bool {
    byte & 0x80 != 0
}
