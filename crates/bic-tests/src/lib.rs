//! Shared fixtures for the integration tests and benches.
//!
//! - [`PayloadBuilder`] writes the wire encodings a [`ByteInflow`] reads.
//! - [`Trickle`], [`Stutter`] and [`Interrupted`] are sources that
//!   misbehave the way sockets and pipes do.
//!
//! [`ByteInflow`]: bic_inflow::ByteInflow

use std::io::{self, Read};

use bic_wire::varint::{MAX_UINT_BYTES, encode_uint};

/// Builds a byte payload field by field, in the encodings `ByteInflow` reads.
#[derive(Default)]
pub struct PayloadBuilder {
    buf: Vec<u8>,
}

impl PayloadBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn u8(mut self, value: u8) -> Self {
        self.buf.push(value);
        self
    }

    #[must_use]
    pub fn i16(mut self, value: i16) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn u16(mut self, value: u16) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn i32(mut self, value: i32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn u32(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn i64(mut self, value: i64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn f32(mut self, value: f32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    #[must_use]
    pub fn f64(mut self, value: f64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Variable-length uint.
    #[must_use]
    pub fn uint(mut self, value: u32) -> Self {
        let mut bytes = [0u8; MAX_UINT_BYTES];
        let len = encode_uint(value, &mut bytes);
        self.buf.extend_from_slice(&bytes[..len]);
        self
    }

    /// 1-byte length + ASCII bytes.
    ///
    /// # Panics
    ///
    /// Panics if `text` is longer than 255 bytes.
    #[must_use]
    pub fn str8(self, text: &str) -> Self {
        let len = u8::try_from(text.len()).expect("str8 text longer than 255 bytes");
        self.u8(len).raw(text.as_bytes())
    }

    /// `uint` length + UTF-8 bytes.
    ///
    /// # Panics
    ///
    /// Panics if `text` is 2 GiB or longer.
    #[must_use]
    pub fn utf8(self, text: &str) -> Self {
        let len = u32::try_from(text.len()).expect("utf8 text too long");
        assert!(len < 1 << 31, "utf8 text too long");
        self.uint(len).raw(text.as_bytes())
    }

    /// The absent-string marker: a length of -1.
    #[must_use]
    pub fn utf8_absent(self) -> Self {
        self.uint(u32::MAX)
    }

    /// # Panics
    ///
    /// Panics if `values` has more than `u32::MAX` elements.
    #[must_use]
    pub fn i32_array(self, values: &[i32]) -> Self {
        let count = u32::try_from(values.len()).expect("array too long");
        values.iter().fold(self.u32(count), |b, &v| b.i32(v))
    }

    /// # Panics
    ///
    /// Panics if `values` has more than `u32::MAX` elements.
    #[must_use]
    pub fn i64_array(self, values: &[i64]) -> Self {
        let count = u32::try_from(values.len()).expect("array too long");
        values.iter().fold(self.u32(count), |b, &v| b.i64(v))
    }

    /// # Panics
    ///
    /// Panics if `values` has more than `u32::MAX` elements.
    #[must_use]
    pub fn f64_array(self, values: &[f64]) -> Self {
        let count = u32::try_from(values.len()).expect("array too long");
        values.iter().fold(self.u32(count), |b, &v| b.f64(v))
    }

    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Hands out at most `step` bytes per read.
pub struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl Trickle {
    /// # Panics
    ///
    /// Panics if `step` is zero.
    #[must_use]
    pub fn new(data: Vec<u8>, step: usize) -> Self {
        assert!(step > 0, "step must be non-zero");
        Self { data, pos: 0, step }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Alternates an interrupted read with a full read.
pub struct Stutter {
    data: Vec<u8>,
    pos: usize,
    interrupt_next: bool,
}

impl Stutter {
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            interrupt_next: true,
        }
    }
}

impl Read for Stutter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if !self.interrupt_next {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "stutter"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Never delivers a byte: every read is interrupted.
pub struct Interrupted;

impl Read for Interrupted {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"))
    }
}

/// Deterministic non-repeating-looking bytes for order checks.
#[must_use]
pub fn sequence(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}
