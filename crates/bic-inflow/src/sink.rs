//! Recording sinks.
//!
//! Any [`Write`] can receive a recording, `Vec<u8>` being the common case.
//! The two sinks here cover what a plain vector does poorly:
//!
//! - [`ChainSink`] keeps every flushed segment as its own fragment and
//!   hands back a [`ByteChain`], so the segment boundaries created by
//!   compaction stay visible.
//! - [`DigestSink`] hashes the recorded bytes with BLAKE3 and keeps
//!   nothing else, for fingerprinting a region of a large stream.

use std::io::{self, Write};

use bic_wire::ByteChain;
use bytes::Bytes;

/// Collects recorded segments into a [`ByteChain`], one fragment per write.
#[derive(Debug, Default)]
pub struct ChainSink {
  segments: Vec<Bytes>,
  bytes_recorded: usize,
}

impl ChainSink {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Total bytes received so far.
  #[must_use]
  pub fn bytes_recorded(&self) -> usize {
    self.bytes_recorded
  }

  /// Turn the collected segments into a chain.
  ///
  /// An empty recording yields a single empty fragment.
  #[must_use]
  pub fn finish(self) -> ByteChain {
    ByteChain::from_fragments(self.segments)
  }
}

impl Write for ChainSink {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    if !buf.is_empty() {
      self.segments.push(Bytes::copy_from_slice(buf));
      self.bytes_recorded += buf.len();
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Hashes recorded bytes with BLAKE3.
#[derive(Debug, Default)]
pub struct DigestSink {
  hasher: blake3::Hasher,
  bytes_hashed: u64,
}

impl DigestSink {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn bytes_hashed(&self) -> u64 {
    self.bytes_hashed
  }

  /// Digest of everything written so far.
  #[must_use]
  pub fn finalize(&self) -> blake3::Hash {
    self.hasher.finalize()
  }
}

impl Write for DigestSink {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.hasher.update(buf);
    self.bytes_hashed += buf.len() as u64;
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ByteInflow, InflowConfig};
  use std::io::Cursor;

  #[test]
  fn chain_sink_keeps_segments() {
    let mut sink = ChainSink::new();
    sink.write_all(b"ab").unwrap();
    sink.write_all(b"").unwrap();
    sink.write_all(b"cde").unwrap();
    assert_eq!(sink.bytes_recorded(), 5);

    let chain = sink.finish();
    assert_eq!(chain.fragment_lengths(), vec![2, 3]);
    assert_eq!(chain.to_byte_array(), b"abcde");
  }

  #[test]
  fn empty_chain_sink() {
    let chain = ChainSink::new().finish();
    assert_eq!(chain.bytecount(), 0);
    assert_eq!(chain.fragment_count(), 1);
  }

  #[test]
  fn chain_sink_sees_compaction_segments() {
    let data: Vec<u8> = (0..64).collect();
    let mut inflow: ByteInflow<_, ChainSink> =
      ByteInflow::open(Cursor::new(data.clone()), InflowConfig::with_buffer_capacity(16)).unwrap();

    let (bytes, sink) = inflow
      .record(ChainSink::new(), |i| i.get_byte_array(40))
      .unwrap();
    let chain = sink.finish();

    assert_eq!(bytes, &data[..40]);
    assert_eq!(chain.to_byte_array(), &data[..40]);
    assert!(chain.fragment_count() > 1);
  }

  #[test]
  fn digest_matches_direct_hash() {
    let data: Vec<u8> = (0..=255).collect();
    let mut inflow: ByteInflow<_, DigestSink> =
      ByteInflow::open(Cursor::new(data.clone()), InflowConfig::with_buffer_capacity(32)).unwrap();
    inflow.skip(10).unwrap();

    let ((), sink) = inflow.record(DigestSink::new(), |i| i.skip(200)).unwrap();
    assert_eq!(sink.bytes_hashed(), 200);
    assert_eq!(sink.finalize(), blake3::hash(&data[10..210]));
  }
}
