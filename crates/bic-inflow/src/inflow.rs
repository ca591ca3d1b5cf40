use std::io::{self, Read, Write};

use bic_wire::fixed::{decode_uint31, decode_vertex_index, unpack_flags8};
use bic_wire::varint::{MAX_UINT_BYTES, decode_uint, has_continuation};

use crate::config::InflowConfig;
use crate::error::InflowError;

/// A bit-31-set L32 length marks an absent string.
const ABSENT_LENGTH_BIT: u32 = 1 << 31;

/// Streaming decoder over a blocking byte source.
///
/// `ByteInflow` pulls bytes from any [`Read`] into one fixed-capacity
/// working buffer and hands out typed big-endian values. Before every read
/// it makes sure enough bytes are buffered, sliding unread bytes to the
/// front and refilling from the source when they are not.
///
/// ```text
///   buf  ┌───────────────┬──────────────────┬──────────────┐
///        │   consumed    │      unread      │     free     │
///        └───────────────┴──────────────────┴──────────────┘
///        0              pos               limit        capacity
///
///   count + pos == total bytes consumed since creation
/// ```
///
/// While a recording session is open every consumed byte is also written
/// to the sink `W`, including bytes that pass through compaction.
///
/// The decoder is single-threaded and blocking. It borrows nothing from
/// the source's lifecycle; [`into_inner`](Self::into_inner) hands it back.
///
/// # Example
///
/// ```rust
/// use bic_inflow::{ByteInflow, InflowConfig};
///
/// let bytes = [0x00, 0x2A, 0x81, 0x00, 0x02, b'h', b'i'];
/// let mut inflow: ByteInflow<_> = ByteInflow::open(&bytes[..], InflowConfig::default()).unwrap();
///
/// assert_eq!(inflow.get_u16().unwrap(), 42);
/// assert_eq!(inflow.get_uint().unwrap(), 128);
/// assert_eq!(inflow.get_l32_string_utf8().unwrap().as_deref(), Some("hi"));
/// assert_eq!(inflow.count(), 7);
/// ```
pub struct ByteInflow<R, W = Vec<u8>> {
  source: R,
  buf: Box<[u8]>,
  /// Read cursor into `buf`.
  pos: usize,
  /// End of valid bytes in `buf`.
  limit: usize,
  /// Bytes consumed before the current window.
  count: u64,
  end_of_source: bool,
  recording: Option<Recording<W>>,
  config: InflowConfig,
}

/// An open recording session: the sink plus where in `buf` it started.
struct Recording<W> {
  sink: W,
  start: usize,
}

impl<R: Read, W: Write> ByteInflow<R, W> {
  /// Bind a decoder to `source` without reading anything yet.
  #[must_use]
  pub fn new(source: R, config: InflowConfig) -> Self {
    Self {
      source,
      buf: vec![0u8; config.effective_capacity()].into_boxed_slice(),
      pos: 0,
      limit: 0,
      count: 0,
      end_of_source: false,
      recording: None,
      config,
    }
  }

  /// Bind a decoder to `source` and prefetch the first block.
  ///
  /// # Errors
  ///
  /// Returns [`InflowError::Io`] if the initial read fails.
  pub fn open(source: R, config: InflowConfig) -> Result<Self, InflowError> {
    let mut inflow = Self::new(source, config);
    inflow.prefetch()?;
    Ok(inflow)
  }

  /// Compact and issue one read into the free part of the buffer.
  ///
  /// Unread bytes are kept. Returns how many new bytes arrived.
  ///
  /// # Errors
  ///
  /// Returns [`InflowError::Io`] on a source or recording-sink failure.
  pub fn prefetch(&mut self) -> Result<usize, InflowError> {
    self.compact()?;
    let before = self.limit;
    if !self.end_of_source && self.limit < self.buf.len() {
      self.read_once()?;
    }
    Ok(self.limit - before)
  }

  // ── Buffer management ────────────────────────────────────────────────

  /// Unread bytes currently buffered.
  #[must_use]
  pub fn buffered(&self) -> usize {
    self.limit - self.pos
  }

  /// Size of the working buffer.
  #[must_use]
  pub fn capacity(&self) -> usize {
    self.buf.len()
  }

  /// Whether the source has reported end-of-source. Sticky.
  #[must_use]
  pub fn is_end_of_source(&self) -> bool {
    self.end_of_source
  }

  /// Total bytes consumed since creation, stable across compaction.
  #[must_use]
  pub fn count(&self) -> u64 {
    self.count + self.pos as u64
  }

  /// The configuration this decoder was built with.
  #[must_use]
  pub fn config(&self) -> &InflowConfig {
    &self.config
  }

  /// Release the decoder and return the source.
  ///
  /// Buffered but unread bytes are lost.
  pub fn into_inner(self) -> R {
    self.source
  }

  /// Make sure at least `n` unread bytes are buffered.
  fn ensure(&mut self, n: usize) -> Result<(), InflowError> {
    if n <= self.buffered() {
      return Ok(());
    }
    self.compact()?;
    if n <= self.buf.len() {
      self.refill(n)?;
    }
    if n > self.limit {
      return Err(self.exhausted(n, self.buffered()));
    }
    Ok(())
  }

  /// Retire consumed bytes: fold them into `count`, flush the recording
  /// segment they belong to, and slide unread bytes to the front.
  ///
  /// A sink failure closes the recording session and leaves the window
  /// as it was, so the segment is never written twice.
  fn compact(&mut self) -> Result<(), InflowError> {
    let pos = self.pos;
    if pos == 0 {
      return Ok(());
    }

    // Positions move below, so the recorded segment goes out first
    if let Some(recording) = self.recording.as_mut() {
      match recording.sink.write_all(&self.buf[recording.start..pos]) {
        Ok(()) => recording.start = 0,
        Err(e) => {
          self.recording = None;
          return Err(e.into());
        }
      }
    }

    self.count += pos as u64;
    self.buf.copy_within(pos..self.limit, 0);
    self.limit -= pos;
    self.pos = 0;
    Ok(())
  }

  /// Read until `n` bytes are buffered, the source ends, or the short-read
  /// budget is spent.
  fn refill(&mut self, n: usize) -> Result<(), InflowError> {
    let budget = self.config.effective_read_retries();
    let mut short_reads = 0;
    while self.limit < n && !self.end_of_source && short_reads < budget {
      if self.read_once()? {
        short_reads += 1;
      }
    }
    Ok(())
  }

  /// One source read into the free tail of the buffer.
  ///
  /// Returns `true` for a short read: fewer bytes than offered, an
  /// interrupted read, or end-of-source.
  fn read_once(&mut self) -> Result<bool, InflowError> {
    let free = &mut self.buf[self.limit..];
    let offered = free.len();
    match self.source.read(free) {
      Ok(0) if offered > 0 => {
        self.end_of_source = true;
        Ok(true)
      }
      Ok(read) => {
        self.limit += read;
        Ok(read < offered)
      }
      Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(true),
      Err(e) => Err(e.into()),
    }
  }

  fn exhausted(&self, needed: usize, available: usize) -> InflowError {
    InflowError::Exhausted {
      needed,
      available,
      consumed: self.count(),
    }
  }

  fn take<const N: usize>(&mut self) -> Result<[u8; N], InflowError> {
    self.ensure(N)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&self.buf[self.pos..self.pos + N]);
    self.pos += N;
    Ok(bytes)
  }

  // ── Fixed-width values ───────────────────────────────────────────────

  /// Read one signed byte.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the byte.
  pub fn get_i8(&mut self) -> Result<i8, InflowError> {
    Ok(i8::from_be_bytes(self.take()?))
  }

  /// Read one unsigned byte.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the byte.
  pub fn get_u8(&mut self) -> Result<u8, InflowError> {
    let [byte] = self.take()?;
    Ok(byte)
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 2 bytes can be supplied.
  pub fn get_i16(&mut self) -> Result<i16, InflowError> {
    Ok(i16::from_be_bytes(self.take()?))
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 2 bytes can be supplied.
  pub fn get_u16(&mut self) -> Result<u16, InflowError> {
    Ok(u16::from_be_bytes(self.take()?))
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 4 bytes can be supplied.
  pub fn get_i32(&mut self) -> Result<i32, InflowError> {
    Ok(i32::from_be_bytes(self.take()?))
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 8 bytes can be supplied.
  pub fn get_i64(&mut self) -> Result<i64, InflowError> {
    Ok(i64::from_be_bytes(self.take()?))
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 4 bytes can be supplied.
  pub fn get_f32(&mut self) -> Result<f32, InflowError> {
    Ok(f32::from_be_bytes(self.take()?))
  }

  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 8 bytes can be supplied.
  pub fn get_f64(&mut self) -> Result<f64, InflowError> {
    Ok(f64::from_be_bytes(self.take()?))
  }

  /// Read 4 big-endian bytes with bit 31 ignored, giving `[0, 2^31)`.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 4 bytes can be supplied.
  pub fn get_uint31(&mut self) -> Result<u32, InflowError> {
    Ok(decode_uint31(self.take()?))
  }

  /// Read 4 big-endian bytes as a full 32-bit unsigned value.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 4 bytes can be supplied.
  pub fn get_uint32(&mut self) -> Result<u32, InflowError> {
    Ok(u32::from_be_bytes(self.take()?))
  }

  /// Read an 8-byte vertex index: big-endian, bit 63 ignored.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if fewer than 8 bytes can be supplied.
  pub fn get_vertex_index(&mut self) -> Result<u64, InflowError> {
    Ok(decode_vertex_index(self.take()?))
  }

  /// Read one byte as eight flags, most significant bit first.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the byte.
  pub fn get_flags8(&mut self) -> Result<[bool; 8], InflowError> {
    Ok(unpack_flags8(self.get_u8()?))
  }

  // ── Variable-length values ───────────────────────────────────────────

  /// Read a variable-length uint (1–5 bytes, most significant group first).
  ///
  /// Bytes are pulled one at a time until one has its high bit clear or
  /// the fifth byte is reached.
  ///
  /// # Errors
  ///
  /// - [`InflowError::Exhausted`] if the source ends mid-value.
  /// - [`InflowError::Wire`] with `UintOverflow` if the value needs more
  ///   than 32 bits.
  pub fn get_uint(&mut self) -> Result<u32, InflowError> {
    let mut bytes = [0u8; MAX_UINT_BYTES];
    let mut len = 0;
    loop {
      let byte = self.get_u8()?;
      bytes[len] = byte;
      len += 1;
      if !has_continuation(byte) || len == MAX_UINT_BYTES {
        break;
      }
    }
    let (value, _) = decode_uint(&bytes[..len])?;
    Ok(value)
  }

  /// Read a 1-byte length followed by that many ASCII bytes.
  ///
  /// Bytes outside ASCII decode to U+FFFD.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the bytes.
  pub fn get_l8_string_ascii(&mut self) -> Result<String, InflowError> {
    let length = usize::from(self.get_u8()?);
    let bytes = self.get_byte_array(length)?;
    Ok(
      bytes
        .iter()
        .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
        .collect(),
    )
  }

  /// Read a uint length followed by that many UTF-8 bytes.
  ///
  /// A length with bit 31 set (negative as an `i32`) marks an absent
  /// string and yields `None` with no further bytes consumed. A zero
  /// length yields `Some("")`.
  ///
  /// # Errors
  ///
  /// - [`InflowError::Exhausted`] if the source cannot supply the bytes.
  /// - [`InflowError::InvalidUtf8`] if the bytes are not UTF-8 (they are
  ///   still consumed).
  /// - [`InflowError::Wire`] if the length prefix overflows.
  pub fn get_l32_string_utf8(&mut self) -> Result<Option<String>, InflowError> {
    let length = self.get_uint()?;
    if length & ABSENT_LENGTH_BIT != 0 {
      return Ok(None);
    }

    let offset = self.count();
    let bytes = self.get_byte_array(length as usize)?;
    String::from_utf8(bytes)
      .map(Some)
      .map_err(|_| InflowError::InvalidUtf8 { offset })
  }

  // ── Arrays and raw bytes ─────────────────────────────────────────────

  /// Read a 4-byte count followed by that many `i32`.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends before the last element.
  pub fn get_i32_array(&mut self) -> Result<Vec<i32>, InflowError> {
    self.get_array(i32::from_be_bytes)
  }

  /// Read a 4-byte count followed by that many `i64`.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends before the last element.
  pub fn get_i64_array(&mut self) -> Result<Vec<i64>, InflowError> {
    self.get_array(i64::from_be_bytes)
  }

  /// Read a 4-byte count followed by that many `f32`.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends before the last element.
  pub fn get_f32_array(&mut self) -> Result<Vec<f32>, InflowError> {
    self.get_array(f32::from_be_bytes)
  }

  /// Read a 4-byte count followed by that many `f64`.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends before the last element.
  pub fn get_f64_array(&mut self) -> Result<Vec<f64>, InflowError> {
    self.get_array(f64::from_be_bytes)
  }

  /// Shared array reader: each batch decodes the whole elements already
  /// buffered, or waits for a single element when none are.
  /// A chunked source spends the retry budget per element, not per window.
  fn get_array<T, const N: usize>(&mut self, decode: fn([u8; N]) -> T) -> Result<Vec<T>, InflowError> {
    let count = self.get_uint32()? as usize;
    let per_window = self.buf.len() / N;

    // The count is untrusted until the bytes actually arrive
    let mut values = Vec::with_capacity(count.min(per_window));
    let mut left = count;
    while left > 0 {
      let batch = left.min((self.buffered() / N).max(1));
      self.ensure(batch * N)?;
      for chunk in self.buf[self.pos..self.pos + batch * N].chunks_exact(N) {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(chunk);
        values.push(decode(bytes));
      }
      self.pos += batch * N;
      left -= batch;
    }
    Ok(values)
  }

  /// Read exactly `length` raw bytes.
  ///
  /// `length` may exceed the buffer capacity: buffered bytes are copied
  /// out, the window is retired and refilled, and so on. Bytes already
  /// buffered are always used, even after end-of-source was seen.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends or `retrieve_tries`
  /// short reads pass before `length` bytes arrive. Bytes copied before the
  /// failure are consumed.
  pub fn get_byte_array(&mut self, length: usize) -> Result<Vec<u8>, InflowError> {
    let mut bytes = Vec::with_capacity(length.min(self.buf.len()));
    let mut short_reads = 0;
    loop {
      let take = self.buffered().min(length - bytes.len());
      bytes.extend_from_slice(&self.buf[self.pos..self.pos + take]);
      self.pos += take;

      if bytes.len() == length {
        return Ok(bytes);
      }
      if self.end_of_source || short_reads >= self.config.retrieve_tries {
        return Err(self.exhausted(length, bytes.len()));
      }

      // Window is fully drained here, so compaction empties it
      self.compact()?;
      if self.read_once()? {
        short_reads += 1;
      }
    }
  }

  /// Consume `n` bytes without keeping them.
  ///
  /// Skipped bytes still count and are still recorded.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source ends first. Bytes skipped
  /// before the failure stay consumed.
  pub fn skip(&mut self, mut n: u64) -> Result<(), InflowError> {
    while n > 0 {
      self.ensure(1)?;
      let step = usize::try_from(n).unwrap_or(usize::MAX).min(self.buffered());
      self.pos += step;
      n -= step as u64;
    }
    Ok(())
  }

  /// Consume `sequence.len()` bytes and report whether they equal `sequence`.
  ///
  /// The bytes are consumed whether or not they match; this is not a peek.
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the bytes.
  pub fn is_matching(&mut self, sequence: &[u8]) -> Result<bool, InflowError> {
    let bytes = self.get_byte_array(sequence.len())?;
    Ok(bytes == sequence)
  }

  /// Same as [`is_matching`](Self::is_matching).
  ///
  /// # Errors
  ///
  /// [`InflowError::Exhausted`] if the source cannot supply the bytes.
  pub fn check(&mut self, sequence: &[u8]) -> Result<bool, InflowError> {
    self.is_matching(sequence)
  }

  // ── Recording ────────────────────────────────────────────────────────

  /// Whether a recording session is open.
  #[must_use]
  pub fn is_recording(&self) -> bool {
    self.recording.is_some()
  }

  /// Start mirroring every byte consumed from here on into `sink`.
  ///
  /// # Errors
  ///
  /// [`InflowError::RecordingActive`] if a session is already open. The
  /// open session is left untouched and `sink` is dropped.
  pub fn start_recording(&mut self, sink: W) -> Result<(), InflowError> {
    if self.recording.is_some() {
      return Err(InflowError::RecordingActive);
    }
    self.recording = Some(Recording {
      sink,
      start: self.pos,
    });
    Ok(())
  }

  /// Flush the bytes consumed since the last flush, detach, and return the sink.
  ///
  /// Segments retired by compaction during the session were already
  /// written, so the sink has received exactly the consumed bytes, in order.
  ///
  /// # Errors
  ///
  /// - [`InflowError::NotRecording`] if no session is open.
  /// - [`InflowError::Io`] if the final write fails. The session is
  ///   closed either way.
  pub fn stop_recording(&mut self) -> Result<W, InflowError> {
    let Some(mut recording) = self.recording.take() else {
      return Err(InflowError::NotRecording);
    };
    recording.sink.write_all(&self.buf[recording.start..self.pos])?;
    Ok(recording.sink)
  }

  /// Run `f` inside a recording session and return its value with the sink.
  ///
  /// The session is closed on every exit path. When `f` fails the sink is
  /// dropped along with whatever partial segments it already received.
  ///
  /// ```rust
  /// use bic_inflow::{ByteInflow, InflowConfig};
  ///
  /// let bytes = [0x01, 0x02, 0x03, 0x04];
  /// let mut inflow: ByteInflow<_> = ByteInflow::open(&bytes[..], InflowConfig::default()).unwrap();
  /// inflow.get_u8().unwrap();
  ///
  /// let (value, recorded) = inflow.record(Vec::new(), |i| i.get_u16()).unwrap();
  /// assert_eq!(value, 0x0203);
  /// assert_eq!(recorded, vec![0x02, 0x03]);
  /// assert!(!inflow.is_recording());
  /// ```
  ///
  /// # Errors
  ///
  /// - [`InflowError::RecordingActive`] if a session is already open.
  /// - Any error returned by `f`, or by the final flush.
  pub fn record<T, F>(&mut self, sink: W, f: F) -> Result<(T, W), InflowError>
  where
    F: FnOnce(&mut Self) -> Result<T, InflowError>,
  {
    self.start_recording(sink)?;
    match f(self) {
      Ok(value) => {
        let sink = self.stop_recording()?;
        Ok((value, sink))
      }
      Err(e) => {
        self.recording = None;
        Err(e)
      }
    }
  }
}
