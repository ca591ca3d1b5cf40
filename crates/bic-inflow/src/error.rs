use std::io;

use bic_wire::WireError;

/// Errors that can occur while pulling typed values from a [`ByteInflow`].
///
/// Every failure is fatal to the read that raised it but not to the
/// decoder: [`ByteInflow::count`] stays accurate and further reads may be
/// attempted. Retries against the source are internal and never surface
/// here except as [`Exhausted`](Self::Exhausted) once they run out.
///
/// ```text
///   InflowError
///   ├── Exhausted          ← source ended or retries ran out before enough bytes arrived
///   ├── RecordingActive    ← start_recording while a session is open
///   ├── NotRecording       ← stop_recording with no session open
///   ├── InvalidUtf8        ← L32 string bytes are not UTF-8
///   ├── Wire(WireError)    ← uint overflow and other wire-level faults
///   └── Io(std::io::Error) ← from the source or the recording sink
/// ```
///
/// [`ByteInflow`]: crate::ByteInflow
/// [`ByteInflow::count`]: crate::ByteInflow::count
#[derive(Debug, thiserror::Error)]
pub enum InflowError {
    /// Not enough bytes arrived to satisfy a read.
    ///
    /// Also covers length-prefixed fields whose declared length exceeds
    /// what the source can supply.
    #[error("source exhausted: read of {needed} bytes had {available} available after {consumed} bytes consumed")]
    Exhausted {
        needed: usize,
        available: usize,
        consumed: u64,
    },

    /// A recording session is already open on this decoder.
    #[error("a recording session is already active")]
    RecordingActive,

    /// `stop_recording` was called with no session open.
    #[error("no recording session is active")]
    NotRecording,

    /// A UTF-8 string field held invalid bytes.
    ///
    /// `offset` is the stream position of the first string byte.
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 { offset: u64 },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl InflowError {
    /// Whether the failure means the source ran dry.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Collapse into the single I/O failure signal loaders expect.
impl From<InflowError> for io::Error {
    fn from(e: InflowError) -> Self {
        let kind = match &e {
            InflowError::Exhausted { .. } => io::ErrorKind::UnexpectedEof,
            InflowError::InvalidUtf8 { .. } | InflowError::Wire(_) => io::ErrorKind::InvalidData,
            InflowError::RecordingActive | InflowError::NotRecording => io::ErrorKind::Other,
            InflowError::Io(inner) => inner.kind(),
        };
        match e {
            InflowError::Io(inner) | InflowError::Wire(WireError::Io(inner)) => inner,
            other => io::Error::new(kind, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_maps_to_unexpected_eof() {
        let e = InflowError::Exhausted {
            needed: 4,
            available: 1,
            consumed: 10,
        };
        assert!(e.is_exhausted());
        let io_err: io::Error = e.into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(io_err.to_string().contains("read of 4 bytes"));
    }

    #[test]
    fn io_error_passes_through() {
        let e = InflowError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(!e.is_exhausted());
        let io_err: io::Error = e.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn wire_errors_are_invalid_data() {
        let e = InflowError::from(WireError::UintOverflow { value: 1 << 33 });
        let io_err: io::Error = e.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
