/// Errors raised by the wire-level primitives and the byte chain.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete value could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A variable-length uint decoded to more than 32 bits.
    ///
    /// Five 7-bit groups carry up to 35 bits. Anything past `u32::MAX`
    /// is rejected rather than wrapped.
    #[error("variable-length uint overflows 32 bits: {value:#x}")]
    UintOverflow { value: u64 },

    /// A fragment window does not fit inside its storage.
    #[error("fragment window {offset}+{length} exceeds storage of {capacity} bytes")]
    FragmentOutOfBounds {
        offset: usize,
        length: usize,
        capacity: usize,
    },

    /// Fragment bytes are not valid UTF-8.
    #[error("invalid UTF-8 after {valid_up_to} valid bytes")]
    InvalidUtf8 { valid_up_to: usize },

    /// I/O error during read or write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<std::str::Utf8Error> for WireError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        }
    }
}

impl From<std::string::FromUtf8Error> for WireError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        e.utf8_error().into()
    }
}

