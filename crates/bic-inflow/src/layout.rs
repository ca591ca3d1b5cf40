//! Field layouts: an ad-hoc description of a byte stream as a sequence of
//! primitive reads.
//!
//! A layout is a comma-separated list of field kinds:
//!
//! ```text
//!   u16,uint,utf8,f64[],bytes:4
//! ```
//!
//! Each kind maps to one typed read on [`ByteInflow`] and produces one
//! [`Value`].
//!
//! | Kind      | Read                                  |
//! |-----------|---------------------------------------|
//! | `i8` … `f64` | fixed-width big-endian value       |
//! | `uint31`  | 4 bytes, bit 31 ignored               |
//! | `uint32`  | 4 bytes unsigned                      |
//! | `vertex`  | 8 bytes, bit 63 ignored               |
//! | `uint`    | variable-length uint                  |
//! | `str8`    | 1-byte length + ASCII                 |
//! | `utf8`    | uint length + UTF-8, may be absent    |
//! | `flags8`  | one byte as eight flags               |
//! | `i32[]` … `f64[]` | 4-byte count + elements       |
//! | `bytes:N` | N raw bytes                           |

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::Serialize;

use crate::error::InflowError;
use crate::inflow::ByteInflow;

/// One primitive read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    I64,
    F32,
    F64,
    Uint31,
    Uint32,
    VertexIndex,
    Uint,
    Str8,
    Utf8,
    Flags8,
    I32Array,
    I64Array,
    F32Array,
    F64Array,
    Bytes(usize),
}

/// Errors from parsing a layout string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown field kind {0:?}")]
    UnknownKind(String),

    #[error("invalid byte length in {0:?}")]
    InvalidLength(String),
}

impl FromStr for FieldKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "i8" => Self::I8,
            "u8" => Self::U8,
            "i16" => Self::I16,
            "u16" => Self::U16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "uint31" => Self::Uint31,
            "uint32" => Self::Uint32,
            "vertex" => Self::VertexIndex,
            "uint" => Self::Uint,
            "str8" => Self::Str8,
            "utf8" => Self::Utf8,
            "flags8" => Self::Flags8,
            "i32[]" => Self::I32Array,
            "i64[]" => Self::I64Array,
            "f32[]" => Self::F32Array,
            "f64[]" => Self::F64Array,
            other => match other.strip_prefix("bytes:") {
                Some(n) => Self::Bytes(
                    n.parse()
                        .map_err(|_| LayoutError::InvalidLength(other.to_string()))?,
                ),
                None => return Err(LayoutError::UnknownKind(other.to_string())),
            },
        };
        Ok(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Uint31 => "uint31",
            Self::Uint32 => "uint32",
            Self::VertexIndex => "vertex",
            Self::Uint => "uint",
            Self::Str8 => "str8",
            Self::Utf8 => "utf8",
            Self::Flags8 => "flags8",
            Self::I32Array => "i32[]",
            Self::I64Array => "i64[]",
            Self::F32Array => "f32[]",
            Self::F64Array => "f64[]",
            Self::Bytes(n) => return write!(f, "bytes:{n}"),
        };
        f.write_str(name)
    }
}

/// Parse a comma-separated layout. Whitespace around kinds is ignored.
///
/// # Errors
///
/// Returns the first [`LayoutError`] encountered. An empty entry is an
/// unknown kind.
pub fn parse_layout(layout: &str) -> Result<Vec<FieldKind>, LayoutError> {
    layout.split(',').map(|part| part.trim().parse()).collect()
}

/// A decoded field.
///
/// Serializes as `{"kind": "...", "value": ...}`. Raw bytes serialize as a
/// lowercase hex string.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Uint31(u32),
    Uint32(u32),
    VertexIndex(u64),
    Uint(u32),
    Str8(String),
    Utf8(Option<String>),
    Flags8([bool; 8]),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    Bytes(#[serde(serialize_with = "hex_bytes")] Vec<u8>),
}

fn hex_bytes<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Uint31(v) | Self::Uint32(v) | Self::Uint(v) => write!(f, "{v}"),
            Self::VertexIndex(v) => write!(f, "{v}"),
            Self::Str8(s) | Self::Utf8(Some(s)) => write!(f, "{s:?}"),
            Self::Utf8(None) => f.write_str("<absent>"),
            Self::Flags8(flags) => flags
                .iter()
                .try_for_each(|&flag| f.write_str(if flag { "1" } else { "0" })),
            Self::I32Array(v) => write_list(f, v),
            Self::I64Array(v) => write_list(f, v),
            Self::F32Array(v) => write_list(f, v),
            Self::F64Array(v) => write_list(f, v),
            Self::Bytes(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

impl<R: Read, W: Write> ByteInflow<R, W> {
    /// Perform the read `kind` describes.
    ///
    /// # Errors
    ///
    /// Whatever the underlying typed read returns.
    pub fn read_field(&mut self, kind: FieldKind) -> Result<Value, InflowError> {
        let value = match kind {
            FieldKind::I8 => Value::I8(self.get_i8()?),
            FieldKind::U8 => Value::U8(self.get_u8()?),
            FieldKind::I16 => Value::I16(self.get_i16()?),
            FieldKind::U16 => Value::U16(self.get_u16()?),
            FieldKind::I32 => Value::I32(self.get_i32()?),
            FieldKind::I64 => Value::I64(self.get_i64()?),
            FieldKind::F32 => Value::F32(self.get_f32()?),
            FieldKind::F64 => Value::F64(self.get_f64()?),
            FieldKind::Uint31 => Value::Uint31(self.get_uint31()?),
            FieldKind::Uint32 => Value::Uint32(self.get_uint32()?),
            FieldKind::VertexIndex => Value::VertexIndex(self.get_vertex_index()?),
            FieldKind::Uint => Value::Uint(self.get_uint()?),
            FieldKind::Str8 => Value::Str8(self.get_l8_string_ascii()?),
            FieldKind::Utf8 => Value::Utf8(self.get_l32_string_utf8()?),
            FieldKind::Flags8 => Value::Flags8(self.get_flags8()?),
            FieldKind::I32Array => Value::I32Array(self.get_i32_array()?),
            FieldKind::I64Array => Value::I64Array(self.get_i64_array()?),
            FieldKind::F32Array => Value::F32Array(self.get_f32_array()?),
            FieldKind::F64Array => Value::F64Array(self.get_f64_array()?),
            FieldKind::Bytes(n) => Value::Bytes(self.get_byte_array(n)?),
        };
        Ok(value)
    }
}
