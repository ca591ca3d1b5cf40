#![warn(clippy::pedantic)]

pub mod chain;
pub mod error;
pub mod fixed;
pub mod varint;

pub use chain::{ByteChain, ChainReader};
pub use error::WireError;
