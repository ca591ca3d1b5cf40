#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod inflow;
pub mod layout;
pub mod sink;

pub use config::InflowConfig;
pub use error::InflowError;
pub use inflow::ByteInflow;
pub use layout::{FieldKind, LayoutError, Value, parse_layout};
pub use sink::{ChainSink, DigestSink};
