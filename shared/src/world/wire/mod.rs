mod error;
mod wire_record;

pub use error::WireError;
pub use wire_record::{Scalar, WireKind, WireRecord, WireValue};
