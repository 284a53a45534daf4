//! SolarMax line protocol.
//!
//! A response looks like `{01;FB;70|64:IDC=407;UL1=A01;...;SYS=4E28,0|1A5F}`: a header, the
//! payload between `:` and the next `|`, and a checksum. Only the payload is interpreted; the
//! header and checksum are not validated.

pub mod error;
pub mod field;
pub mod frame;

pub use error::DecodeError;
pub use field::{CatalogEntry, FieldCode, ScalingRule, CATALOG};

use crate::model::DecodedMetrics;

/// Fixed request for every field in the catalog (SYS is asked for twice, as the device expects).
pub const REQUEST: &[u8] = b"{FB;01;3E|64:IDC;UL1;TKK;IL1;SYS;TNF;UDC;PAC;PRL;KT0;SYS|0F66}";

/// Terminator of a complete frame.
pub const FRAME_END: u8 = b'}';

/// Decode one raw inverter response into metrics, in the order the fields appeared.
///
/// The first error rejects the whole response. A field code appearing more than once keeps its
/// last value.
pub fn decode_response(raw: &str) -> Result<DecodedMetrics, DecodeError> {
    frame::tokens(raw)?
        .into_iter()
        .map(frame::decode_token)
        .collect()
}
