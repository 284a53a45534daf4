use thiserror::Error;

/// Reasons a response from the inverter can be rejected.
///
/// Any of these rejects the whole response; no partial metric set survives a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No `:` or no `|` after it, so the payload cannot be located.
    #[error("malformed frame: {0:?}")]
    MalformedFrame(String),
    /// A payload token without `=`.
    #[error("malformed token: {0:?}")]
    MalformedToken(String),
    /// Field code not present in the catalog.
    #[error("unknown field code: {0:?}")]
    UnknownField(String),
    #[error("invalid hex value {value:?} for field {code}")]
    InvalidHex { code: String, value: String },
}
