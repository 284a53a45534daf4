use super::error::DecodeError;
use super::field::{self, FieldCode};
use crate::model::MetricValue;

const PAYLOAD_START: char = ':';
const PAYLOAD_END: char = '|';
const TOKEN_SEPARATOR: char = ';';
const VALUE_SEPARATOR: char = '=';
const QUALIFIER_SEPARATOR: char = ',';

/// Locate the payload of a response: everything between the first `:` and the first `|`
/// following it.
pub fn payload(raw: &str) -> Result<&str, DecodeError> {
    let start = raw
        .find(PAYLOAD_START)
        .ok_or_else(|| DecodeError::MalformedFrame(raw.to_owned()))?
        + PAYLOAD_START.len_utf8();

    raw[start..]
        .find(PAYLOAD_END)
        .map(|len| &raw[start..start + len])
        .ok_or_else(|| DecodeError::MalformedFrame(raw.to_owned()))
}

/// Split the payload of `raw` into `field=value` tokens, in wire order.
pub fn tokens(raw: &str) -> Result<Vec<&str>, DecodeError> {
    payload(raw).map(|payload| payload.split(TOKEN_SEPARATOR).collect())
}

fn parse_hex(code: &str, value: &str) -> Result<u64, DecodeError> {
    let invalid = || DecodeError::InvalidHex {
        code: code.to_owned(),
        value: value.to_owned(),
    };

    /* from_str_radix alone would accept a leading '+' */
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    u64::from_str_radix(value, 16).map_err(|_| invalid())
}

/// Decode one `<code>=<hex>[,<qualifier>]` token into its metric name and scaled value.
pub fn decode_token(token: &str) -> Result<(&'static str, MetricValue), DecodeError> {
    let (code, value) = token
        .split_once(VALUE_SEPARATOR)
        .ok_or_else(|| DecodeError::MalformedToken(token.to_owned()))?;

    /* only SYS carries a trailing qualifier, e.g. `4E28,0` */
    let value = if code == FieldCode::Sys.as_str() {
        value
            .split_once(QUALIFIER_SEPARATOR)
            .map_or(value, |(head, _)| head)
    } else {
        value
    };

    let raw = parse_hex(code, value)?;
    let entry = field::lookup(code)?;

    Ok((entry.metric, entry.rule.apply(raw)))
}
