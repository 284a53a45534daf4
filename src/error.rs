use crate::protocol::DecodeError;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("unable to connect to inverter at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },
    #[error("no complete response from inverter within {0:?}")]
    Timeout(Duration),
    #[error("inverter closed the connection without responding")]
    ConnectionClosed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("response is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("unable to decode response: {0}")]
    Decode(#[from] DecodeError),
    #[error("giving up after {0} consecutive connection failures")]
    Unreachable(u32),
    #[error("exporter failed: {0}")]
    Exporter(String),
    #[error("unable to encode metrics")]
    FormatError,
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let error = format!(
            "<html><body><h3>Internal error</h3><code>{}</code></body></html>",
            self
        );
        Response::build()
            .status(Status::InternalServerError)
            .sized_body(error.len(), Cursor::new(error))
            .header(ContentType::new("text", "html"))
            .ok()
    }
}
