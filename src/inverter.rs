use crate::protocol::{FRAME_END, REQUEST};
use crate::Error;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const READ_BUFFER_SIZE: usize = 1024;

/// TCP client for one inverter. A fresh connection is opened for every query.
#[derive(Debug, Clone)]
pub struct Inverter {
    addr: String,
    timeout: Duration,
}

impl Inverter {
    pub fn new(addr: String, timeout: Duration) -> Self {
        Inverter { addr, timeout }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(&self) -> Result<TcpStream, Error> {
        let connect_err = |source: std::io::Error| Error::Connect {
            addr: self.addr.clone(),
            source,
        };

        tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| {
                connect_err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "connection timed out",
                ))
            })?
            .map_err(connect_err)
    }

    /// Send the fixed request and return the raw response text.
    ///
    /// Reads until a `}` arrives or the peer closes the connection after sending something.
    pub async fn query(&self) -> Result<String, Error> {
        let mut stream = self.connect().await?;
        log::debug!("connected to inverter at {}", self.addr);

        let exchange = tokio::time::timeout(self.timeout, exchange(&mut stream)).await;

        if let Err(e) = stream.shutdown().await {
            log::trace!("error while closing inverter connection: {}", e);
        }

        let response = exchange.map_err(|_| Error::Timeout(self.timeout))??;
        log::trace!("response from {}: {}", self.addr, response);

        Ok(response)
    }
}

async fn exchange(stream: &mut TcpStream) -> Result<String, Error> {
    stream.write_all(REQUEST).await?;

    let mut response = Vec::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        response.extend_from_slice(&buf[..n]);
        if buf[..n].contains(&FRAME_END) {
            break;
        }
    }

    if response.is_empty() {
        return Err(Error::ConnectionClosed);
    }

    String::from_utf8(response).map_err(Error::from)
}
