//! Graphite plaintext protocol over UDP.
//!
//! One datagram per metric: `<prefix>solarmax.<metric> <value> <timestamp>\n`. Delivery is
//! fire-and-forget, a failed send is logged and counted but never fails the poll cycle.

use crate::metrics;
use crate::model::{DecodedMetrics, MetricValue};
use crate::Error;
use std::net::SocketAddr;
use tokio::net::{lookup_host, UdpSocket};

const NAMESPACE: &str = "solarmax";

/// Format a single metric line, without the trailing newline.
pub fn format_line(prefix: &str, metric: &str, value: MetricValue, timestamp: u64) -> String {
    format!(
        "{}{}.{} {} {}",
        prefix, NAMESPACE, metric, value, timestamp
    )
}

pub fn format_lines(prefix: &str, metrics: &DecodedMetrics, timestamp: u64) -> Vec<String> {
    metrics
        .iter()
        .map(|(metric, value)| format_line(prefix, metric, value, timestamp))
        .collect()
}

#[derive(Debug)]
pub struct GraphiteEmitter {
    socket: UdpSocket,
    target: SocketAddr,
    prefix: String,
}

impl GraphiteEmitter {
    /// Resolve `target` (`host:port`) and bind a local UDP socket of the same address family.
    pub async fn bind(target: &str, prefix: String) -> Result<Self, Error> {
        let target = lookup_host(target).await?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("graphite host {} did not resolve", target),
            )
        })?;

        let local = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(local).await?;
        log::debug!(
            "graphite emitter bound to {}, sending to {}",
            socket.local_addr()?,
            target
        );

        Ok(GraphiteEmitter {
            socket,
            target,
            prefix,
        })
    }

    /// Send every metric, returning how many datagrams went out.
    pub async fn emit(&self, decoded: &DecodedMetrics, timestamp: u64) -> usize {
        let mut sent = 0;

        for line in format_lines(&self.prefix, decoded, timestamp) {
            log::info!("{}", line);

            let datagram = format!("{}\n", line);
            match self.socket.send_to(datagram.as_bytes(), self.target).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    log::warn!("unable to send metric to {}: {}", self.target, e);
                    metrics::EMIT_ERRORS_COUNTER.inc();
                }
            }
        }

        sent
    }
}
