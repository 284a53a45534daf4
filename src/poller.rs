use crate::graphite::GraphiteEmitter;
use crate::inverter::Inverter;
use crate::model::Snapshot;
use crate::{metrics, protocol, Error};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// State shared between the poll loop and the exporter routes.
#[derive(Default)]
pub struct StateData {
    latest: Mutex<Option<Snapshot>>,
}

impl StateData {
    pub(crate) fn update(&self, snapshot: Snapshot) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(snapshot);
        } else {
            log::trace!("Unable to lock snapshot mutex, will update on next cycle")
        }
    }

    /// Last successfully decoded cycle, if any.
    pub fn latest(&self) -> Option<Snapshot> {
        self.latest.lock().ok().and_then(|latest| latest.clone())
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub struct Poller {
    inverter: Inverter,
    emitter: GraphiteEmitter,
    interval: Duration,
    max_connect_failures: u32,
    connect_failures: u32,
}

impl Poller {
    pub fn new(
        inverter: Inverter,
        emitter: GraphiteEmitter,
        interval: Duration,
        max_connect_failures: u32,
    ) -> Self {
        Poller {
            inverter,
            emitter,
            interval,
            max_connect_failures,
            connect_failures: 0,
        }
    }

    /// Run one query/decode/emit cycle.
    ///
    /// Only a run of connection failures longer than `max_connect_failures` is returned as an
    /// error; everything else is logged and the cycle's data discarded.
    pub async fn poll_once(&mut self, state: &StateData) -> Result<(), Error> {
        let now = unix_timestamp();

        let raw = match self.inverter.query().await {
            Ok(raw) => {
                self.connect_failures = 0;
                raw
            }
            Err(e @ Error::Connect { .. }) => {
                metrics::record_outcome(metrics::OUTCOME_CONNECT_ERROR);
                self.connect_failures += 1;
                log::error!("{} (attempt {})", e, self.connect_failures);

                if self.max_connect_failures > 0 && self.connect_failures >= self.max_connect_failures
                {
                    return Err(Error::Unreachable(self.connect_failures));
                }
                return Ok(());
            }
            Err(e) => {
                /* the socket opened, so the inverter is reachable */
                self.connect_failures = 0;
                metrics::record_outcome(metrics::OUTCOME_READ_ERROR);
                log::error!("Error reading from inverter {}: {}", self.inverter.addr(), e);
                return Ok(());
            }
        };

        match protocol::decode_response(&raw) {
            Ok(decoded) => {
                self.emitter.emit(&decoded, now).await;
                metrics::record(&decoded);
                state.update(Snapshot {
                    timestamp: now,
                    raw,
                    metrics: decoded,
                });
            }
            Err(e) => {
                metrics::record_outcome(metrics::OUTCOME_DECODE_ERROR);
                log::error!("Discarding response {:?}: {}", raw, e);
            }
        }

        Ok(())
    }

    /// Poll forever, sleeping `interval` between cycles.
    pub async fn run(mut self, state: &StateData) -> Result<(), Error> {
        log::info!(
            "polling inverter at {} every {:?}",
            self.inverter.addr(),
            self.interval
        );

        loop {
            self.poll_once(state).await?;
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, UdpSocket};

    const RESPONSE: &str = "{01;FB;70|64:IDC=407;UL1=A01;TKK=2C;IL1=46D;SYS=4E28,0;TNF=1383;UDC=B7D;PAC=16A6;PRL=2B;KT0=48C;SYS=4E28,0|1A5F}";

    async fn mock_inverter(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; protocol::REQUEST.len()];
            socket.read_exact(&mut request).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        addr
    }

    async fn poller(inverter_addr: String, collector: &UdpSocket, max_failures: u32) -> Poller {
        let emitter = GraphiteEmitter::bind(
            &collector.local_addr().unwrap().to_string(),
            "test.".to_string(),
        )
        .await
        .unwrap();

        Poller::new(
            Inverter::new(inverter_addr, Duration::from_secs(2)),
            emitter,
            Duration::from_secs(10),
            max_failures,
        )
    }

    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn poll_emits_every_metric() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = mock_inverter(RESPONSE).await;
        let mut poller = poller(addr, &collector, 0).await;
        let state = StateData::default();

        poller.poll_once(&state).await.unwrap();

        let mut buf = [0u8; 512];
        let mut lines = Vec::new();
        for _ in 0..10 {
            let n = tokio::time::timeout(Duration::from_secs(2), collector.recv(&mut buf))
                .await
                .unwrap()
                .unwrap();
            lines.push(String::from_utf8(buf[..n].to_vec()).unwrap());
        }

        assert!(lines[0].starts_with("test.solarmax.dc_current 10.31 "));
        assert!(lines[7].starts_with("test.solarmax.power_output 2899.0 "));
        assert!(lines[8].starts_with("test.solarmax.relative_ouput 43 "));

        let snapshot = state.latest().unwrap();
        assert_eq!(RESPONSE, snapshot.raw);
        assert_eq!(10, snapshot.metrics.len());
    }

    #[tokio::test]
    async fn poll_discards_undecodable_response() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = mock_inverter("{01;FB;70|64:IDC=407;XYZ=1|1A5F}").await;
        let mut poller = poller(addr, &collector, 0).await;
        let state = StateData::default();

        poller.poll_once(&state).await.unwrap();

        assert!(state.latest().is_none());
        let mut buf = [0u8; 512];
        assert!(
            tokio::time::timeout(Duration::from_millis(200), collector.recv(&mut buf))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn poll_gives_up_after_consecutive_connect_failures() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut poller = poller(closed_port().await, &collector, 2).await;
        let state = StateData::default();

        assert!(poller.poll_once(&state).await.is_ok());
        assert!(matches!(
            poller.poll_once(&state).await,
            Err(Error::Unreachable(2))
        ));
    }

    #[tokio::test]
    async fn poll_retries_forever_when_unlimited() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut poller = poller(closed_port().await, &collector, 0).await;
        let state = StateData::default();

        for _ in 0..5 {
            assert!(poller.poll_once(&state).await.is_ok());
        }
    }

    /// Accept one connection and close it after reading the request, without responding.
    async fn mute_inverter() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; protocol::REQUEST.len()];
            socket.read_exact(&mut request).await.unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn read_failure_resets_connect_failures() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let refused = closed_port().await;
        let mut poller = poller(refused.clone(), &collector, 2).await;
        let state = StateData::default();

        assert!(poller.poll_once(&state).await.is_ok());
        assert_eq!(1, poller.connect_failures);

        /* connected but no response: not fatal, and the inverter counts as reachable */
        poller.inverter = Inverter::new(mute_inverter().await, Duration::from_secs(2));
        assert!(poller.poll_once(&state).await.is_ok());
        assert_eq!(0, poller.connect_failures);
        assert!(state.latest().is_none());

        poller.inverter = Inverter::new(refused, Duration::from_secs(2));
        assert!(poller.poll_once(&state).await.is_ok());
        assert!(matches!(
            poller.poll_once(&state).await,
            Err(Error::Unreachable(2))
        ));
    }

    #[tokio::test]
    async fn read_timeout_is_not_fatal() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        /* the listener accepts into its backlog but never replies */
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut poller = poller(addr.clone(), &collector, 1).await;
        poller.inverter = Inverter::new(addr, Duration::from_millis(200));
        let state = StateData::default();

        assert!(poller.poll_once(&state).await.is_ok());
        assert_eq!(0, poller.connect_failures);
        drop(listener);
    }
}
