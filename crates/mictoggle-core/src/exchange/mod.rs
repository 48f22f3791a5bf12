//! Toggle request/response exchange.
//!
//! One exchange opens a connection, writes the fixed request, waits briefly
//! for data and reads the reply byte by byte into a [`ResponseBuffer`],
//! dropping everything up to the first blank line. Nothing is allocated and
//! nothing but the connection attempt can fail: a missing boundary, an empty
//! body or a truncated one all come back as whatever text was captured.

mod buffer;

use core::fmt::Debug;

use log::{debug, info, warn};

pub use buffer::{
    BodyScanner, HEADER_BOUNDARY, PushOutcome, ResponseBuffer, ScanAction, ScanState,
};

use crate::{
    config::{DeviceConfig, Endpoint, PollPolicy, RequestTemplate},
    time::Clock,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExchangeError {
    /// The transport could not be opened; nothing was written or read.
    ConnectFailed,
}

/// Opens byte-stream connections to the toggle service.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Error: Debug;
    type Connection<'a>: Connection
    where
        Self: 'a;

    async fn open(&mut self, endpoint: Endpoint) -> Result<Self::Connection<'_>, Self::Error>;
}

/// One open connection, used for a single exchange and then closed.
#[allow(async_fn_in_trait)]
pub trait Connection {
    type Error: Debug;

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Whether a byte can be read right now without waiting.
    fn available(&mut self) -> bool;

    /// Next byte, or `None` once the peer closed or the read failed.
    async fn read_byte(&mut self) -> Option<u8>;

    async fn close(self);
}

pub struct Exchange<const N: usize> {
    endpoint: Endpoint,
    request: RequestTemplate,
    data_wait: PollPolicy,
    buffer: ResponseBuffer<N>,
}

impl<const N: usize> Exchange<N> {
    pub const fn new(endpoint: Endpoint, request: RequestTemplate, data_wait: PollPolicy) -> Self {
        Self {
            endpoint,
            request,
            data_wait,
            buffer: ResponseBuffer::new(),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.endpoint, config.route.request(), config.data_wait)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn request(&self) -> RequestTemplate {
        self.request
    }

    /// Text captured by the most recent exchange that got past connecting.
    pub fn last_reply(&self) -> &str {
        self.buffer.as_text()
    }

    /// Whether the most recent reply had a header boundary.
    pub fn body_found(&self) -> bool {
        self.buffer.body_started()
    }

    pub fn buffer(&self) -> &ResponseBuffer<N> {
        &self.buffer
    }

    /// Runs one exchange and returns the reply body.
    ///
    /// Only [`ExchangeError::ConnectFailed`] is reported; the request is
    /// never retried here.
    pub async fn toggle<T, C>(
        &mut self,
        transport: &mut T,
        clock: &mut C,
    ) -> Result<&str, ExchangeError>
    where
        T: Transport,
        C: Clock,
    {
        let mut connection = match transport.open(self.endpoint).await {
            Ok(connection) => connection,
            Err(err) => {
                warn!(
                    "exchange connect failed endpoint={} err={:?}",
                    self.endpoint, err
                );
                return Err(ExchangeError::ConnectFailed);
            }
        };

        self.buffer.reset();
        debug!(
            "exchange connected endpoint={} request={}",
            self.endpoint,
            self.request.request_line()
        );

        if let Err(err) = connection.write_all(self.request.as_bytes()).await {
            warn!("exchange request write failed: {:?}", err);
        }

        if !wait_for_data(&mut connection, clock, self.data_wait).await {
            debug!(
                "exchange no data within {}ms; reading anyway",
                self.data_wait.window_ms()
            );
        }

        let mut received = 0usize;
        while !self.buffer.is_full() && connection.available() {
            let Some(byte) = connection.read_byte().await else {
                break;
            };
            received += 1;
            if self.buffer.push(byte) == PushOutcome::BodyStarted {
                debug!("exchange headers skipped after {} bytes", received);
            }
        }

        self.buffer.terminate();
        connection.close().await;

        if !self.buffer.body_started() {
            warn!(
                "exchange no header boundary in {} bytes; returning raw capture",
                received
            );
        } else if self.buffer.is_full() {
            warn!("exchange body hit capacity at {} bytes", self.buffer.len());
        }
        info!(
            "exchange done received={} body_bytes={}",
            received,
            self.buffer.len()
        );

        Ok(self.buffer.as_text())
    }
}

async fn wait_for_data<K, C>(connection: &mut K, clock: &mut C, policy: PollPolicy) -> bool
where
    K: Connection,
    C: Clock,
{
    for _ in 0..policy.max_polls {
        if connection.available() {
            return true;
        }
        clock.sleep_ms(policy.interval_ms).await;
    }

    connection.available()
}
