use embassy_net::{
    IpAddress, IpEndpoint, Stack,
    tcp::{ConnectError, Error as TcpError, TcpSocket},
};
use embassy_time::Duration;
use log::debug;
use mictoggle_core::{
    config::Endpoint,
    exchange::{Connection, Transport},
};

const SOCKET_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TcpTransportError {
    Connect(ConnectError),
    Io(TcpError),
    /// The peer stopped accepting data mid-write.
    WriteZero,
}

/// Opens a fresh TCP socket per exchange over fixed socket buffers.
pub struct TcpTransport<'d, const RX: usize, const TX: usize> {
    stack: Stack<'d>,
    rx_buffer: [u8; RX],
    tx_buffer: [u8; TX],
    timeout: Duration,
}

impl<'d, const RX: usize, const TX: usize> TcpTransport<'d, RX, TX> {
    pub const fn new(stack: Stack<'d>) -> Self {
        Self {
            stack,
            rx_buffer: [0u8; RX],
            tx_buffer: [0u8; TX],
            timeout: Duration::from_secs(SOCKET_TIMEOUT_SECS),
        }
    }
}

impl<'d, const RX: usize, const TX: usize> Transport for TcpTransport<'d, RX, TX> {
    type Error = TcpTransportError;
    type Connection<'a>
        = TcpConnection<'a>
    where
        Self: 'a;

    async fn open(&mut self, endpoint: Endpoint) -> Result<Self::Connection<'_>, Self::Error> {
        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(self.timeout));

        let remote = IpEndpoint::new(IpAddress::Ipv4(endpoint.address), endpoint.port);
        socket
            .connect(remote)
            .await
            .map_err(TcpTransportError::Connect)?;

        debug!("tcp connected remote={}", endpoint);
        Ok(TcpConnection { socket })
    }
}

pub struct TcpConnection<'a> {
    socket: TcpSocket<'a>,
}

impl Connection for TcpConnection<'_> {
    type Error = TcpTransportError;

    async fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), Self::Error> {
        while !bytes.is_empty() {
            let written = self
                .socket
                .write(bytes)
                .await
                .map_err(TcpTransportError::Io)?;
            if written == 0 {
                return Err(TcpTransportError::WriteZero);
            }
            bytes = &bytes[written..];
        }

        self.socket.flush().await.map_err(TcpTransportError::Io)
    }

    fn available(&mut self) -> bool {
        self.socket.can_recv()
    }

    async fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.socket.read(&mut byte).await {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(err) => {
                debug!("tcp read failed: {:?}", err);
                None
            }
        }
    }

    async fn close(mut self) {
        self.socket.close();
        if let Err(err) = self.socket.flush().await {
            debug!("tcp close flush failed: {:?}", err);
        }
    }
}
