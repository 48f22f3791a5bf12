//! Scripted fakes shared by the unit tests.

use crate::{
    config::Endpoint,
    exchange::{Connection, Transport},
    time::Clock,
};

#[derive(Default)]
pub(crate) struct FakeClock {
    pub sleeps: Vec<u32>,
}

impl FakeClock {
    pub fn total_ms(&self) -> u32 {
        self.sleeps.iter().sum()
    }
}

impl Clock for FakeClock {
    async fn sleep_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
    }
}

/// Byte-stream transport replaying `reply` on every connection.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub reply: Vec<u8>,
    pub refuse: bool,
    pub fail_write: bool,
    /// Availability checks answered `false` before the reply shows up.
    pub ready_after_checks: u32,
    pub opened: Vec<Endpoint>,
    pub written: Vec<u8>,
    pub reads: usize,
    pub closes: u32,
}

impl ScriptedTransport {
    pub fn replying(reply: &[u8]) -> Self {
        Self {
            reply: reply.to_vec(),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

pub(crate) struct ScriptedConnection<'a> {
    transport: &'a mut ScriptedTransport,
    cursor: usize,
    checks: u32,
}

impl Transport for ScriptedTransport {
    type Error = &'static str;
    type Connection<'a>
        = ScriptedConnection<'a>
    where
        Self: 'a;

    async fn open(&mut self, endpoint: Endpoint) -> Result<Self::Connection<'_>, Self::Error> {
        if self.refuse {
            return Err("connection refused");
        }

        self.opened.push(endpoint);
        Ok(ScriptedConnection {
            transport: self,
            cursor: 0,
            checks: 0,
        })
    }
}

impl Connection for ScriptedConnection<'_> {
    type Error = &'static str;

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.transport.fail_write {
            return Err("broken pipe");
        }
        self.transport.written.extend_from_slice(bytes);
        Ok(())
    }

    fn available(&mut self) -> bool {
        self.checks += 1;
        if self.checks <= self.transport.ready_after_checks {
            return false;
        }
        self.cursor < self.transport.reply.len()
    }

    async fn read_byte(&mut self) -> Option<u8> {
        let byte = self.transport.reply.get(self.cursor).copied()?;
        self.cursor += 1;
        self.transport.reads += 1;
        Some(byte)
    }

    async fn close(self) {
        self.transport.closes += 1;
    }
}
