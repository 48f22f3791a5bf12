//! Injected time source for the polling loops.

/// Cooperative delay provider.
///
/// Every wait in the core goes through this trait so tests can drive the
/// polling loops without real delays.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn sleep_ms(&mut self, ms: u32);
}
