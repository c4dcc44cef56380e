//! Telemetry transport trait

/// The transport could not take the packet right now; retry later.
///
/// Carries no detail: the transmit loop treats every unsent packet the
/// same way, by leaving it published and retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkBusy;

/// Trait for the outbound telemetry transport.
///
/// Implementations hand one complete wire packet to the host. A send
/// must either complete or report [`LinkBusy`] in bounded time; the
/// caller owns the retry policy.
#[allow(async_fn_in_trait)]
pub trait TelemetryLink {
    /// Attempt to transmit one complete packet
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkBusy>;
}
