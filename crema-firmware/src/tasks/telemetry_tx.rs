//! Telemetry transmit task
//!
//! Drains published packets to the host over the CDC link. Release of a
//! buffer happens only on a confirmed send; a busy link means the packet
//! stays published and the next iteration retries.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crema_core::telemetry::{pump_once, PacketConsumer, PumpOutcome};

use crate::usb::CdcLink;

/// Poll interval while there is nothing to send
const IDLE_POLL_MS: u64 = 5;

/// Telemetry TX task - runs the transmit pump against the USB link
#[embassy_executor::task]
pub async fn telemetry_tx_task(mut consumer: PacketConsumer<'static>, mut link: CdcLink) {
    info!("Telemetry TX task started");

    let mut ticker = Ticker::every(Duration::from_millis(IDLE_POLL_MS));
    let mut reported_overruns = 0u32;

    link.wait_connection().await;
    info!("Host connected");

    loop {
        match pump_once(&mut consumer, &mut link).await {
            PumpOutcome::Sent => {}
            PumpOutcome::Idle | PumpOutcome::Busy => ticker.next().await,
        }

        let overruns = consumer.overruns();
        if overruns != reported_overruns {
            warn!("{} telemetry packets dropped since boot", overruns);
            reported_overruns = overruns;
        }
    }
}
