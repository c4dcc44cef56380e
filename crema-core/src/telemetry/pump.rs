//! The transmit-loop policy.
//!
//! One iteration: if a packet is published, hand it to the link; release
//! the slot only on a confirmed send. A busy link leaves the packet
//! published for the next iteration. There is no timeout and no backoff;
//! a stalled host surfaces as overruns on the producer side.

use crate::telemetry::exchange::PacketConsumer;
use crate::traits::{LinkBusy, TelemetryLink};

/// Result of one pump iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PumpOutcome {
    /// Nothing published
    Idle,
    /// Packet sent and slot released
    Sent,
    /// Link busy; the packet stays published for retry
    Busy,
}

/// Run one iteration of the transmit loop
pub async fn pump_once<L: TelemetryLink>(
    consumer: &mut PacketConsumer<'_>,
    link: &mut L,
) -> PumpOutcome {
    let Some(packet) = consumer.peek() else {
        return PumpOutcome::Idle;
    };
    match link.send(packet.as_bytes()).await {
        Ok(()) => {
            consumer.release();
            PumpOutcome::Sent
        }
        Err(LinkBusy) => PumpOutcome::Busy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{PacketExchange, SampleProducer};
    use crema_protocol::{Measurement, PACKET_LEN, SAMPLES_PER_PACKET};
    use embassy_futures::block_on;

    /// Link double that reports Busy a scripted number of times before
    /// accepting transfers
    struct FakeLink {
        busy_remaining: u32,
        sent_frames: u32,
        last_first_byte: u8,
        last_len: usize,
    }

    impl FakeLink {
        fn new(busy_remaining: u32) -> Self {
            Self {
                busy_remaining,
                sent_frames: 0,
                last_first_byte: 0,
                last_len: 0,
            }
        }
    }

    impl TelemetryLink for FakeLink {
        async fn send(&mut self, frame: &[u8]) -> Result<(), LinkBusy> {
            if self.busy_remaining > 0 {
                self.busy_remaining -= 1;
                return Err(LinkBusy);
            }
            self.sent_frames += 1;
            self.last_first_byte = frame[0];
            self.last_len = frame.len();
            Ok(())
        }
    }

    fn publish_batch(producer: &mut SampleProducer<'_>, value: f32) {
        let sample = Measurement {
            pressure_bar: value,
            ..Measurement::default()
        };
        for _ in 0..SAMPLES_PER_PACKET {
            producer.push(&sample);
        }
    }

    #[test]
    fn test_idle_when_nothing_published() {
        let mut exchange = PacketExchange::new();
        let (_producer, mut consumer) = exchange.split();
        let mut link = FakeLink::new(0);

        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Idle);
        assert_eq!(link.sent_frames, 0);
    }

    #[test]
    fn test_sends_full_wire_image_and_releases() {
        let mut exchange = PacketExchange::new();
        let (mut producer, mut consumer) = exchange.split();
        let mut link = FakeLink::new(0);

        publish_batch(&mut producer, 4.0);
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Sent);
        assert_eq!(link.sent_frames, 1);
        assert_eq!(link.last_len, PACKET_LEN);
        assert_eq!(link.last_first_byte, b'E');

        // Slot released: nothing left to send
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Idle);
    }

    #[test]
    fn test_busy_keeps_packet_published() {
        let mut exchange = PacketExchange::new();
        let (mut producer, mut consumer) = exchange.split();
        let mut link = FakeLink::new(2);

        publish_batch(&mut producer, 7.0);
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Busy);
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Busy);
        // Still published and intact across the retries
        assert_eq!(
            consumer.peek().expect("still published").sample(0).pressure_bar,
            7.0
        );
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Sent);
        assert_eq!(link.sent_frames, 1);
        assert_eq!(block_on(pump_once(&mut consumer, &mut link)), PumpOutcome::Idle);
    }
}
