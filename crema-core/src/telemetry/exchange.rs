//! The two-slot buffer exchange.
//!
//! Single producer (the sampling tick), single consumer (the transmit
//! loop). The producer fills one slot a sample at a time; when the slot
//! is complete it is published through `ready`, a single atomic word that
//! carries both "a packet is ready" and which slot it is. If the previous
//! packet has not been drained yet, the completed batch is discarded and
//! the producer keeps writing into the same slot (drop-newest), counting
//! the overrun. The producer never blocks and never allocates.
//!
//! Only atomic loads and stores are used, so the exchange works on
//! targets without compare-and-swap (thumbv6m).

// The one unsafe module in the workspace: the slot arena needs interior
// mutability across the producer/consumer split. The safety argument is
// on `Sync` below.
#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crema_protocol::{Measurement, TelemetryPacket, SAMPLES_PER_PACKET};

/// Value of the publish word when no slot is ready
const NO_PACKET: u8 = u8::MAX;

/// Outcome of appending one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushOutcome {
    /// Sample stored; the fill buffer is not complete yet
    Stored,
    /// The fill buffer completed and was handed to the consumer
    Published,
    /// The fill buffer completed but the previous packet is still
    /// undrained; the completed batch was discarded
    Overrun,
}

/// The two packet slots plus the publish word.
///
/// Create once (statically in firmware), then [`split`](Self::split) into
/// the producer and consumer halves. Each half is the sole authority over
/// its side: the producer only writes unpublished slots, the consumer
/// only reads the published one.
pub struct PacketExchange {
    slots: [UnsafeCell<TelemetryPacket>; 2],
    /// `NO_PACKET`, or the index of the slot owned by the consumer.
    /// Stored with Release only after the slot contents are final.
    ready: AtomicU8,
    /// Completed-but-discarded batches since creation
    overruns: AtomicU32,
}

// Safety: all slot access goes through the split halves. The producer
// writes only the slot not named by `ready`; the consumer reads only the
// slot named by `ready`. Publication is a Release store observed by an
// Acquire load on the other side, in both directions, so neither side
// ever observes a slot mid-write.
unsafe impl Sync for PacketExchange {}

impl PacketExchange {
    /// Create an exchange with both slots empty
    pub const fn new() -> Self {
        Self {
            slots: [
                UnsafeCell::new(TelemetryPacket::empty()),
                UnsafeCell::new(TelemetryPacket::empty()),
            ],
            ready: AtomicU8::new(NO_PACKET),
            overruns: AtomicU32::new(0),
        }
    }

    /// Split into the producer and consumer halves.
    ///
    /// The exclusive borrow guarantees no other handles exist; the halves
    /// share the underlying slots for the borrow's lifetime.
    pub fn split(&mut self) -> (SampleProducer<'_>, PacketConsumer<'_>) {
        // Resume filling opposite any slot still published
        let fill_slot = match *self.ready.get_mut() {
            0 => 1,
            _ => 0,
        };
        let shared: &Self = self;
        (
            SampleProducer {
                exchange: shared,
                fill_slot,
                index: 0,
            },
            PacketConsumer { exchange: shared },
        )
    }
}

impl Default for PacketExchange {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer half: owned by the sampling tick
pub struct SampleProducer<'a> {
    exchange: &'a PacketExchange,
    fill_slot: usize,
    index: usize,
}

impl SampleProducer<'_> {
    /// Append one sample to the fill buffer. O(1), never blocks.
    pub fn push(&mut self, sample: &Measurement) -> PushOutcome {
        // Safety: this is the sole producer and `fill_slot` is never the
        // published slot, so no other reference to this packet exists.
        let packet = unsafe { &mut *self.exchange.slots[self.fill_slot].get() };
        packet.set_sample(self.index, sample);
        self.index += 1;

        if self.index < SAMPLES_PER_PACKET {
            return PushOutcome::Stored;
        }
        self.index = 0;

        if self.exchange.ready.load(Ordering::Acquire) == NO_PACKET {
            packet.stamp_tag();
            // Publish after the contents are final; this store transfers
            // slot ownership to the consumer
            self.exchange
                .ready
                .store(self.fill_slot as u8, Ordering::Release);
            self.fill_slot ^= 1;
            PushOutcome::Published
        } else {
            // Consumer still owns the other slot: discard this batch and
            // refill the same slot (drop newest, keep the packet already
            // handed over)
            let count = self.exchange.overruns.load(Ordering::Relaxed);
            self.exchange
                .overruns
                .store(count.wrapping_add(1), Ordering::Relaxed);
            PushOutcome::Overrun
        }
    }

    /// Samples written into the current fill buffer so far
    pub fn fill_level(&self) -> usize {
        self.index
    }
}

/// Reader half: owned by the transmit loop
pub struct PacketConsumer<'a> {
    exchange: &'a PacketExchange,
}

impl PacketConsumer<'_> {
    /// The published packet, if any.
    ///
    /// The borrow keeps the slot owned by the consumer; it must end
    /// before [`release`](Self::release) can be called.
    pub fn peek(&self) -> Option<&TelemetryPacket> {
        let slot = self.exchange.ready.load(Ordering::Acquire);
        if slot == NO_PACKET {
            return None;
        }
        // Safety: the producer never writes a published slot, and the
        // returned borrow is tied to `self`, so it cannot outlive the
        // exclusive borrow `release` requires.
        Some(unsafe { &*self.exchange.slots[slot as usize].get() })
    }

    /// Return the published slot to the producer for reuse.
    ///
    /// Call only once the packet has been sent; the slot's contents may
    /// be overwritten at any point afterwards.
    pub fn release(&mut self) {
        self.exchange.ready.store(NO_PACKET, Ordering::Release);
    }

    /// Completed batches discarded because the consumer was too slow
    pub fn overruns(&self) -> u32 {
        self.exchange.overruns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn sample(value: f32) -> Measurement {
        Measurement {
            pressure_bar: value,
            flow_ml_s: value,
            weight_g: value,
            temp_boiler_c: value,
            temp_group_c: value,
        }
    }

    /// Push one full batch where every sample carries `value`
    fn push_batch(producer: &mut SampleProducer<'_>, value: f32) -> PushOutcome {
        let mut outcome = PushOutcome::Stored;
        for _ in 0..SAMPLES_PER_PACKET {
            outcome = producer.push(&sample(value));
        }
        outcome
    }

    #[test]
    fn test_full_batch_publishes_once_in_order() {
        let mut exchange = PacketExchange::new();
        let (mut producer, consumer) = exchange.split();

        for i in 0..SAMPLES_PER_PACKET - 1 {
            assert_eq!(producer.push(&sample(i as f32)), PushOutcome::Stored);
            assert!(consumer.peek().is_none());
        }
        assert_eq!(
            producer.push(&sample((SAMPLES_PER_PACKET - 1) as f32)),
            PushOutcome::Published
        );

        let packet = consumer.peek().expect("packet should be published");
        assert!(packet.is_tagged());
        for i in 0..SAMPLES_PER_PACKET {
            assert_eq!(packet.sample(i).pressure_bar, i as f32);
        }
        assert_eq!(consumer.overruns(), 0);
    }

    #[test]
    fn test_overrun_drops_newest_batch() {
        let mut exchange = PacketExchange::new();
        let (mut producer, mut consumer) = exchange.split();

        assert_eq!(push_batch(&mut producer, 1.0), PushOutcome::Published);
        // Consumer never drains; the second batch must be discarded
        assert_eq!(push_batch(&mut producer, 2.0), PushOutcome::Overrun);
        assert_eq!(consumer.overruns(), 1);

        // The first batch is still intact
        let packet = consumer.peek().expect("first packet still published");
        assert_eq!(packet.sample(0).pressure_bar, 1.0);
        assert_eq!(
            packet.sample(SAMPLES_PER_PACKET - 1).pressure_bar,
            1.0
        );

        // Producer was never blocked: after a release the next complete
        // batch publishes again
        consumer.release();
        assert_eq!(push_batch(&mut producer, 3.0), PushOutcome::Published);
        assert_eq!(consumer.peek().expect("third batch").sample(7).pressure_bar, 3.0);
        assert_eq!(consumer.overruns(), 1);
    }

    #[test]
    fn test_slots_alternate_across_releases() {
        let mut exchange = PacketExchange::new();
        let (mut producer, mut consumer) = exchange.split();

        for round in 0..6 {
            let value = round as f32;
            assert_eq!(push_batch(&mut producer, value), PushOutcome::Published);
            let packet = consumer.peek().expect("published");
            for i in 0..SAMPLES_PER_PACKET {
                assert_eq!(packet.sample(i).pressure_bar, value);
            }
            consumer.release();
        }
        assert_eq!(consumer.overruns(), 0);
    }

    #[test]
    fn test_fill_level_resets_after_publish() {
        let mut exchange = PacketExchange::new();
        let (mut producer, _consumer) = exchange.split();

        producer.push(&sample(0.0));
        assert_eq!(producer.fill_level(), 1);
        push_batch(&mut producer, 0.0);
        // One leftover sample from before the batch helper ran
        assert_eq!(producer.fill_level(), 1);
    }

    #[test]
    fn test_no_torn_packets_across_threads() {
        let mut exchange = PacketExchange::new();
        let (mut producer, mut consumer) = exchange.split();
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            scope.spawn(|| {
                for batch in 0..500 {
                    push_batch(&mut producer, batch as f32);
                }
                done.store(true, Ordering::Release);
            });

            scope.spawn(|| {
                let mut last_value = -1.0f32;
                let mut drained = 0u32;
                loop {
                    if let Some(packet) = consumer.peek() {
                        assert!(packet.is_tagged());
                        let value = packet.sample(0).pressure_bar;
                        // Every record in the packet must come from the
                        // same batch, and batches arrive in order
                        for i in 0..SAMPLES_PER_PACKET {
                            assert_eq!(packet.sample(i).pressure_bar, value);
                        }
                        assert!(value > last_value);
                        last_value = value;
                        drained += 1;
                        consumer.release();
                    } else if done.load(Ordering::Acquire) {
                        break;
                    } else {
                        thread::yield_now();
                    }
                }
                // Every batch was either drained or counted as dropped
                assert!(drained >= 1);
                assert_eq!(drained as u64 + consumer.overruns() as u64, 500);
            });
        });
    }
}
