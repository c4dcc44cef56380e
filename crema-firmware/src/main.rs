//! Crema - Espresso Machine Controller Firmware
//!
//! Main firmware binary for RP2040-based controller boards. A 1 kHz
//! sampling/control tick models the boiler/pump plant, fills
//! double-buffered telemetry packets, and a USB CDC link carries packets
//! out and text commands in.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crema_core::telemetry::PacketExchange;

mod channels;
mod tasks;
mod usb;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// The two telemetry packet buffers, statically owned for the process
/// lifetime. Slot ownership alternates between the sampler and the TX
/// task through the exchange; the buffers themselves never move.
static EXCHANGE: StaticCell<PacketExchange> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Crema firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let usb_driver = Driver::new(p.USB, Irqs);
    let (class, device) = usb::setup_usb(usb_driver);
    let (sender, receiver) = class.split();
    let link = usb::CdcLink::new(sender);
    info!("USB initialized");

    let (producer, consumer) = EXCHANGE.init(PacketExchange::new()).split();

    spawner.spawn(usb::usb_task(device)).unwrap();
    spawner.spawn(tasks::sampler_task(producer)).unwrap();
    spawner.spawn(tasks::telemetry_tx_task(consumer, link)).unwrap();
    spawner.spawn(tasks::command_rx_task(receiver)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
