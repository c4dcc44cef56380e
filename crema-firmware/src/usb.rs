//! USB CDC transport setup
//!
//! One CDC-ACM class carries both directions: telemetry packets out,
//! text commands in.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Sender, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

use crema_core::traits::{LinkBusy, TelemetryLink};

const CONFIG_DESCRIPTOR_BUF_SIZE: usize = 256;
const BOS_DESCRIPTOR_BUF_SIZE: usize = 256;
const CONTROL_BUF_SIZE: usize = 64;

/// Bulk endpoint size; wire packets are sent in chunks of this
const MAX_PACKET_SIZE: u16 = 64;

/// Initialize the USB device with a single CDC-ACM class.
///
/// Returns the serial class and the device to run.
pub fn setup_usb(
    usb_driver: Driver<'static, USB>,
) -> (
    CdcAcmClass<'static, Driver<'static, USB>>,
    &'static mut UsbDevice<'static, Driver<'static, USB>>,
) {
    let mut config = Config::new(0xc0de, 0xcafe);
    config.manufacturer = Some("Crema");
    config.product = Some("Espresso Controller");
    config.serial_number = Some("00000001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; CONFIG_DESCRIPTOR_BUF_SIZE]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; BOS_DESCRIPTOR_BUF_SIZE]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; CONTROL_BUF_SIZE]> = StaticCell::new();

    let mut builder = Builder::new(
        usb_driver,
        config,
        CONFIG_DESCRIPTOR.init([0; CONFIG_DESCRIPTOR_BUF_SIZE]),
        BOS_DESCRIPTOR.init([0; BOS_DESCRIPTOR_BUF_SIZE]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; CONTROL_BUF_SIZE]),
    );

    static STATE: StaticCell<State> = StaticCell::new();
    let class = CdcAcmClass::new(&mut builder, STATE.init(State::new()), MAX_PACKET_SIZE);

    static DEVICE: StaticCell<UsbDevice<'static, Driver<'static, USB>>> = StaticCell::new();
    let device = DEVICE.init(builder.build());

    (class, device)
}

/// USB device task - must run for the stack to make progress
#[embassy_executor::task]
pub async fn usb_task(device: &'static mut UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await
}

/// Telemetry link over the CDC data endpoint.
///
/// A packet is written as a sequence of bulk transfers. A disconnected
/// or disabled endpoint reports [`LinkBusy`] so the transmit loop keeps
/// the packet published and retries.
pub struct CdcLink {
    sender: Sender<'static, Driver<'static, USB>>,
}

impl CdcLink {
    pub fn new(sender: Sender<'static, Driver<'static, USB>>) -> Self {
        Self { sender }
    }

    /// Wait until a host has configured the port
    pub async fn wait_connection(&mut self) {
        self.sender.wait_connection().await;
    }
}

impl TelemetryLink for CdcLink {
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkBusy> {
        for chunk in frame.chunks(MAX_PACKET_SIZE as usize) {
            self.sender
                .write_packet(chunk)
                .await
                .map_err(|_| LinkBusy)?;
        }
        // Short-packet terminate frames that are a multiple of the
        // endpoint size, so the host flushes the transfer
        if frame.len() % MAX_PACKET_SIZE as usize == 0 {
            self.sender.write_packet(&[]).await.map_err(|_| LinkBusy)?;
        }
        Ok(())
    }
}
