//! Host command intake task
//!
//! One CDC transfer carries one command. This task is the sole writer of
//! the control state; unknown or malformed input is dropped without a
//! reply (robust receiver).

use defmt::*;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::Receiver;
use portable_atomic::Ordering;

use crema_core::state::CommandEffect;
use crema_protocol::HostCommand;

use crate::channels::{CONTROL, TARE_REQUEST};

/// Command RX task - parses and applies host commands
#[embassy_executor::task]
pub async fn command_rx_task(mut receiver: Receiver<'static, Driver<'static, USB>>) {
    info!("Command RX task started");

    let mut buf = [0u8; 64];

    loop {
        receiver.wait_connection().await;

        match receiver.read_packet(&mut buf).await {
            Ok(n) => match HostCommand::parse(&buf[..n]) {
                Some(command) => {
                    debug!("command: {:?}", command);
                    let effect = CONTROL.lock(|cell| {
                        let mut state = cell.get();
                        let effect = state.apply(command);
                        cell.set(state);
                        effect
                    });
                    if effect == CommandEffect::TareWeight {
                        TARE_REQUEST.store(true, Ordering::Release);
                    }
                }
                None => {
                    debug!("ignoring unrecognized command ({} bytes)", n);
                }
            },
            Err(_) => {
                // Host went away mid-transfer; wait_connection resumes
                // once it is back
            }
        }
    }
}
