//! Fixed-rate sampling/control task
//!
//! The 1 kHz tick is the sole owner of the simulation state and the
//! producer half of the buffer exchange. Each tick is O(1) and
//! allocation-free: snapshot the control state, advance the plant one
//! step, append the sample.

use defmt::*;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use crema_core::model::{MachineModel, ModelConfig};
use crema_core::telemetry::{PushOutcome, SampleProducer};

use crate::channels::{CONTROL, TARE_REQUEST};

/// Control loop rate
pub const TICK_HZ: u64 = 1000;

/// Integration step matching the tick rate
const DT_S: f32 = 1.0 / TICK_HZ as f32;

/// Sampler task - advances the plant and fills telemetry packets
#[embassy_executor::task]
pub async fn sampler_task(mut producer: SampleProducer<'static>) {
    info!("Sampler task started ({} Hz)", TICK_HZ);

    let mut model = MachineModel::new(ModelConfig::default());
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));

    loop {
        ticker.next().await;

        if TARE_REQUEST.swap(false, Ordering::AcqRel) {
            model.tare();
            debug!("weight tared");
        }

        let control = CONTROL.lock(|cell| cell.get());
        let sample = model.step(&control, DT_S);

        if producer.push(&sample) == PushOutcome::Overrun {
            // Host fell behind; the completed batch was dropped and the
            // producer carries on
            warn!("telemetry overrun, dropped one packet of samples");
        }
    }
}
