//! UI task
//!
//! Runs the LVGL timer handler in a loop. Flush and touch callbacks fire
//! from inside `run_once`; their faults are drained and logged after
//! each iteration.

use defmt::*;
use embassy_time::Timer;
use pixport_core::PortFault;

use crate::board::{HeldPins, UiPort};

/// Log flush statistics every this many iterations
const STATS_INTERVAL: u32 = 2000;

/// UI task - owns the port for the lifetime of the firmware
#[embassy_executor::task]
pub async fn ui_task(mut port: UiPort, _pins: HeldPins) {
    info!("UI task started");

    let mut iterations: u32 = 0;

    loop {
        let wait_ms = port.run_once();

        while let Some(fault) = port.take_fault() {
            match fault {
                PortFault::Flush(err) => warn!("Flush failed: {}", err),
                PortFault::Touch(err) => warn!("Touch read failed: {}", err),
            }
        }

        iterations = iterations.wrapping_add(1);
        if iterations % STATS_INTERVAL == 0 {
            let stats = port.flush_stats();
            debug!(
                "Flush stats: {} frames, {} px, {} rejected, {} panel errors",
                stats.frames, stats.pixels, stats.rejected, stats.panel_errors
            );
        }

        Timer::after_millis(wait_ms as u64).await;
    }
}
