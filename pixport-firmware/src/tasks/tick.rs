//! Tick task
//!
//! Advances the UI clock from the periodic timer context. Elapsed time
//! is accumulated atomically and handed to LVGL by the UI task, so LVGL
//! itself is never entered from here.

use defmt::*;
use embassy_time::{Duration, Ticker};
use pixport_core::{TickCounter, TickDriver};

/// Milliseconds elapsed but not yet handed to LVGL
pub static TICKS: TickCounter = TickCounter::new();

/// Tick task - advances the counter every `period_ms`
#[embassy_executor::task]
pub async fn tick_task(period_ms: u32) {
    info!("Tick task started ({} ms)", period_ms);

    let driver = TickDriver::new(&TICKS, period_ms);
    let mut ticker = Ticker::every(Duration::from_millis(driver.period_ms() as u64));

    loop {
        ticker.next().await;
        driver.on_period();
    }
}
