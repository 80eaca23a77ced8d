//! pixport - LVGL on an RP2040 with ST7789 panel and CST816 touch
//!
//! Brings up the panel and touch controller, hands them to LVGL through
//! the port layer, then runs two tasks:
//!
//! - `tick_task` advances the UI clock every `tick_period_ms`
//! - `ui_task` drives the LVGL timer handler and logs callback faults

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::I2c;
use embassy_rp::spi::Spi;
use embassy_time::Delay;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::ExclusiveDevice;
use pixport_core::{DrawBuffers, Port};
use pixport_drivers::{Cst816, St7789};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::board::HeldPins;
use crate::config::{DrawBuffer, PANEL_CONFIG, PANEL_DRIVER};
use crate::lvgl::LvglRuntime;

mod board;
mod config;
mod lvgl;
mod tasks;
mod ui_log;

// Draw buffers handed to LVGL (must live forever)
static DRAW_BUF_A: StaticCell<DrawBuffer> = StaticCell::new();
static DRAW_BUF_B: StaticCell<DrawBuffer> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pixport starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Backlight stays off until the panel holds a defined image
    let mut backlight = Output::new(p.PIN_25, Level::Low);

    // Panel on SPI1 (transmit only, the ST7789 is never read)
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, board::panel_spi_config());
    let cs = Output::new(p.PIN_9, Level::High);
    let dc = Output::new(p.PIN_8, Level::Low);
    let panel_reset = Output::new(p.PIN_12, Level::High);
    let spi_device = match ExclusiveDevice::new_no_delay(spi, cs) {
        Ok(device) => device,
        Err(never) => match never {},
    };

    let mut panel = St7789::new(spi_device, dc, Some(panel_reset), PANEL_DRIVER);
    if let Err(e) = panel.init(&mut Delay) {
        error!("Panel init failed: {}", e);
        halt().await;
    }
    if let Err(e) = panel.clear(Rgb565::BLACK) {
        warn!("Panel clear failed: {}", e);
    }
    backlight.set_high();
    info!(
        "Panel ready: {}x{} {}",
        PANEL_CONFIG.geometry.width, PANEL_CONFIG.geometry.height, PANEL_DRIVER.orientation
    );

    // Touch on I2C1
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, board::touch_i2c_config());
    let mut touch_reset = Output::new(p.PIN_22, Level::High);
    let mut touch = Cst816::new(i2c, PANEL_CONFIG.touch.width, PANEL_CONFIG.touch.height);
    if let Err(e) = touch.hardware_reset(&mut touch_reset, &mut Delay) {
        warn!("Touch reset failed: {}", e);
    }
    match touch.probe() {
        Ok(chip) => info!(
            "Touch controller: {} (fw {})",
            chip.model, chip.firmware_version
        ),
        // LVGL still runs without touch; reads report released
        Err(e) => warn!("Touch controller not detected: {}", e),
    }
    if let Err(e) = touch.disable_auto_sleep() {
        warn!("Touch auto-sleep not disabled: {}", e);
    }

    // Draw buffers
    let buffers = if PANEL_CONFIG.double_buffer {
        let primary = DRAW_BUF_A.init(DrawBuffer::new());
        let secondary = DRAW_BUF_B.init(DrawBuffer::new());
        DrawBuffers::double(&mut primary.0, &mut secondary.0)
    } else {
        DrawBuffers::single(&mut DRAW_BUF_A.init(DrawBuffer::new()).0)
    };
    info!(
        "Draw buffers: {} x {} bytes",
        if buffers.is_double() { 2 } else { 1 },
        buffers.len()
    );

    let port = match Port::init(
        PANEL_CONFIG,
        LvglRuntime::new(),
        panel,
        touch,
        buffers,
        &tasks::TICKS,
        ui_log::ui_log,
    ) {
        Ok(port) => port,
        Err(e) => {
            error!("UI port init failed: {}", e);
            halt().await
        }
    };
    info!("LVGL initialized");

    let pins = HeldPins {
        backlight,
        touch_reset,
    };

    spawner
        .spawn(tasks::tick_task(PANEL_CONFIG.tick_period_ms))
        .unwrap();
    spawner.spawn(tasks::ui_task(port, pins)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Park the main task after a fatal bring-up error
async fn halt() -> ! {
    loop {
        embassy_time::Timer::after_secs(60).await;
    }
}
