//! Board wiring
//!
//! Pin mapping for an RP2040 driving a 1.69" 240x280 ST7789 module with
//! CST816 touch:
//!
//! | Signal      | Pin    | Peripheral |
//! |-------------|--------|------------|
//! | LCD DC      | GPIO8  |            |
//! | LCD CS      | GPIO9  | SPI1       |
//! | LCD CLK     | GPIO10 | SPI1 SCK   |
//! | LCD MOSI    | GPIO11 | SPI1 TX    |
//! | LCD RST     | GPIO12 |            |
//! | Backlight   | GPIO25 |            |
//! | Touch SDA   | GPIO6  | I2C1       |
//! | Touch SCL   | GPIO7  | I2C1       |
//! | Touch RST   | GPIO22 |            |

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, SPI1};
use embassy_rp::spi::{self, Spi};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use pixport_core::Port;
use pixport_drivers::{Cst816, St7789};

use crate::lvgl::LvglRuntime;

/// ST7789 maximum serial clock
pub const PANEL_SPI_HZ: u32 = 62_500_000;

/// CST816 fast-mode I2C
pub const TOUCH_I2C_HZ: u32 = 400_000;

pub type PanelSpi = ExclusiveDevice<Spi<'static, SPI1, spi::Blocking>, Output<'static>, NoDelay>;
pub type Panel = St7789<PanelSpi, Output<'static>, Output<'static>>;
pub type Touch = Cst816<I2c<'static, I2C1, i2c::Blocking>>;
pub type UiPort = Port<LvglRuntime, Panel, Touch>;

/// Outputs that must keep driving their level for the lifetime of the
/// firmware
pub struct HeldPins {
    pub backlight: Output<'static>,
    pub touch_reset: Output<'static>,
}

/// SPI configuration for the panel
pub fn panel_spi_config() -> spi::Config {
    let mut config = spi::Config::default();
    config.frequency = PANEL_SPI_HZ;
    config
}

/// I2C configuration for the touch controller
pub fn touch_i2c_config() -> i2c::Config {
    let mut config = i2c::Config::default();
    config.frequency = TOUCH_I2C_HZ;
    config
}
