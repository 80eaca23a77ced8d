//! Panel configuration
//!
//! Generated at build time from `panel.toml` (see build.rs). Edit the
//! TOML file and rebuild to change geometry, buffering, timing or touch
//! orientation.

use pixport_core::{DisplayGeometry, PortConfig, TouchMapping};
use pixport_drivers::{Orientation, St7789Config};
use pixport_hal::PixelOrder;

include!(concat!(env!("OUT_DIR"), "/panel_config.rs"));

/// Bytes per LVGL draw buffer
pub const DRAW_BUFFER_BYTES: usize = PANEL_CONFIG.draw_buffer_bytes();

/// LVGL draw buffer
///
/// LVGL 9 requires draw buffers aligned to `LV_DRAW_BUF_ALIGN` (4).
#[repr(C, align(4))]
pub struct DrawBuffer(pub [u8; DRAW_BUFFER_BYTES]);

impl DrawBuffer {
    pub const fn new() -> Self {
        Self([0; DRAW_BUFFER_BYTES])
    }
}
