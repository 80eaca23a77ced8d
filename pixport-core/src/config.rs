//! Port configuration
//!
//! Describes the panel geometry, how large the UI library's draw buffers
//! are, the tick and loop periods, and how raw touch samples map onto the
//! display. The defaults match the reference board: a 240x280 ST7789
//! panel with a CST816 touch controller of the same native resolution.

use pixport_hal::{PixelOrder, BYTES_PER_PIXEL};

/// Default panel width in pixels
pub const DEFAULT_WIDTH: u16 = 240;

/// Default panel height in pixels
pub const DEFAULT_HEIGHT: u16 = 280;

/// Each draw buffer holds 1/20th of the screen
pub const DEFAULT_BUFFER_DIVISOR: u16 = 20;

/// Tick period in milliseconds
pub const DEFAULT_TICK_PERIOD_MS: u32 = 5;

/// Upper bound on the wait between two timer-handler runs
pub const DEFAULT_LOOP_PERIOD_MS: u32 = 5;

/// Longest tick period accepted by [`PortConfig::validate`]
pub const MAX_TICK_PERIOD_MS: u32 = 100;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroDimension,
    /// Divisor is zero or leaves less than one full row per buffer
    InvalidDivisor,
    /// Tick period is zero or above [`MAX_TICK_PERIOD_MS`]
    InvalidTickPeriod,
    /// Loop period is zero
    InvalidLoopPeriod,
    /// Native touch width or height is zero
    InvalidTouchSize,
}

/// Visible display size in the configured orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayGeometry {
    pub width: u16,
    pub height: u16,
}

impl DisplayGeometry {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Total pixel count
    pub const fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Mapping from touch controller coordinates to display coordinates
///
/// The transform is applied in order: swap axes, invert, then scale the
/// native controller range onto the display size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchMapping {
    /// Native controller width (x range before swapping)
    pub width: u16,
    /// Native controller height (y range before swapping)
    pub height: u16,
    pub swap_xy: bool,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl TouchMapping {
    /// Identity mapping for a controller matching the display
    pub const fn identity(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            swap_xy: false,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Port configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortConfig {
    pub geometry: DisplayGeometry,
    /// Each draw buffer holds `pixels / buffer_divisor` pixels
    pub buffer_divisor: u16,
    /// Render into two buffers alternately
    pub double_buffer: bool,
    pub tick_period_ms: u32,
    pub loop_period_ms: u32,
    /// Byte order the UI library renders in
    pub pixel_order: PixelOrder,
    pub touch: TouchMapping,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            geometry: DisplayGeometry::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            buffer_divisor: DEFAULT_BUFFER_DIVISOR,
            double_buffer: true,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            loop_period_ms: DEFAULT_LOOP_PERIOD_MS,
            pixel_order: PixelOrder::Native,
            touch: TouchMapping::identity(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }
}

impl PortConfig {
    /// Check the configuration for values the port cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geometry.width == 0 || self.geometry.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.buffer_divisor == 0 || self.buffer_divisor > self.geometry.height {
            return Err(ConfigError::InvalidDivisor);
        }
        if self.tick_period_ms == 0 || self.tick_period_ms > MAX_TICK_PERIOD_MS {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if self.loop_period_ms == 0 {
            return Err(ConfigError::InvalidLoopPeriod);
        }
        if self.touch.width == 0 || self.touch.height == 0 {
            return Err(ConfigError::InvalidTouchSize);
        }
        Ok(())
    }

    /// Pixels per draw buffer
    pub const fn draw_buffer_pixels(&self) -> usize {
        draw_buffer_pixels_for(self.geometry.width, self.geometry.height, self.buffer_divisor)
    }

    /// Bytes per draw buffer
    pub const fn draw_buffer_bytes(&self) -> usize {
        self.draw_buffer_pixels() * BYTES_PER_PIXEL
    }
}

/// Pixels per draw buffer for a given geometry
///
/// Usable in const context for sizing static buffers. A zero divisor
/// yields zero.
pub const fn draw_buffer_pixels_for(width: u16, height: u16, divisor: u16) -> usize {
    if divisor == 0 {
        0
    } else {
        width as usize * height as usize / divisor as usize
    }
}

/// Bytes per draw buffer for a given geometry
pub const fn draw_buffer_bytes_for(width: u16, height: u16, divisor: u16) -> usize {
    draw_buffer_pixels_for(width, height, divisor) * BYTES_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PortConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tick_period_ms, 5);
    }

    #[test]
    fn test_default_buffer_size() {
        let config = PortConfig::default();
        // 240 * 280 / 20 = 3360 pixels, 2 bytes each
        assert_eq!(config.draw_buffer_pixels(), 3360);
        assert_eq!(config.draw_buffer_bytes(), 6720);
        assert_eq!(draw_buffer_bytes_for(240, 280, 20), 6720);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut config = PortConfig::default();
        config.geometry.width = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDimension));
    }

    #[test]
    fn test_divisor_bounds() {
        let mut config = PortConfig::default();
        config.buffer_divisor = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDivisor));

        // One row per buffer is the smallest accepted size
        config.buffer_divisor = 280;
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.draw_buffer_pixels(), 240);

        config.buffer_divisor = 281;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDivisor));
    }

    #[test]
    fn test_tick_period_bounds() {
        let mut config = PortConfig::default();
        config.tick_period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickPeriod));
        config.tick_period_ms = 101;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickPeriod));
        config.tick_period_ms = 100;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_loop_and_touch_checks() {
        let mut config = PortConfig::default();
        config.loop_period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidLoopPeriod));

        let mut config = PortConfig::default();
        config.touch.height = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTouchSize));
    }
}
