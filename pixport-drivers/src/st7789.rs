//! ST7789 TFT panel driver
//!
//! Driver for ST7789-based RGB565 panels over 4-wire SPI (separate D/C
//! line). The controller has 240x320 pixels of frame memory; smaller
//! glass such as the 240x280 module sits at a fixed offset inside it,
//! which is applied to every window.
//!
//! # Write path
//!
//! Every region write is CASET + RASET (window) → RAMWR → pixel data.
//! The panel expects big-endian RGB565; pixels rendered in native
//! (little-endian) order are swapped through a small stack buffer.
//!
//! The driver also implements embedded-graphics `DrawTarget`, used to
//! clear the panel before the UI library takes over.

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{ContainsPoint, PointsIter, Rectangle};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use pixport_hal::{Area, DisplayPanel, PanelError, PixelOrder, BYTES_PER_PIXEL};

/// Controller frame memory width
const RAM_WIDTH: u16 = 240;
/// Controller frame memory height
const RAM_HEIGHT: u16 = 320;

/// Bytes sent per SPI write when converting pixels
const CHUNK_BYTES: usize = 512;

/// ST7789 commands
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

// MADCTL flags
const MADCTL_MY: u8 = 0x80; // Row address order
const MADCTL_MX: u8 = 0x40; // Column address order
const MADCTL_MV: u8 = 0x20; // Row/column exchange

/// 16 bits per pixel on both the RGB and MCU interface
const COLMOD_RGB565: u8 = 0x55;

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    #[default]
    Portrait,
    /// Rotated 90° clockwise
    Landscape,
    /// Rotated 180°
    PortraitFlipped,
    /// Rotated 270° clockwise
    LandscapeFlipped,
}

impl Orientation {
    /// MADCTL value for this orientation
    pub const fn madctl(self) -> u8 {
        match self {
            Orientation::Portrait => 0,
            Orientation::Landscape => MADCTL_MX | MADCTL_MV,
            Orientation::PortraitFlipped => MADCTL_MX | MADCTL_MY,
            Orientation::LandscapeFlipped => MADCTL_MY | MADCTL_MV,
        }
    }

    /// True if rows and columns are exchanged
    pub const fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape | Orientation::LandscapeFlipped)
    }
}

/// Panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct St7789Config {
    /// Native glass width (portrait)
    pub width: u16,
    /// Native glass height (portrait)
    pub height: u16,
    /// Column of the glass inside frame memory (portrait)
    pub x_offset: u16,
    /// Row of the glass inside frame memory (portrait)
    pub y_offset: u16,
    pub orientation: Orientation,
    /// Most IPS modules need inversion on
    pub invert_colors: bool,
}

impl Default for St7789Config {
    /// 1.69" 240x280 module
    fn default() -> Self {
        Self {
            width: 240,
            height: 280,
            x_offset: 0,
            y_offset: 20,
            orientation: Orientation::Portrait,
            invert_colors: true,
        }
    }
}

/// ST7789 panel driver
pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
    config: St7789Config,
    initialized: bool,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a new driver. `rst` may be `None` when the reset line is
    /// tied to the MCU reset.
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>, config: St7789Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            config,
            initialized: false,
        }
    }

    /// Reset and configure the controller, then switch the display on
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PanelError> {
        if let Some(rst) = self.rst.as_mut() {
            rst.set_low().map_err(|_| PanelError::Bus)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| PanelError::Bus)?;
            delay.delay_ms(120);
        }

        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(150);

        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(120);

        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        self.command(cmd::MADCTL, &[self.config.orientation.madctl()])?;

        if self.config.invert_colors {
            self.command(cmd::INVON, &[])?;
        } else {
            self.command(cmd::INVOFF, &[])?;
        }
        delay.delay_ms(10);

        self.command(cmd::NORON, &[])?;
        delay.delay_ms(10);

        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(10);

        self.initialized = true;
        Ok(())
    }

    /// Change orientation after init
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), PanelError> {
        self.config.orientation = orientation;
        if self.initialized {
            self.command(cmd::MADCTL, &[orientation.madctl()])?;
        }
        Ok(())
    }

    /// Put the panel to sleep or wake it
    pub fn set_sleep<D: DelayNs>(&mut self, sleep: bool, delay: &mut D) -> Result<(), PanelError> {
        if !self.initialized {
            return Err(PanelError::NotInitialized);
        }
        if sleep {
            self.command(cmd::DISPOFF, &[])?;
            self.command(cmd::SLPIN, &[])?;
        } else {
            self.command(cmd::SLPOUT, &[])?;
            delay.delay_ms(120);
            self.command(cmd::DISPON, &[])?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Visible (width, height) in the current orientation
    pub fn visible_size(&self) -> (u16, u16) {
        if self.config.orientation.is_landscape() {
            (self.config.height, self.config.width)
        } else {
            (self.config.width, self.config.height)
        }
    }

    /// Glass origin in frame memory for the current orientation
    fn offsets(&self) -> (u16, u16) {
        let c = &self.config;
        match c.orientation {
            Orientation::Portrait => (c.x_offset, c.y_offset),
            Orientation::PortraitFlipped => (
                RAM_WIDTH.saturating_sub(c.width + c.x_offset),
                RAM_HEIGHT.saturating_sub(c.height + c.y_offset),
            ),
            Orientation::Landscape => (c.y_offset, c.x_offset),
            Orientation::LandscapeFlipped => (
                RAM_HEIGHT.saturating_sub(c.height + c.y_offset),
                RAM_WIDTH.saturating_sub(c.width + c.x_offset),
            ),
        }
    }

    /// Send a command byte (DC low) followed by optional parameters (DC high)
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Bus)?;
        self.spi.write(&[command]).map_err(|_| PanelError::Bus)?;
        if !params.is_empty() {
            self.write_data(params)?;
        }
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), PanelError> {
        self.dc.set_high().map_err(|_| PanelError::Bus)?;
        self.spi.write(data).map_err(|_| PanelError::Bus)
    }

    /// Set the drawing window and start a RAM write
    fn set_window(&mut self, area: &Area) -> Result<(), PanelError> {
        let (dx, dy) = self.offsets();
        let x1 = area.x1 as u16 + dx;
        let x2 = area.x2 as u16 + dx;
        let y1 = area.y1 as u16 + dy;
        let y2 = area.y2 as u16 + dy;

        let [x1h, x1l] = x1.to_be_bytes();
        let [x2h, x2l] = x2.to_be_bytes();
        self.command(cmd::CASET, &[x1h, x1l, x2h, x2l])?;

        let [y1h, y1l] = y1.to_be_bytes();
        let [y2h, y2l] = y2.to_be_bytes();
        self.command(cmd::RASET, &[y1h, y1l, y2h, y2l])?;

        self.command(cmd::RAMWR, &[])
    }

    fn check_area(&self, area: &Area) -> Result<(), PanelError> {
        if !self.initialized {
            return Err(PanelError::NotInitialized);
        }
        let (width, height) = self.visible_size();
        if !area.fits_within(width, height) {
            return Err(PanelError::OutOfBounds);
        }
        Ok(())
    }

    /// Stream pixels that are in native byte order, swapping each pair
    fn write_native(&mut self, pixels: &[u8]) -> Result<(), PanelError> {
        let mut chunk = [0u8; CHUNK_BYTES];
        for block in pixels.chunks(CHUNK_BYTES) {
            for (dst, src) in chunk.chunks_exact_mut(2).zip(block.chunks_exact(2)) {
                dst[0] = src[1];
                dst[1] = src[0];
            }
            self.write_data(&chunk[..block.len()])?;
        }
        Ok(())
    }

    /// Fill a region with one color
    pub fn fill_area(&mut self, area: &Area, color: Rgb565) -> Result<(), PanelError> {
        self.check_area(area)?;
        self.set_window(area)?;

        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        let mut chunk = [0u8; CHUNK_BYTES];
        for pair in chunk.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        let mut remaining = area.pixel_count() * BYTES_PER_PIXEL;
        while remaining > 0 {
            let len = remaining.min(CHUNK_BYTES);
            self.write_data(&chunk[..len])?;
            remaining -= len;
        }
        Ok(())
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, DC, Option<RST>) {
        (self.spi, self.dc, self.rst)
    }
}

impl<SPI, DC, RST> DisplayPanel for St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn size(&self) -> (u16, u16) {
        self.visible_size()
    }

    fn write_area(
        &mut self,
        area: &Area,
        pixels: &[u8],
        order: PixelOrder,
    ) -> Result<(), PanelError> {
        self.check_area(area)?;
        if pixels.len() != area.pixel_count() * BYTES_PER_PIXEL {
            return Err(PanelError::LengthMismatch);
        }

        self.set_window(area)?;
        match order {
            PixelOrder::Swapped => self.write_data(pixels),
            PixelOrder::Native => self.write_native(pixels),
        }
    }
}

impl<SPI, DC, RST> OriginDimensions for St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        let (width, height) = self.visible_size();
        Size::new(width as u32, height as u32)
    }
}

impl<SPI, DC, RST> DrawTarget for St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = PanelError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                let area = Area::new(point.x, point.y, point.x, point.y);
                self.fill_area(&area, color)?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        // Partially visible: fall back to per-pixel clipping
        if area.intersection(&self.bounding_box()) != *area {
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        }

        let region = Area::new(area.top_left.x, area.top_left.y, bottom_right.x, bottom_right.y);
        self.check_area(&region)?;
        self.set_window(&region)?;

        let mut chunk = [0u8; CHUNK_BYTES];
        let mut len = 0;
        for color in colors.into_iter().take(region.pixel_count()) {
            let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
            chunk[len] = hi;
            chunk[len + 1] = lo;
            len += 2;
            if len == CHUNK_BYTES {
                self.write_data(&chunk)?;
                len = 0;
            }
        }
        if len > 0 {
            self.write_data(&chunk[..len])?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        match clipped.bottom_right() {
            Some(bottom_right) => {
                let region = Area::new(
                    clipped.top_left.x,
                    clipped.top_left.y,
                    bottom_right.x,
                    bottom_right.y,
                );
                self.fill_area(&region, color)
            }
            None => Ok(()),
        }
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let bounds = self.bounding_box();
        self.fill_solid(&bounds, color)
    }
}
