//! Display panel abstraction
//!
//! Provides the trait the flush callback writes through. A panel receives
//! a block of RGB565 pixels for one rectangular region and is responsible
//! for getting them onto the glass.

use crate::geometry::Area;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Byte order of the RGB565 pixels handed to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelOrder {
    /// Little-endian, as rendered by the UI library on this MCU
    #[default]
    Native,
    /// Already byte-swapped to big-endian (panel wire order)
    Swapped,
}

/// Display panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Bus transfer to the panel failed
    Bus,
    /// Region lies (partly) outside the panel
    OutOfBounds,
    /// Pixel data length does not match the region
    LengthMismatch,
    /// Panel used before initialization
    NotInitialized,
}

/// Display panel
///
/// Implementations own the bus to the panel controller.
pub trait DisplayPanel {
    /// Visible panel size as (width, height) in the current orientation
    fn size(&self) -> (u16, u16);

    /// Write a block of pixels into a region
    ///
    /// `pixels` holds `area.pixel_count() * BYTES_PER_PIXEL` bytes,
    /// row-major, in the byte order given by `order`.
    fn write_area(&mut self, area: &Area, pixels: &[u8], order: PixelOrder)
        -> Result<(), PanelError>;
}
