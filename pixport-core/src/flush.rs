//! Display flush callback
//!
//! The UI library renders a dirty region into a draw buffer and hands it
//! to [`DisplayDriver::flush`]. The adapter copies it onto the panel and
//! then signals completion so the library can reuse the buffer. There is
//! no retry: a failed flush is counted, remembered as a fault, and still
//! completed.

use pixport_hal::{Area, DisplayPanel, PanelError, PixelOrder, BYTES_PER_PIXEL};

/// Completion signal for one flush
///
/// Implemented by the UI runtime; the equivalent of telling the library
/// that its buffer is free again.
pub trait FlushReady {
    fn flush_ready(&mut self);
}

/// Flush callback invoked by the UI library
pub trait DisplayDriver {
    /// Copy `pixels` into `area` of the physical display, then call
    /// `done.flush_ready()` exactly once.
    fn flush(&mut self, area: &Area, pixels: &[u8], done: &mut dyn FlushReady);
}

/// Bytes `area` occupies in a draw buffer of `capacity` bytes
///
/// `None` when the region would run past the end of the buffer.
pub fn rendered_len(area: &Area, capacity: usize) -> Option<usize> {
    area.pixel_count()
        .checked_mul(BYTES_PER_PIXEL)
        .filter(|len| *len <= capacity)
}

/// Flush failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushError {
    /// Region is empty or reaches outside the panel
    OutOfBounds(Area),
    /// Buffer length does not match the region (both in bytes)
    SizeMismatch { expected: usize, actual: usize },
    /// Panel rejected the transfer
    Panel(PanelError),
}

/// Flush counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    /// Successful flushes
    pub frames: u32,
    /// Pixels written by successful flushes
    pub pixels: u32,
    /// Flushes rejected before reaching the panel
    pub rejected: u32,
    /// Flushes the panel failed
    pub panel_errors: u32,
}

/// Flush adapter over a [`DisplayPanel`]
pub struct FlushAdapter<P> {
    panel: P,
    order: PixelOrder,
    stats: FlushStats,
    fault: Option<FlushError>,
}

impl<P: DisplayPanel> FlushAdapter<P> {
    pub fn new(panel: P, order: PixelOrder) -> Self {
        Self {
            panel,
            order,
            stats: FlushStats::default(),
            fault: None,
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Latest fault not yet reported
    pub fn take_fault(&mut self) -> Option<FlushError> {
        self.fault.take()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Validate and write one region
    pub fn write(&mut self, area: &Area, pixels: &[u8]) -> Result<(), FlushError> {
        let (width, height) = self.panel.size();
        if !area.fits_within(width, height) {
            return Err(FlushError::OutOfBounds(*area));
        }

        let expected = area.pixel_count() * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(FlushError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        self.panel
            .write_area(area, pixels, self.order)
            .map_err(FlushError::Panel)
    }

    fn record(&mut self, area: &Area, result: Result<(), FlushError>) {
        match result {
            Ok(()) => {
                self.stats.frames = self.stats.frames.wrapping_add(1);
                self.stats.pixels = self.stats.pixels.wrapping_add(area.pixel_count() as u32);
            }
            Err(err) => {
                match err {
                    FlushError::Panel(_) => {
                        self.stats.panel_errors = self.stats.panel_errors.wrapping_add(1)
                    }
                    _ => self.stats.rejected = self.stats.rejected.wrapping_add(1),
                }
                self.fault = Some(err);
            }
        }
    }
}

impl<P: DisplayPanel> DisplayDriver for FlushAdapter<P> {
    fn flush(&mut self, area: &Area, pixels: &[u8], done: &mut dyn FlushReady) {
        let result = self.write(area, pixels);
        self.record(area, result);
        done.flush_ready();
    }
}
