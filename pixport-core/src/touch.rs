//! Touch-read callback
//!
//! On every input poll the UI library asks for the current pointer state.
//! The adapter samples the touch controller once, maps the raw point into
//! display coordinates and reports it as pressed. With no finger down (or
//! a failed read) it reports released at the last pressed point, which is
//! what the library expects for a pointer that has been lifted.

use pixport_hal::{Point, TouchError, TouchPanel, TouchPoint};

use crate::config::{DisplayGeometry, TouchMapping};

/// Pointer button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerState {
    #[default]
    Released,
    Pressed,
}

/// Output of one pointer read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerData {
    pub point: Point,
    pub state: PointerState,
    /// Ask the library to call again within the same poll
    pub continue_reading: bool,
}

/// Touch-read callback invoked by the UI library
pub trait PointerDriver {
    fn read(&mut self, data: &mut PointerData);
}

/// Touch adapter over a [`TouchPanel`]
pub struct TouchAdapter<T> {
    touch: T,
    geometry: DisplayGeometry,
    mapping: TouchMapping,
    last_point: Point,
    fault: Option<TouchError>,
}

impl<T: TouchPanel> TouchAdapter<T> {
    pub fn new(touch: T, geometry: DisplayGeometry, mapping: TouchMapping) -> Self {
        Self {
            touch,
            geometry,
            mapping,
            last_point: Point::default(),
            fault: None,
        }
    }

    /// Last reported pressed point
    pub fn last_point(&self) -> Point {
        self.last_point
    }

    /// Latest read error not yet reported
    pub fn take_fault(&mut self) -> Option<TouchError> {
        self.fault.take()
    }

    pub fn touch_mut(&mut self) -> &mut T {
        &mut self.touch
    }
}

impl<T: TouchPanel> PointerDriver for TouchAdapter<T> {
    fn read(&mut self, data: &mut PointerData) {
        data.continue_reading = false;

        match self.touch.read_touch() {
            Ok(Some(raw)) => {
                self.last_point = map_point(raw, &self.mapping, &self.geometry);
                data.state = PointerState::Pressed;
            }
            Ok(None) => {
                data.state = PointerState::Released;
            }
            Err(err) => {
                self.fault = Some(err);
                data.state = PointerState::Released;
            }
        }

        data.point = self.last_point;
    }
}

/// Map a raw touch sample into display coordinates
///
/// The result always lies within `geometry`.
pub fn map_point(raw: TouchPoint, mapping: &TouchMapping, geometry: &DisplayGeometry) -> Point {
    let (mut x, mut y) = (raw.x as u32, raw.y as u32);
    let (mut native_w, mut native_h) = (mapping.width.max(1) as u32, mapping.height.max(1) as u32);

    if mapping.swap_xy {
        core::mem::swap(&mut x, &mut y);
        core::mem::swap(&mut native_w, &mut native_h);
    }

    x = x.min(native_w - 1);
    y = y.min(native_h - 1);

    if mapping.invert_x {
        x = native_w - 1 - x;
    }
    if mapping.invert_y {
        y = native_h - 1 - y;
    }

    let width = geometry.width.max(1) as u32;
    let height = geometry.height.max(1) as u32;

    if native_w != width {
        x = x * width / native_w;
    }
    if native_h != height {
        y = y * height / native_h;
    }

    Point::new(x.min(width - 1) as i32, y.min(height - 1) as i32)
}
