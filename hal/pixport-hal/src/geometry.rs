//! Screen geometry types
//!
//! Coordinates follow the UI library's conventions: signed 32-bit values
//! and inclusive rectangle corners.

/// A point in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A raw sample from a touch controller, in its native coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Rectangular screen region with inclusive corners
///
/// `x2`/`y2` name the last column/row that belongs to the area, so a
/// single pixel at the origin is `Area::new(0, 0, 0, 0)`. An area whose
/// far corner lies before its near corner is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    /// Create an area from its inclusive corners
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area covering a whole `width` x `height` screen
    pub const fn full(width: u16, height: u16) -> Self {
        Self {
            x1: 0,
            y1: 0,
            x2: width as i32 - 1,
            y2: height as i32 - 1,
        }
    }

    /// Width in pixels (0 for an empty area, saturating at `u32::MAX`)
    pub const fn width(&self) -> u32 {
        span(self.x1, self.x2)
    }

    /// Height in pixels (0 for an empty area, saturating at `u32::MAX`)
    pub const fn height(&self) -> u32 {
        span(self.y1, self.y2)
    }

    /// Number of pixels covered (saturating)
    pub const fn pixel_count(&self) -> usize {
        (self.width() as usize).saturating_mul(self.height() as usize)
    }

    /// True if the area covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    /// True if the area is non-empty and lies inside a `width` x `height` screen
    pub const fn fits_within(&self, width: u16, height: u16) -> bool {
        !self.is_empty()
            && self.x1 >= 0
            && self.y1 >= 0
            && self.x2 < width as i32
            && self.y2 < height as i32
    }

    /// True if the point lies inside the area
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Overlapping part of two areas, if any
    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let area = Area {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if area.is_empty() {
            None
        } else {
            Some(area)
        }
    }

    /// Shift the area by a fixed offset
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// Inclusive length of `start..=end`
const fn span(start: i32, end: i32) -> u32 {
    if end < start {
        return 0;
    }
    let len = end as i64 - start as i64 + 1;
    if len > u32::MAX as i64 {
        u32::MAX
    } else {
        len as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_i32_span_is_not_empty() {
        let area = Area::new(i32::MIN, 0, i32::MAX, 0);
        assert!(!area.is_empty());
        assert_eq!(area.width(), u32::MAX);
        assert_eq!(area.height(), 1);
        assert!(area.pixel_count() > 0);
        assert!(!area.fits_within(240, 280));
    }

    #[test]
    fn test_single_pixel_area() {
        let area = Area::new(0, 0, 0, 0);
        assert_eq!(area.width(), 1);
        assert_eq!(area.height(), 1);
        assert_eq!(area.pixel_count(), 1);
        assert!(!area.is_empty());
    }

    #[test]
    fn test_full_area() {
        let area = Area::full(240, 280);
        assert_eq!(area, Area::new(0, 0, 239, 279));
        assert_eq!(area.pixel_count(), 240 * 280);
        assert!(area.fits_within(240, 280));
        assert!(!area.fits_within(240, 279));
    }

    #[test]
    fn test_empty_area() {
        let area = Area::new(10, 10, 9, 20);
        assert!(area.is_empty());
        assert_eq!(area.width(), 0);
        assert_eq!(area.pixel_count(), 0);
        assert!(!area.fits_within(240, 280));
    }

    #[test]
    fn test_negative_origin_does_not_fit() {
        let area = Area::new(-1, 0, 10, 10);
        assert_eq!(area.width(), 12);
        assert!(!area.fits_within(240, 280));
    }

    #[test]
    fn test_intersection() {
        let a = Area::new(0, 0, 99, 99);
        let b = Area::new(50, 60, 149, 159);
        assert_eq!(a.intersection(&b), Some(Area::new(50, 60, 99, 99)));

        let c = Area::new(100, 100, 120, 120);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_contains_and_translate() {
        let area = Area::new(0, 0, 9, 9).translate(0, 20);
        assert_eq!(area, Area::new(0, 20, 9, 29));
        assert!(area.contains(Point::new(5, 25)));
        assert!(!area.contains(Point::new(5, 5)));
    }
}
