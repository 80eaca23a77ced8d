//! Touch controller abstraction

use crate::geometry::TouchPoint;

/// Touch controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError {
    /// Bus transfer to the controller failed
    Bus,
    /// Controller returned data that cannot be a valid sample
    InvalidData,
    /// Controller did not identify itself
    NotResponding,
}

/// Touch controller
pub trait TouchPanel {
    /// Sample the controller
    ///
    /// Returns `Ok(Some(point))` while a finger is down, `Ok(None)` when
    /// nothing touches the panel.
    fn read_touch(&mut self) -> Result<Option<TouchPoint>, TouchError>;
}
