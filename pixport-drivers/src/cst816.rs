//! CST816 capacitive touch controller driver
//!
//! Single-touch controller found on most small round and rounded-rect
//! TFT modules. Samples are polled over I2C; the interrupt line is not
//! used since the UI library reads the pointer on its own schedule.
//!
//! Touch report layout starting at register 0x01:
//!
//! | Offset | Register  | Content                          |
//! |--------|-----------|----------------------------------|
//! | 0      | GESTURE   | gesture id (ignored)             |
//! | 1      | FINGERS   | number of fingers (low nibble)   |
//! | 2      | XPOS_H    | event flags \| X bits 11..8      |
//! | 3      | XPOS_L    | X bits 7..0                      |
//! | 4      | YPOS_H    | touch id \| Y bits 11..8         |
//! | 5      | YPOS_L    | Y bits 7..0                      |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use pixport_hal::{TouchError, TouchPanel, TouchPoint};

/// Fixed 7-bit I2C address
pub const ADDRESS: u8 = 0x15;

/// CST816 registers
pub mod reg {
    pub const GESTURE: u8 = 0x01;
    pub const FINGERS: u8 = 0x02;
    pub const XPOS_H: u8 = 0x03;
    pub const XPOS_L: u8 = 0x04;
    pub const YPOS_H: u8 = 0x05;
    pub const YPOS_L: u8 = 0x06;
    pub const CHIP_ID: u8 = 0xA7;
    pub const PROJ_ID: u8 = 0xA8;
    pub const FW_VERSION: u8 = 0xA9;
    pub const DIS_AUTO_SLEEP: u8 = 0xFE;
}

/// Bytes in one touch report
const REPORT_LEN: usize = 6;

/// Coordinates are 12 bits wide
const COORD_HIGH_MASK: u8 = 0x0F;

/// Chip variant, from the chip id register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipModel {
    Cst816S,
    Cst816T,
    Cst816D,
    Cst716,
    Unknown(u8),
}

impl From<u8> for ChipModel {
    fn from(id: u8) -> Self {
        match id {
            0xB4 => ChipModel::Cst816S,
            0xB5 => ChipModel::Cst816T,
            0xB6 => ChipModel::Cst816D,
            0x20 => ChipModel::Cst716,
            other => ChipModel::Unknown(other),
        }
    }
}

/// Identification read by [`Cst816::probe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub model: ChipModel,
    pub chip_id: u8,
    pub project_id: u8,
    pub firmware_version: u8,
}

/// CST816 touch driver
pub struct Cst816<I2C> {
    i2c: I2C,
    /// Native coordinate range (exclusive)
    width: u16,
    height: u16,
}

impl<I2C: I2c> Cst816<I2C> {
    /// Create a driver for a controller reporting `width` x `height`
    /// native coordinates
    pub fn new(i2c: I2C, width: u16, height: u16) -> Self {
        Self { i2c, width, height }
    }

    /// Pulse the reset line and wait for the controller to boot
    pub fn hardware_reset<RST: OutputPin, D: DelayNs>(
        &mut self,
        rst: &mut RST,
        delay: &mut D,
    ) -> Result<(), TouchError> {
        rst.set_low().map_err(|_| TouchError::Bus)?;
        delay.delay_ms(5);
        rst.set_high().map_err(|_| TouchError::Bus)?;
        delay.delay_ms(50);
        Ok(())
    }

    /// Read chip identification
    ///
    /// A floating bus reads back 0x00 or 0xFF, which is reported as
    /// `NotResponding`.
    pub fn probe(&mut self) -> Result<ChipInfo, TouchError> {
        let mut ids = [0u8; 3];
        self.i2c
            .write_read(ADDRESS, &[reg::CHIP_ID], &mut ids)
            .map_err(|_| TouchError::NotResponding)?;

        let [chip_id, project_id, firmware_version] = ids;
        if chip_id == 0x00 || chip_id == 0xFF {
            return Err(TouchError::NotResponding);
        }

        Ok(ChipInfo {
            model: ChipModel::from(chip_id),
            chip_id,
            project_id,
            firmware_version,
        })
    }

    /// Keep the controller awake so polling never hits a sleeping chip
    pub fn disable_auto_sleep(&mut self) -> Result<(), TouchError> {
        self.i2c
            .write(ADDRESS, &[reg::DIS_AUTO_SLEEP, 0x01])
            .map_err(|_| TouchError::Bus)
    }

    /// Native coordinate range
    pub fn native_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn decode(&self, report: &[u8; REPORT_LEN]) -> Result<Option<TouchPoint>, TouchError> {
        let fingers = report[1] & 0x0F;
        match fingers {
            0 => return Ok(None),
            1 => {}
            _ => return Err(TouchError::InvalidData),
        }

        let x = u16::from_be_bytes([report[2] & COORD_HIGH_MASK, report[3]]);
        let y = u16::from_be_bytes([report[4] & COORD_HIGH_MASK, report[5]]);
        if x >= self.width || y >= self.height {
            return Err(TouchError::InvalidData);
        }

        Ok(Some(TouchPoint::new(x, y)))
    }
}

impl<I2C: I2c> TouchPanel for Cst816<I2C> {
    fn read_touch(&mut self) -> Result<Option<TouchPoint>, TouchError> {
        let mut report = [0u8; REPORT_LEN];
        self.i2c
            .write_read(ADDRESS, &[reg::GESTURE], &mut report)
            .map_err(|_| TouchError::Bus)?;
        self.decode(&report)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::vec::Vec;

    use embedded_hal::digital::ErrorType as DigitalErrorType;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;

    /// Register file behind a register pointer, like the real chip
    struct MockI2c {
        regs: [u8; 256],
        pointer: u8,
        fail: bool,
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl MockI2c {
        fn new() -> Self {
            Self {
                regs: [0; 256],
                pointer: 0,
                fail: false,
                writes: Vec::new(),
            }
        }

        fn with_touch(fingers: u8, x: u16, y: u16) -> Self {
            let mut mock = Self::new();
            mock.regs[reg::FINGERS as usize] = fingers;
            // Event bits in the upper nibble must be masked off
            mock.regs[reg::XPOS_H as usize] = 0x80 | (x >> 8) as u8;
            mock.regs[reg::XPOS_L as usize] = x as u8;
            mock.regs[reg::YPOS_H as usize] = 0x10 | (y >> 8) as u8;
            mock.regs[reg::YPOS_L as usize] = y as u8;
            mock
        }
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.fail || address != ADDRESS {
                return Err(ErrorKind::Other);
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        self.writes.push((address, bytes.to_vec()));
                        if let Some((&first, rest)) = bytes.split_first() {
                            self.pointer = first;
                            for &value in rest {
                                self.regs[self.pointer as usize] = value;
                                self.pointer = self.pointer.wrapping_add(1);
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for byte in buf.iter_mut() {
                            *byte = self.regs[self.pointer as usize];
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_single_touch() {
        let mut touch = Cst816::new(MockI2c::with_touch(1, 120, 260), 240, 280);
        assert_eq!(touch.read_touch(), Ok(Some(TouchPoint::new(120, 260))));
    }

    #[test]
    fn test_twelve_bit_coordinates() {
        let mut touch = Cst816::new(MockI2c::with_touch(1, 0x123, 0x456), 4096, 4096);
        assert_eq!(touch.read_touch(), Ok(Some(TouchPoint::new(0x123, 0x456))));
    }

    #[test]
    fn test_no_finger_is_none() {
        let mut touch = Cst816::new(MockI2c::with_touch(0, 10, 10), 240, 280);
        assert_eq!(touch.read_touch(), Ok(None));
    }

    #[test]
    fn test_multiple_fingers_rejected() {
        let mut touch = Cst816::new(MockI2c::with_touch(2, 10, 10), 240, 280);
        assert_eq!(touch.read_touch(), Err(TouchError::InvalidData));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut touch = Cst816::new(MockI2c::with_touch(1, 240, 10), 240, 280);
        assert_eq!(touch.read_touch(), Err(TouchError::InvalidData));

        let mut touch = Cst816::new(MockI2c::with_touch(1, 10, 280), 240, 280);
        assert_eq!(touch.read_touch(), Err(TouchError::InvalidData));
    }

    #[test]
    fn test_bus_error() {
        let mut mock = MockI2c::with_touch(1, 10, 10);
        mock.fail = true;
        let mut touch = Cst816::new(mock, 240, 280);
        assert_eq!(touch.read_touch(), Err(TouchError::Bus));
    }

    #[test]
    fn test_probe_identifies_chip() {
        let mut mock = MockI2c::new();
        mock.regs[reg::CHIP_ID as usize] = 0xB5;
        mock.regs[reg::PROJ_ID as usize] = 0x00;
        mock.regs[reg::FW_VERSION as usize] = 0x02;
        let mut touch = Cst816::new(mock, 240, 280);

        let info = touch.probe().unwrap();
        assert_eq!(info.model, ChipModel::Cst816T);
        assert_eq!(info.chip_id, 0xB5);
        assert_eq!(info.firmware_version, 0x02);
    }

    #[test]
    fn test_probe_unknown_model() {
        let mut mock = MockI2c::new();
        mock.regs[reg::CHIP_ID as usize] = 0x42;
        let mut touch = Cst816::new(mock, 240, 280);
        assert_eq!(touch.probe().unwrap().model, ChipModel::Unknown(0x42));
    }

    #[test]
    fn test_probe_floating_bus() {
        let mut mock = MockI2c::new();
        mock.regs[reg::CHIP_ID as usize] = 0xFF;
        let mut touch = Cst816::new(mock, 240, 280);
        assert_eq!(touch.probe(), Err(TouchError::NotResponding));

        let mut mock = MockI2c::new();
        mock.fail = true;
        let mut touch = Cst816::new(mock, 240, 280);
        assert_eq!(touch.probe(), Err(TouchError::NotResponding));
    }

    #[test]
    fn test_disable_auto_sleep_writes_register() {
        let mut touch = Cst816::new(MockI2c::new(), 240, 280);
        touch.disable_auto_sleep().unwrap();

        let mock = touch.release();
        assert_eq!(mock.writes, [(ADDRESS, std::vec![reg::DIS_AUTO_SLEEP, 0x01])]);
        assert_eq!(mock.regs[reg::DIS_AUTO_SLEEP as usize], 0x01);
    }

    struct MockRst(Vec<bool>);

    impl DigitalErrorType for MockRst {
        type Error = Infallible;
    }

    impl OutputPin for MockRst {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.push(true);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_hardware_reset_pulses_low_then_high() {
        let mut touch = Cst816::new(MockI2c::new(), 240, 280);
        let mut rst = MockRst(Vec::new());
        touch.hardware_reset(&mut rst, &mut NoDelay).unwrap();
        assert_eq!(rst.0, [false, true]);
    }
}
