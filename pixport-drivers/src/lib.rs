//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pixport-hal for the reference display module:
//!
//! - ST7789 TFT panel controller (SPI, RGB565)
//! - CST816 capacitive touch controller (I2C)
//!
//! Both drivers are written against embedded-hal 1.0 blocking traits,
//! since the UI library calls flush and read synchronously.

#![no_std]
#![deny(unsafe_code)]

pub mod cst816;
pub mod st7789;

pub use cst816::{ChipInfo, ChipModel, Cst816};
pub use st7789::{Orientation, St7789, St7789Config};
