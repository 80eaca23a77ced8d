//! Pixport Hardware Abstraction Layer
//!
//! This crate defines the traits a display panel and a touch controller
//! must implement to be driven by the pixport port layer. The port layer
//! only ever talks to these traits, so the same glue runs against the real
//! ST7789/CST816 drivers on the board and against mocks on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  UI library (external, e.g. LVGL)       │
//! └─────────────────────────────────────────┘
//!                     │ flush / read / tick
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixport-core (port layer)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixport-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │    ST7789     │       │    CST816     │
//! │  (SPI panel)  │       │  (I2C touch)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`display::DisplayPanel`] - Write a pixel block into a panel region
//! - [`touch::TouchPanel`] - Sample the current touch point

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod geometry;
pub mod touch;

// Re-export key types at crate root for convenience
pub use display::{DisplayPanel, PanelError, PixelOrder, BYTES_PER_PIXEL};
pub use geometry::{Area, Point, TouchPoint};
pub use touch::{TouchError, TouchPanel};
