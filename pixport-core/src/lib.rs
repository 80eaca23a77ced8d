//! Board-agnostic port layer for driving a UI library on a touch panel
//!
//! This crate contains the glue between an external UI library (which
//! renders widgets into partial draw buffers) and the display/touch
//! hardware described by `pixport-hal`:
//!
//! - Port configuration and draw buffer sizing
//! - Tick counter shared between the timer context and the UI loop
//! - Flush adapter (draw buffer → panel region)
//! - Touch adapter (controller sample → pointer state)
//! - Log hook for the UI library's text logger
//! - The `UiRuntime` seam and the `Port` that owns init and the UI loop

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod flush;
pub mod log;
pub mod port;
pub mod tick;
pub mod touch;

pub use config::{ConfigError, DisplayGeometry, PortConfig, TouchMapping};
pub use flush::{rendered_len, DisplayDriver, FlushAdapter, FlushError, FlushReady, FlushStats};
pub use log::{LogBuffer, LogHook, LogLevel, LogRecord};
pub use port::{BufferError, DrawBuffers, Port, PortError, PortFault, UiRuntime};
pub use tick::{TickCounter, TickDriver};
pub use touch::{PointerData, PointerDriver, PointerState, TouchAdapter};
