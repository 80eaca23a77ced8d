//! Embassy async tasks
//!
//! The tick task and the UI task share only the tick counter.

pub mod tick;
pub mod ui;

pub use tick::{tick_task, TICKS};
pub use ui::ui_task;
