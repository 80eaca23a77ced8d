//! LVGL log sink
//!
//! LVGL log lines are routed to defmt at their own level and the most
//! recent ones are kept in [`UI_LOG`] for inspection from a debugger or
//! a diagnostics screen.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use pixport_core::{LogBuffer, LogLevel, LogRecord};

/// Last LVGL log lines, oldest first
pub static UI_LOG: Mutex<CriticalSectionRawMutex, LogBuffer> = Mutex::new(LogBuffer::new());

/// Log hook installed into LVGL at init
///
/// Never blocks: if the buffer is held elsewhere the line is only
/// emitted through defmt.
pub fn ui_log(line: &str) {
    let record = LogRecord::parse(line);

    match record.level {
        LogLevel::Trace => trace!("lvgl: {}", record.as_str()),
        LogLevel::Info | LogLevel::User => info!("lvgl: {}", record.as_str()),
        LogLevel::Warn => warn!("lvgl: {}", record.as_str()),
        LogLevel::Error => error!("lvgl: {}", record.as_str()),
    }

    if let Ok(mut log) = UI_LOG.try_lock() {
        log.push(record);
    }
}
