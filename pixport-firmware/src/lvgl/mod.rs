//! LVGL runtime
//!
//! Binds the C library to the port's `UiRuntime` seam. LVGL keeps
//! global state and calls back through plain C function pointers, so the
//! drivers lent to `run_timers` are parked behind the display and pointer
//! user-data pointers for exactly the duration of `lv_timer_handler`.
//! Outside that window the user data is null and the trampolines only
//! acknowledge the call.
//!
//! LVGL 9 is bound by default; the `lvgl8` feature binds the LVGL 8.3
//! driver-struct API instead. Only the subset of either API the port
//! needs is declared. The library is linked from `LVGL_LIB_DIR` (see
//! build.rs) and must be configured with `LV_COLOR_DEPTH 16` and
//! `LV_USE_LOG 1`.

use core::cell::Cell;
use core::ffi::{c_char, c_void, CStr};
use core::ptr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use pixport_core::{
    rendered_len, DisplayDriver, DisplayGeometry, DrawBuffers, FlushReady, LogHook, PointerData,
    PointerDriver, UiRuntime,
};
use pixport_hal::Area;
use portable_atomic::{AtomicUsize, Ordering};

#[cfg(feature = "lvgl8")]
mod v8;
#[cfg(feature = "lvgl8")]
use v8 as api;

#[cfg(not(feature = "lvgl8"))]
mod v9;
#[cfg(not(feature = "lvgl8"))]
use v9 as api;

/// Entry points shared by LVGL 8 and 9
mod ffi {
    extern "C" {
        pub fn lv_init();
        pub fn lv_is_initialized() -> bool;
        pub fn lv_tick_inc(tick_period: u32);
        pub fn lv_timer_handler() -> u32;
    }
}

/// LVGL bring-up failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LvglError {
    /// `init` called twice (LVGL state is global)
    AlreadyInitialized,
    /// Display or pointer attached before `init`
    NotInitialized,
    /// Pointer attached before the display
    NoDisplay,
    DisplayCreate,
    IndevCreate,
}

/// Hook receiving LVGL's formatted log lines
static LOG_HOOK: Mutex<CriticalSectionRawMutex, Cell<Option<LogHook>>> =
    Mutex::new(Cell::new(None));

/// Size in bytes of each draw buffer LVGL renders into
static DRAW_BUFFER_LEN: AtomicUsize = AtomicUsize::new(0);

/// LVGL runtime handle
///
/// LVGL is a singleton; create one of these per firmware image.
pub struct LvglRuntime {
    initialized: bool,
    display: *mut api::Display,
    pointer: *mut api::Pointer,
}

impl LvglRuntime {
    pub const fn new() -> Self {
        Self {
            initialized: false,
            display: ptr::null_mut(),
            pointer: ptr::null_mut(),
        }
    }
}

impl Default for LvglRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRuntime for LvglRuntime {
    type Error = LvglError;

    fn init(&mut self, log_hook: LogHook) -> Result<(), LvglError> {
        // SAFETY: LVGL is only ever called from the UI task.
        if self.initialized || unsafe { ffi::lv_is_initialized() } {
            return Err(LvglError::AlreadyInitialized);
        }

        LOG_HOOK.lock(|hook| hook.set(Some(log_hook)));

        // SAFETY: first and only initialization.
        unsafe {
            ffi::lv_init();
            api::register_log();
        }
        self.initialized = true;
        Ok(())
    }

    fn attach_display(
        &mut self,
        geometry: DisplayGeometry,
        buffers: DrawBuffers<'static>,
    ) -> Result<(), LvglError> {
        if !self.initialized {
            return Err(LvglError::NotInitialized);
        }
        if !self.display.is_null() {
            return Err(LvglError::AlreadyInitialized);
        }

        let size = buffers.len();
        let DrawBuffers { primary, secondary } = buffers;
        let buf1 = primary.as_mut_ptr() as *mut c_void;
        let buf2 = secondary.map_or(ptr::null_mut(), |buf| buf.as_mut_ptr() as *mut c_void);
        DRAW_BUFFER_LEN.store(size, Ordering::Relaxed);

        // SAFETY: the buffers are 'static and handed over for good; LVGL
        // owns them from here on.
        self.display = unsafe {
            api::create_display(
                geometry.width as i32,
                geometry.height as i32,
                buf1,
                buf2,
                size as u32,
            )?
        };
        Ok(())
    }

    fn attach_pointer(&mut self) -> Result<(), LvglError> {
        if !self.initialized {
            return Err(LvglError::NotInitialized);
        }
        if self.display.is_null() {
            return Err(LvglError::NoDisplay);
        }

        // SAFETY: LVGL is initialized and the display is registered.
        self.pointer = unsafe { api::create_pointer(self.display)? };
        Ok(())
    }

    fn tick_inc(&mut self, elapsed_ms: u32) {
        if self.initialized {
            // SAFETY: LVGL is initialized and only driven from this task.
            unsafe { ffi::lv_tick_inc(elapsed_ms) };
        }
    }

    fn run_timers(
        &mut self,
        display: &mut dyn DisplayDriver,
        pointer: &mut dyn PointerDriver,
    ) -> u32 {
        if !self.initialized {
            return u32::MAX;
        }

        // The trampolines receive a thin pointer to these fat references.
        let mut display: &mut dyn DisplayDriver = display;
        let mut pointer: &mut dyn PointerDriver = pointer;
        let display_slot = &mut display as *mut &mut dyn DisplayDriver as *mut c_void;
        let pointer_slot = &mut pointer as *mut &mut dyn PointerDriver as *mut c_void;

        // SAFETY: the slots outlive lv_timer_handler and are cleared
        // before this function returns, so the trampolines never see a
        // dangling pointer. LVGL calls back on this stack only.
        unsafe {
            if !self.display.is_null() {
                api::set_display_slot(self.display, display_slot);
            }
            if !self.pointer.is_null() {
                api::set_pointer_slot(self.pointer, pointer_slot);
            }

            let next = ffi::lv_timer_handler();

            if !self.display.is_null() {
                api::set_display_slot(self.display, ptr::null_mut());
            }
            if !self.pointer.is_null() {
                api::set_pointer_slot(self.pointer, ptr::null_mut());
            }
            next
        }
    }
}

/// Hand one rendered area to the display driver parked in `slot`
///
/// # Safety
///
/// `slot` is null or the display slot set by `run_timers`. `px_map` is
/// null or the start of a draw buffer given to `attach_display`.
unsafe fn forward_flush(
    slot: *mut c_void,
    area: Area,
    px_map: *const u8,
    ready: &mut dyn FlushReady,
) {
    let slot = slot as *mut &mut dyn DisplayDriver;
    if slot.is_null() || px_map.is_null() {
        ready.flush_ready();
        return;
    }

    // An area larger than the draw buffer gets an empty map, which the
    // driver rejects as a size mismatch.
    let pixels = match rendered_len(&area, DRAW_BUFFER_LEN.load(Ordering::Relaxed)) {
        // SAFETY: px_map starts a draw buffer of at least `len` bytes.
        Some(len) => core::slice::from_raw_parts(px_map, len),
        None => &[],
    };

    // SAFETY: set by run_timers and valid for the handler run.
    let driver = &mut **slot;
    driver.flush(&area, pixels, ready);
}

/// Sample the pointer driver parked in `slot` (released when none is)
///
/// # Safety
///
/// `slot` is null or the pointer slot set by `run_timers`.
unsafe fn forward_read(slot: *mut c_void) -> PointerData {
    let slot = slot as *mut &mut dyn PointerDriver;
    let mut sample = PointerData::default();
    if !slot.is_null() {
        // SAFETY: set by run_timers and valid for the handler run.
        let driver = &mut **slot;
        driver.read(&mut sample);
    }
    sample
}

/// Pass one log line to the registered hook
///
/// # Safety
///
/// `buf` is null or a NUL-terminated string.
unsafe fn forward_log(buf: *const c_char) {
    if buf.is_null() {
        return;
    }
    let Some(hook) = LOG_HOOK.lock(|hook| hook.get()) else {
        return;
    };
    if let Ok(line) = CStr::from_ptr(buf).to_str() {
        hook(line);
    }
}
