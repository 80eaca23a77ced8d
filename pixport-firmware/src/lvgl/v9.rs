//! LVGL 9 display and indev objects

use core::ffi::{c_char, c_void};
use core::ptr;

use pixport_core::{FlushReady, PointerState};
use pixport_hal::Area;

use super::{forward_flush, forward_log, forward_read, LvglError};

#[allow(non_camel_case_types, dead_code)]
mod ffi {
    use core::ffi::{c_char, c_int, c_void};

    #[repr(C)]
    pub struct lv_display_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    pub struct lv_indev_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct lv_area_t {
        pub x1: i32,
        pub y1: i32,
        pub x2: i32,
        pub y2: i32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct lv_point_t {
        pub x: i32,
        pub y: i32,
    }

    #[repr(C)]
    pub struct lv_indev_data_t {
        pub point: lv_point_t,
        pub key: u32,
        pub btn_id: u32,
        pub enc_diff: i16,
        pub state: c_int,
        pub continue_reading: bool,
    }

    pub type lv_log_level_t = i8;

    pub type lv_display_flush_cb_t =
        Option<unsafe extern "C" fn(disp: *mut lv_display_t, area: *const lv_area_t, px_map: *mut u8)>;
    pub type lv_indev_read_cb_t =
        Option<unsafe extern "C" fn(indev: *mut lv_indev_t, data: *mut lv_indev_data_t)>;
    pub type lv_log_print_g_cb_t =
        Option<unsafe extern "C" fn(level: lv_log_level_t, buf: *const c_char)>;

    pub const LV_COLOR_FORMAT_RGB565: c_int = 0x12;
    pub const LV_DISPLAY_RENDER_MODE_PARTIAL: c_int = 0;
    pub const LV_INDEV_TYPE_POINTER: c_int = 1;
    pub const LV_INDEV_STATE_RELEASED: c_int = 0;
    pub const LV_INDEV_STATE_PRESSED: c_int = 1;

    extern "C" {
        pub fn lv_log_register_print_cb(print_cb: lv_log_print_g_cb_t);

        pub fn lv_display_create(hor_res: i32, ver_res: i32) -> *mut lv_display_t;
        pub fn lv_display_set_color_format(disp: *mut lv_display_t, color_format: c_int);
        pub fn lv_display_set_buffers(
            disp: *mut lv_display_t,
            buf1: *mut c_void,
            buf2: *mut c_void,
            buf_size: u32,
            render_mode: c_int,
        );
        pub fn lv_display_set_flush_cb(disp: *mut lv_display_t, flush_cb: lv_display_flush_cb_t);
        pub fn lv_display_flush_ready(disp: *mut lv_display_t);
        pub fn lv_display_set_user_data(disp: *mut lv_display_t, user_data: *mut c_void);
        pub fn lv_display_get_user_data(disp: *mut lv_display_t) -> *mut c_void;

        pub fn lv_indev_create() -> *mut lv_indev_t;
        pub fn lv_indev_set_type(indev: *mut lv_indev_t, indev_type: c_int);
        pub fn lv_indev_set_read_cb(indev: *mut lv_indev_t, read_cb: lv_indev_read_cb_t);
        pub fn lv_indev_set_display(indev: *mut lv_indev_t, disp: *mut lv_display_t);
        pub fn lv_indev_set_user_data(indev: *mut lv_indev_t, user_data: *mut c_void);
        pub fn lv_indev_get_user_data(indev: *mut lv_indev_t) -> *mut c_void;
    }
}

use ffi::*;

pub(super) type Display = lv_display_t;
pub(super) type Pointer = lv_indev_t;

pub(super) unsafe fn register_log() {
    lv_log_register_print_cb(Some(log_trampoline));
}

/// Create the display over the draw buffers (`size` bytes each)
pub(super) unsafe fn create_display(
    width: i32,
    height: i32,
    buf1: *mut c_void,
    buf2: *mut c_void,
    size: u32,
) -> Result<*mut Display, LvglError> {
    let display = lv_display_create(width, height);
    if display.is_null() {
        return Err(LvglError::DisplayCreate);
    }

    lv_display_set_color_format(display, LV_COLOR_FORMAT_RGB565);
    lv_display_set_buffers(display, buf1, buf2, size, LV_DISPLAY_RENDER_MODE_PARTIAL);
    lv_display_set_flush_cb(display, Some(flush_trampoline));
    lv_display_set_user_data(display, ptr::null_mut());
    Ok(display)
}

pub(super) unsafe fn create_pointer(display: *mut Display) -> Result<*mut Pointer, LvglError> {
    let indev = lv_indev_create();
    if indev.is_null() {
        return Err(LvglError::IndevCreate);
    }

    lv_indev_set_type(indev, LV_INDEV_TYPE_POINTER);
    lv_indev_set_read_cb(indev, Some(read_trampoline));
    lv_indev_set_display(indev, display);
    lv_indev_set_user_data(indev, ptr::null_mut());
    Ok(indev)
}

pub(super) unsafe fn set_display_slot(display: *mut Display, slot: *mut c_void) {
    lv_display_set_user_data(display, slot);
}

pub(super) unsafe fn set_pointer_slot(pointer: *mut Pointer, slot: *mut c_void) {
    lv_indev_set_user_data(pointer, slot);
}

/// Completion signal for one flush
struct DisplayFlushReady(*mut lv_display_t);

impl FlushReady for DisplayFlushReady {
    fn flush_ready(&mut self) {
        // SAFETY: the display pointer comes from LVGL's own flush call.
        unsafe { lv_display_flush_ready(self.0) };
    }
}

unsafe extern "C" fn flush_trampoline(
    disp: *mut lv_display_t,
    area: *const lv_area_t,
    px_map: *mut u8,
) {
    let mut ready = DisplayFlushReady(disp);
    if area.is_null() {
        ready.flush_ready();
        return;
    }

    let area = *area;
    let area = Area::new(area.x1, area.y1, area.x2, area.y2);
    forward_flush(lv_display_get_user_data(disp), area, px_map, &mut ready);
}

unsafe extern "C" fn read_trampoline(indev: *mut lv_indev_t, data: *mut lv_indev_data_t) {
    if data.is_null() {
        return;
    }

    let sample = forward_read(lv_indev_get_user_data(indev));

    // SAFETY: LVGL passes a valid, exclusive data struct.
    let data = &mut *data;
    data.point = lv_point_t {
        x: sample.point.x,
        y: sample.point.y,
    };
    data.state = match sample.state {
        PointerState::Pressed => LV_INDEV_STATE_PRESSED,
        PointerState::Released => LV_INDEV_STATE_RELEASED,
    };
    data.continue_reading = sample.continue_reading;
}

unsafe extern "C" fn log_trampoline(_level: lv_log_level_t, buf: *const c_char) {
    forward_log(buf);
}
