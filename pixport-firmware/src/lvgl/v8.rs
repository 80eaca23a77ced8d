//! LVGL 8.3 display and input drivers
//!
//! LVGL 8 keeps pointers to caller-owned driver structs, so their layout
//! is declared here in full. It matches an `lv_conf.h` with
//! `LV_USE_USER_DATA 1`, `LV_USE_LARGE_COORD 0` and `LV_COLOR_16_SWAP 0`.

use core::ffi::{c_char, c_void};
use core::ptr;

use pixport_core::{FlushReady, PointerState};
use pixport_hal::Area;
use static_cell::StaticCell;

use super::{forward_flush, forward_log, forward_read, LvglError};

#[allow(non_camel_case_types, dead_code)]
mod ffi {
    use core::ffi::{c_char, c_int, c_void};

    pub type lv_coord_t = i16;

    #[repr(C)]
    pub struct lv_disp_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    pub struct lv_indev_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct lv_color_t {
        pub full: u16,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct lv_area_t {
        pub x1: lv_coord_t,
        pub y1: lv_coord_t,
        pub x2: lv_coord_t,
        pub y2: lv_coord_t,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct lv_point_t {
        pub x: lv_coord_t,
        pub y: lv_coord_t,
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

    #[repr(C)]
    pub struct lv_disp_draw_buf_t {
        pub buf1: *mut c_void,
        pub buf2: *mut c_void,
        pub buf_act: *mut c_void,
        /// In pixels
        pub size: u32,
        pub flushing: c_int,
        pub flushing_last: c_int,
        /// `last_area` and `last_part` bitfields
        pub last: u32,
    }

    pub type lv_disp_flush_cb_t = Option<
        unsafe extern "C" fn(
            disp_drv: *mut lv_disp_drv_t,
            area: *const lv_area_t,
            color_p: *mut lv_color_t,
        ),
    >;

    #[repr(C)]
    pub struct lv_disp_drv_t {
        pub hor_res: lv_coord_t,
        pub ver_res: lv_coord_t,
        pub physical_hor_res: lv_coord_t,
        pub physical_ver_res: lv_coord_t,
        pub offset_x: lv_coord_t,
        pub offset_y: lv_coord_t,
        pub draw_buf: *mut lv_disp_draw_buf_t,
        /// `direct_mode` through `dpi` bitfields
        pub flags: u32,
        pub flush_cb: lv_disp_flush_cb_t,
        pub rounder_cb: *mut c_void,
        pub set_px_cb: *mut c_void,
        pub clear_cb: *mut c_void,
        pub monitor_cb: *mut c_void,
        pub wait_cb: *mut c_void,
        pub clean_dcache_cb: *mut c_void,
        pub drv_update_cb: *mut c_void,
        pub render_start_cb: *mut c_void,
        pub color_chroma_key: lv_color_t,
        pub draw_ctx: *mut c_void,
        pub draw_ctx_init: *mut c_void,
        pub draw_ctx_deinit: *mut c_void,
        pub draw_ctx_size: usize,
        pub user_data: *mut c_void,
    }

    pub type lv_indev_read_cb_t =
        Option<unsafe extern "C" fn(indev_drv: *mut lv_indev_drv_t, data: *mut lv_indev_data_t)>;

    #[repr(C)]
    pub struct lv_indev_drv_t {
        pub type_: u8,
        pub read_cb: lv_indev_read_cb_t,
        pub feedback_cb: *mut c_void,
        pub user_data: *mut c_void,
        pub disp: *mut lv_disp_t,
        pub read_timer: *mut c_void,
        pub scroll_limit: u8,
        pub scroll_throw: u8,
        pub gesture_min_velocity: u8,
        pub gesture_limit: u8,
        pub long_press_time: u16,
        pub long_press_repeat_time: u16,
    }

    pub type lv_log_print_g_cb_t = Option<unsafe extern "C" fn(buf: *const c_char)>;

    pub const LV_INDEV_TYPE_POINTER: u8 = 1;
    pub const LV_INDEV_STATE_RELEASED: c_int = 0;
    pub const LV_INDEV_STATE_PRESSED: c_int = 1;

    extern "C" {
        pub fn lv_log_register_print_cb(print_cb: lv_log_print_g_cb_t);

        pub fn lv_disp_draw_buf_init(
            draw_buf: *mut lv_disp_draw_buf_t,
            buf1: *mut c_void,
            buf2: *mut c_void,
            size_in_px_cnt: u32,
        );
        pub fn lv_disp_drv_init(driver: *mut lv_disp_drv_t);
        pub fn lv_disp_drv_register(driver: *mut lv_disp_drv_t) -> *mut lv_disp_t;
        pub fn lv_disp_flush_ready(disp_drv: *mut lv_disp_drv_t);

        pub fn lv_indev_drv_init(driver: *mut lv_indev_drv_t);
        pub fn lv_indev_drv_register(driver: *mut lv_indev_drv_t) -> *mut lv_indev_t;
    }
}

use ffi::*;

// sizeof() of the LVGL 8.3 structs on a 32-bit target with the lv_conf.h above
#[cfg(target_pointer_width = "32")]
const _: () = {
    assert!(core::mem::size_of::<lv_disp_draw_buf_t>() == 28);
    assert!(core::mem::size_of::<lv_disp_drv_t>() == 80);
    assert!(core::mem::size_of::<lv_indev_drv_t>() == 32);
    assert!(core::mem::size_of::<lv_indev_data_t>() == 24);
};

/// The driver structs double as handles since they carry the user data
pub(super) type Display = lv_disp_drv_t;
pub(super) type Pointer = lv_indev_drv_t;

static DRAW_BUF: StaticCell<lv_disp_draw_buf_t> = StaticCell::new();
static DISP_DRV: StaticCell<lv_disp_drv_t> = StaticCell::new();
static INDEV_DRV: StaticCell<lv_indev_drv_t> = StaticCell::new();

pub(super) unsafe fn register_log() {
    lv_log_register_print_cb(Some(log_trampoline));
}

/// Register the display over the draw buffers (`size` bytes each)
pub(super) unsafe fn create_display(
    width: i32,
    height: i32,
    buf1: *mut c_void,
    buf2: *mut c_void,
    size: u32,
) -> Result<*mut Display, LvglError> {
    let draw_buf = DRAW_BUF
        .try_uninit()
        .ok_or(LvglError::AlreadyInitialized)?
        .as_mut_ptr();
    let driver = DISP_DRV
        .try_uninit()
        .ok_or(LvglError::AlreadyInitialized)?
        .as_mut_ptr();

    lv_disp_draw_buf_init(draw_buf, buf1, buf2, size / pixport_hal::BYTES_PER_PIXEL as u32);
    lv_disp_drv_init(driver);
    (*driver).hor_res = width as lv_coord_t;
    (*driver).ver_res = height as lv_coord_t;
    (*driver).draw_buf = draw_buf;
    (*driver).flush_cb = Some(flush_trampoline);
    (*driver).user_data = ptr::null_mut();

    if lv_disp_drv_register(driver).is_null() {
        return Err(LvglError::DisplayCreate);
    }
    Ok(driver)
}

/// Register the pointer on the default display, which is the one
/// `create_display` registered
pub(super) unsafe fn create_pointer(_display: *mut Display) -> Result<*mut Pointer, LvglError> {
    let driver = INDEV_DRV
        .try_uninit()
        .ok_or(LvglError::AlreadyInitialized)?
        .as_mut_ptr();

    lv_indev_drv_init(driver);
    (*driver).type_ = LV_INDEV_TYPE_POINTER;
    (*driver).read_cb = Some(read_trampoline);
    (*driver).user_data = ptr::null_mut();

    if lv_indev_drv_register(driver).is_null() {
        return Err(LvglError::IndevCreate);
    }
    Ok(driver)
}

pub(super) unsafe fn set_display_slot(display: *mut Display, slot: *mut c_void) {
    (*display).user_data = slot;
}

pub(super) unsafe fn set_pointer_slot(pointer: *mut Pointer, slot: *mut c_void) {
    (*pointer).user_data = slot;
}

/// Completion signal for one flush
struct DisplayFlushReady(*mut lv_disp_drv_t);

impl FlushReady for DisplayFlushReady {
    fn flush_ready(&mut self) {
        // SAFETY: the driver pointer comes from LVGL's own flush call.
        unsafe { lv_disp_flush_ready(self.0) };
    }
}

unsafe extern "C" fn flush_trampoline(
    disp_drv: *mut lv_disp_drv_t,
    area: *const lv_area_t,
    color_p: *mut lv_color_t,
) {
    if disp_drv.is_null() {
        return;
    }
    let mut ready = DisplayFlushReady(disp_drv);
    if area.is_null() {
        ready.flush_ready();
        return;
    }

    let area = *area;
    let area = Area::new(
        area.x1.into(),
        area.y1.into(),
        area.x2.into(),
        area.y2.into(),
    );
    forward_flush((*disp_drv).user_data, area, color_p as *const u8, &mut ready);
}

unsafe extern "C" fn read_trampoline(indev_drv: *mut lv_indev_drv_t, data: *mut lv_indev_data_t) {
    if indev_drv.is_null() || data.is_null() {
        return;
    }

    let sample = forward_read((*indev_drv).user_data);

    // SAFETY: LVGL passes a valid, exclusive data struct.
    let data = &mut *data;
    data.point = lv_point_t {
        x: coord(sample.point.x),
        y: coord(sample.point.y),
    };
    data.state = match sample.state {
        PointerState::Pressed => LV_INDEV_STATE_PRESSED,
        PointerState::Released => LV_INDEV_STATE_RELEASED,
    };
    data.continue_reading = sample.continue_reading;
}

unsafe extern "C" fn log_trampoline(buf: *const c_char) {
    forward_log(buf);
}

fn coord(value: i32) -> lv_coord_t {
    value.clamp(lv_coord_t::MIN.into(), lv_coord_t::MAX.into()) as lv_coord_t
}
