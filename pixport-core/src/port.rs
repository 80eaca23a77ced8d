//! Port initialization and the UI loop
//!
//! [`UiRuntime`] is the seam to the external UI library. Instead of
//! registering global callbacks, the [`Port`] lends its flush and touch
//! adapters to the runtime for the duration of each timer-handler run;
//! the runtime routes the library's callbacks to them.
//!
//! # Lifecycle
//!
//! ```text
//! Port::init ── validate ── runtime.init ── attach_display ── attach_pointer
//!      │
//!      ▼
//! loop { ms = port.run_once(); sleep(ms) }        tick task: driver.on_period()
//!         │                                                   │
//!         └── tick_inc(take_pending) ◄──── TickCounter ◄──────┘
//!         └── run_timers(flush, touch)
//! ```

use pixport_hal::{DisplayPanel, TouchError, TouchPanel};

use crate::config::{ConfigError, DisplayGeometry, PortConfig};
use crate::flush::{DisplayDriver, FlushAdapter, FlushError, FlushStats};
use crate::log::LogHook;
use crate::tick::TickCounter;
use crate::touch::{PointerDriver, TouchAdapter};

/// Draw buffers handed to the UI library
pub struct DrawBuffers<'a> {
    pub primary: &'a mut [u8],
    pub secondary: Option<&'a mut [u8]>,
}

impl<'a> DrawBuffers<'a> {
    pub fn single(primary: &'a mut [u8]) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn double(primary: &'a mut [u8], secondary: &'a mut [u8]) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Shorten every buffer to exactly `len` bytes
    fn trimmed(self, len: usize) -> Self {
        let Self { primary, secondary } = self;
        Self {
            primary: &mut primary[..len],
            secondary: secondary.map(|buf| &mut buf[..len]),
        }
    }

    /// Bytes per buffer (the smaller one if they differ)
    pub fn len(&self) -> usize {
        match &self.secondary {
            Some(secondary) => self.primary.len().min(secondary.len()),
            None => self.primary.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_double(&self) -> bool {
        self.secondary.is_some()
    }
}

/// Draw buffer problems found at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// A buffer is shorter than one draw buffer (both in bytes)
    TooSmall { required: usize, actual: usize },
    /// Double buffering configured but only one buffer supplied
    MissingSecondary,
    /// Single buffering configured but two buffers supplied
    UnexpectedSecondary,
}

/// Errors from [`Port::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError<E> {
    Config(ConfigError),
    Buffers(BufferError),
    /// Panel reports a size different from the configured geometry
    GeometryMismatch { panel: (u16, u16), config: (u16, u16) },
    /// The UI library refused a setup step
    Runtime(E),
}

/// Callback fault surfaced by [`Port::take_fault`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortFault {
    Flush(FlushError),
    Touch(TouchError),
}

/// The external UI library, as seen by the port
pub trait UiRuntime {
    type Error;

    /// Initialize the library and install the log hook
    fn init(&mut self, log_hook: LogHook) -> Result<(), Self::Error>;

    /// Create the display with its draw buffers (partial rendering)
    fn attach_display(
        &mut self,
        geometry: DisplayGeometry,
        buffers: DrawBuffers<'static>,
    ) -> Result<(), Self::Error>;

    /// Create the pointer input device
    fn attach_pointer(&mut self) -> Result<(), Self::Error>;

    /// Advance the library's clock
    fn tick_inc(&mut self, elapsed_ms: u32);

    /// Run due timers, redrawing and polling input through the lent
    /// drivers. Returns milliseconds until the next run is due.
    fn run_timers(
        &mut self,
        display: &mut dyn DisplayDriver,
        pointer: &mut dyn PointerDriver,
    ) -> u32;
}

/// The UI port: runtime plus the adapters it calls back into
pub struct Port<R, P, T> {
    runtime: R,
    flush: FlushAdapter<P>,
    touch: TouchAdapter<T>,
    ticks: &'static TickCounter,
    config: PortConfig,
}

impl<R, P, T> Port<R, P, T>
where
    R: UiRuntime,
    P: DisplayPanel,
    T: TouchPanel,
{
    /// Bring up the UI library on the given panel and touch controller
    ///
    /// Everything that can be checked locally is checked before the
    /// runtime is touched.
    pub fn init(
        config: PortConfig,
        mut runtime: R,
        panel: P,
        touch: T,
        buffers: DrawBuffers<'static>,
        ticks: &'static TickCounter,
        log_hook: LogHook,
    ) -> Result<Self, PortError<R::Error>> {
        config.validate().map_err(PortError::Config)?;
        check_buffers(&config, &buffers).map_err(PortError::Buffers)?;

        let panel_size = panel.size();
        let config_size = (config.geometry.width, config.geometry.height);
        if panel_size != config_size {
            return Err(PortError::GeometryMismatch {
                panel: panel_size,
                config: config_size,
            });
        }

        ticks.reset();

        runtime.init(log_hook).map_err(PortError::Runtime)?;
        runtime
            .attach_display(config.geometry, buffers.trimmed(config.draw_buffer_bytes()))
            .map_err(PortError::Runtime)?;
        runtime.attach_pointer().map_err(PortError::Runtime)?;

        Ok(Self {
            runtime,
            flush: FlushAdapter::new(panel, config.pixel_order),
            touch: TouchAdapter::new(touch, config.geometry, config.touch),
            ticks,
            config,
        })
    }

    /// One iteration of the UI loop
    ///
    /// Hands pending ticks to the library, runs its timers, and returns
    /// how long to wait before the next call (1 ms to `loop_period_ms`).
    pub fn run_once(&mut self) -> u32 {
        let elapsed = self.ticks.take_pending();
        if elapsed > 0 {
            self.runtime.tick_inc(elapsed);
        }

        let next = self.runtime.run_timers(&mut self.flush, &mut self.touch);
        next.clamp(1, self.config.loop_period_ms)
    }

    /// Latest callback fault, flush faults first
    pub fn take_fault(&mut self) -> Option<PortFault> {
        if let Some(err) = self.flush.take_fault() {
            return Some(PortFault::Flush(err));
        }
        self.touch.take_fault().map(PortFault::Touch)
    }

    pub fn flush_stats(&self) -> FlushStats {
        self.flush.stats()
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

fn check_buffers(config: &PortConfig, buffers: &DrawBuffers<'_>) -> Result<(), BufferError> {
    match (config.double_buffer, buffers.is_double()) {
        (true, false) => return Err(BufferError::MissingSecondary),
        (false, true) => return Err(BufferError::UnexpectedSecondary),
        _ => {}
    }

    let required = config.draw_buffer_bytes();
    let actual = buffers.len();
    if actual < required {
        return Err(BufferError::TooSmall { required, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::RefCell;
    use std::boxed::Box;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    use pixport_hal::{Area, PanelError, PixelOrder, TouchPoint};

    use super::*;
    use crate::flush::FlushReady;
    use crate::touch::{PointerData, PointerState};

    struct MockPanel {
        size: (u16, u16),
        writes: Vec<Area>,
        fail: bool,
    }

    impl DisplayPanel for MockPanel {
        fn size(&self) -> (u16, u16) {
            self.size
        }

        fn write_area(
            &mut self,
            area: &Area,
            _pixels: &[u8],
            _order: PixelOrder,
        ) -> Result<(), PanelError> {
            if self.fail {
                return Err(PanelError::Bus);
            }
            self.writes.push(*area);
            Ok(())
        }
    }

    struct MockTouch {
        point: Option<TouchPoint>,
        error: Option<TouchError>,
    }

    impl TouchPanel for MockTouch {
        fn read_touch(&mut self) -> Result<Option<TouchPoint>, TouchError> {
            match self.error {
                Some(err) => Err(err),
                None => Ok(self.point),
            }
        }
    }

    fn untouched() -> MockTouch {
        MockTouch {
            point: None,
            error: None,
        }
    }

    struct Ready {
        signalled: u32,
    }

    impl FlushReady for Ready {
        fn flush_ready(&mut self) {
            self.signalled += 1;
        }
    }

    /// Runtime that flushes one row per run and polls the pointer once
    #[derive(Default)]
    struct MockRuntime {
        log_hook: Option<LogHook>,
        buffer_len: usize,
        double: bool,
        pointer_attached: bool,
        ticks: Vec<u32>,
        ready: u32,
        pointer: Vec<PointerData>,
        next: u32,
        fail_attach: bool,
        /// Runtime entry points called, in order
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl UiRuntime for MockRuntime {
        type Error = &'static str;

        fn init(&mut self, log_hook: LogHook) -> Result<(), Self::Error> {
            self.calls.borrow_mut().push("init");
            self.log_hook = Some(log_hook);
            Ok(())
        }

        fn attach_display(
            &mut self,
            _geometry: DisplayGeometry,
            buffers: DrawBuffers<'static>,
        ) -> Result<(), Self::Error> {
            self.calls.borrow_mut().push("attach_display");
            if self.fail_attach {
                return Err("no memory");
            }
            self.buffer_len = buffers.len();
            self.double = buffers.is_double();
            Ok(())
        }

        fn attach_pointer(&mut self) -> Result<(), Self::Error> {
            self.calls.borrow_mut().push("attach_pointer");
            self.pointer_attached = true;
            Ok(())
        }

        fn tick_inc(&mut self, elapsed_ms: u32) {
            self.ticks.push(elapsed_ms);
        }

        fn run_timers(
            &mut self,
            display: &mut dyn DisplayDriver,
            pointer: &mut dyn PointerDriver,
        ) -> u32 {
            let row = Area::new(0, 0, 239, 0);
            let pixels = vec![0u8; row.pixel_count() * 2];
            let mut ready = Ready { signalled: 0 };
            display.flush(&row, &pixels, &mut ready);
            self.ready += ready.signalled;

            let mut data = PointerData::default();
            pointer.read(&mut data);
            self.pointer.push(data);

            self.next
        }
    }

    fn leak_buffer(len: usize) -> &'static mut [u8] {
        Box::leak(vec![0u8; len].into_boxed_slice())
    }

    fn leak_ticks() -> &'static TickCounter {
        Box::leak(Box::new(TickCounter::new()))
    }

    fn panel() -> MockPanel {
        MockPanel {
            size: (240, 280),
            writes: Vec::new(),
            fail: false,
        }
    }

    /// Runtime plus a handle on the calls it receives
    fn recorded_runtime() -> (MockRuntime, Rc<RefCell<Vec<&'static str>>>) {
        let runtime = MockRuntime::default();
        let calls = runtime.calls.clone();
        (runtime, calls)
    }

    fn noop_log(_line: &str) {}

    #[test]
    fn test_init_attaches_trimmed_buffers() {
        let config = PortConfig::default();
        let buffers = DrawBuffers::double(leak_buffer(8000), leak_buffer(7000));

        let mut port = Port::init(
            config,
            MockRuntime::default(),
            panel(),
            untouched(),
            buffers,
            leak_ticks(),
            noop_log,
        )
        .unwrap();

        let runtime = port.runtime_mut();
        assert!(runtime.log_hook.is_some());
        assert!(runtime.pointer_attached);
        assert!(runtime.double);
        assert_eq!(runtime.buffer_len, config.draw_buffer_bytes());
    }

    #[test]
    fn test_init_rejects_small_buffer() {
        let buffers = DrawBuffers::double(leak_buffer(100), leak_buffer(6720));
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            PortConfig::default(),
            runtime,
            panel(),
            untouched(),
            buffers,
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(
            result,
            Err(PortError::Buffers(BufferError::TooSmall {
                required: 6720,
                actual: 100
            }))
        ));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_init_checks_buffer_count() {
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            PortConfig::default(),
            runtime,
            panel(),
            untouched(),
            DrawBuffers::single(leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(
            result,
            Err(PortError::Buffers(BufferError::MissingSecondary))
        ));
        assert!(calls.borrow().is_empty());

        let config = PortConfig {
            double_buffer: false,
            ..PortConfig::default()
        };
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            config,
            runtime,
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(
            result,
            Err(PortError::Buffers(BufferError::UnexpectedSecondary))
        ));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_init_rejects_geometry_mismatch() {
        let wrong_panel = MockPanel {
            size: (280, 240),
            writes: Vec::new(),
            fail: false,
        };
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            PortConfig::default(),
            runtime,
            wrong_panel,
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(
            result,
            Err(PortError::GeometryMismatch {
                panel: (280, 240),
                config: (240, 280)
            })
        ));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = PortConfig {
            buffer_divisor: 0,
            ..PortConfig::default()
        };
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            config,
            runtime,
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(
            result,
            Err(PortError::Config(ConfigError::InvalidDivisor))
        ));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_init_calls_runtime_in_order() {
        let (runtime, calls) = recorded_runtime();
        let result = Port::init(
            PortConfig::default(),
            runtime,
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(result.is_ok());
        assert_eq!(*calls.borrow(), ["init", "attach_display", "attach_pointer"]);
    }

    #[test]
    fn test_init_propagates_runtime_error() {
        let runtime = MockRuntime {
            fail_attach: true,
            ..MockRuntime::default()
        };
        let result = Port::init(
            PortConfig::default(),
            runtime,
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        );
        assert!(matches!(result, Err(PortError::Runtime("no memory"))));
    }

    #[test]
    fn test_run_once_feeds_ticks_and_lends_drivers() {
        let ticks = leak_ticks();
        let mut port = Port::init(
            PortConfig::default(),
            MockRuntime {
                next: 30,
                ..MockRuntime::default()
            },
            panel(),
            MockTouch {
                point: Some(TouchPoint::new(12, 34)),
                error: None,
            },
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            ticks,
            noop_log,
        )
        .unwrap();

        ticks.advance(5);
        ticks.advance(5);
        let wait = port.run_once();
        // Clamped to the loop period
        assert_eq!(wait, 5);

        // No ticks pending: tick_inc is skipped
        port.run_once();

        let runtime = port.runtime_mut();
        assert_eq!(runtime.ticks, vec![10]);
        assert_eq!(runtime.ready, 2);
        assert_eq!(runtime.pointer.len(), 2);
        assert_eq!(runtime.pointer[0].state, PointerState::Pressed);
        assert_eq!(runtime.pointer[0].point.x, 12);
        assert_eq!(runtime.pointer[0].point.y, 34);

        assert_eq!(port.flush_stats().frames, 2);
        assert_eq!(port.take_fault(), None);
    }

    #[test]
    fn test_run_once_waits_at_least_one_ms() {
        let mut port = Port::init(
            PortConfig::default(),
            MockRuntime::default(),
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        )
        .unwrap();

        assert_eq!(port.run_once(), 1);
    }

    #[test]
    fn test_init_discards_stale_ticks() {
        let ticks = leak_ticks();
        ticks.advance(500);
        let mut port = Port::init(
            PortConfig::default(),
            MockRuntime::default(),
            panel(),
            untouched(),
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            ticks,
            noop_log,
        )
        .unwrap();

        port.run_once();
        assert!(port.runtime_mut().ticks.is_empty());
    }

    #[test]
    fn test_faults_reported_flush_first() {
        let mut failing_panel = panel();
        failing_panel.fail = true;
        let mut port = Port::init(
            PortConfig::default(),
            MockRuntime::default(),
            failing_panel,
            MockTouch {
                point: None,
                error: Some(TouchError::Bus),
            },
            DrawBuffers::double(leak_buffer(6720), leak_buffer(6720)),
            leak_ticks(),
            noop_log,
        )
        .unwrap();

        port.run_once();

        // Completion still signalled for the failed flush
        assert_eq!(port.runtime_mut().ready, 1);
        assert_eq!(port.runtime_mut().pointer[0].state, PointerState::Released);
        assert_eq!(port.flush_stats().panel_errors, 1);

        assert_eq!(
            port.take_fault(),
            Some(PortFault::Flush(FlushError::Panel(PanelError::Bus)))
        );
        assert_eq!(port.take_fault(), Some(PortFault::Touch(TouchError::Bus)));
        assert_eq!(port.take_fault(), None);
    }
}
