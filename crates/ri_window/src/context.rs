//! Windowing context
//!
//! `Context` is the explicit replacement for a hidden process-wide initializer:
//! it owns the native backend (GLFW's global state for the real backend) and the
//! registry that routes native events to windows. Every window-creating call
//! takes it by `&mut`, and dropping it tears the backend down.
//!
//! GLFW may be initialized only once per process at a time. While a GLFW-backed
//! context or any window it created is alive, a second [`Context::init`] fails
//! with [`WindowError::AlreadyInitialized`].

use crate::platform::glfw::GlfwPlatform;
use crate::window::registry::WindowRegistry;
use crate::window::{NativeWindow, Platform, Window, WindowBuilder, WindowError, WindowResult};
use std::time::Duration;

/// Refresh rate assumed when the primary monitor does not report one
pub const DEFAULT_REFRESH_RATE: u32 = 60;

/// Shortest interval [`Context::refresh_interval`] reports
///
/// Very high refresh rates would otherwise shrink the interval toward zero and
/// spin the polling thread.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Owner of the native backend and the window registry
///
/// A `Context` is the entry point for everything native: windows are created
/// through it, and its [`poll_events`](Self::poll_events) call is the only place
/// native events are turned into signal emissions. Windows register themselves
/// when created and drop out of the registry on their own when dropped, so the
/// context never has to be told about window destruction.
///
/// # Design Philosophy
/// - **Explicit lifetime**: GLFW is initialized by [`init`](Self::init) and
///   released when the last user of it drops, never behind the caller's back
/// - **Backend seam**: all native work goes through a boxed [`Platform`], so
///   tests run the same code against the headless backend
///
/// # Thread Safety
/// `Context` is neither `Send` nor `Sync`. GLFW requires window creation and
/// event polling on the thread that initialized it. To use windows from other
/// threads, hand the context to a [`WindowThread`](crate::event_loop::WindowThread).
///
/// # Lifetime
/// Windows created by a GLFW context keep GLFW initialized even after the
/// context drops. A new [`Context::init`] only succeeds once those windows are
/// gone too.
pub struct Context {
    registry: WindowRegistry,
    platform: Box<dyn Platform>,
}

impl Context {
    /// Initialize GLFW and wrap it in a context
    ///
    /// Installs the GLFW error callback, which logs every native error and keeps
    /// the latest description for window creation failures.
    ///
    /// # Errors
    /// `AlreadyInitialized` if another GLFW context is alive,
    /// `InitializationFailed` if GLFW's global init fails.
    pub fn init() -> WindowResult<Self> {
        Ok(Self::with_platform(GlfwPlatform::init()?))
    }

    /// Wrap an already-initialized backend
    pub fn with_platform<P: Platform + 'static>(platform: P) -> Self {
        log::info!("Windowing context ready ({} backend)", platform.name());
        Self {
            registry: WindowRegistry::new(),
            platform: Box::new(platform),
        }
    }

    /// Backend name
    pub fn platform_name(&self) -> &'static str {
        self.platform.name()
    }

    pub(crate) fn platform_mut(&mut self) -> &mut dyn Platform {
        self.platform.as_mut()
    }

    /// Wrap a native window and start routing its events
    pub(crate) fn adopt(&mut self, native: Box<dyn NativeWindow>, title: String) -> Window {
        let window = Window::from_native(native, title);
        self.registry.register(window.id(), window.shared());
        window
    }

    /// Create a window from a builder
    ///
    /// # Errors
    /// See [`WindowBuilder::build`].
    pub fn create_window(&mut self, builder: WindowBuilder) -> WindowResult<Window> {
        builder.build(self)
    }

    /// Pump native events and dispatch them; returns the number delivered
    ///
    /// Never blocks. Slots run on the calling thread before this returns, in
    /// the order the backend reported the events.
    pub fn poll_events(&mut self) -> usize {
        self.platform.poll_events();
        self.registry.dispatch_pending()
    }

    /// Wait up to `timeout` for native events, then dispatch them
    pub fn wait_events_timeout(&mut self, timeout: Duration) -> usize {
        self.platform.wait_events_timeout(timeout);
        self.registry.dispatch_pending()
    }

    /// Interval between polls that matches the primary monitor's refresh rate
    ///
    /// Falls back to [`DEFAULT_REFRESH_RATE`] when the monitor reports no rate,
    /// and never goes below [`MIN_POLL_INTERVAL`].
    pub fn refresh_interval(&mut self) -> Duration {
        let rate = self
            .platform
            .refresh_rate()
            .filter(|rate| *rate > 0)
            .unwrap_or(DEFAULT_REFRESH_RATE);
        (Duration::from_secs(1) / rate).max(MIN_POLL_INTERVAL)
    }

    /// Whether Vulkan surfaces can be created
    pub fn vulkan_supported(&self) -> bool {
        self.platform.vulkan_supported()
    }

    /// Instance extensions needed to present to this context's windows
    ///
    /// # Errors
    /// `VulkanUnsupported` when the backend has no Vulkan loader.
    pub fn required_vulkan_extensions(&self) -> WindowResult<Vec<String>> {
        self.platform
            .required_instance_extensions()
            .ok_or(WindowError::VulkanUnsupported)
    }

    /// Swap interval for the current OpenGL context
    ///
    /// Applies to whichever window was last made current with
    /// [`Window::make_context_current`]; 0 disables vsync.
    pub fn set_swap_interval(&mut self, interval: u32) {
        self.platform.set_swap_interval(interval);
    }

    /// Number of windows still alive
    pub fn window_count(&mut self) -> usize {
        self.registry.len()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        let remaining = self.registry.len();
        if remaining > 0 {
            log::warn!("Context dropped while {} window(s) are still alive", remaining);
        }
        log::info!("Windowing context shut down ({} backend)", self.platform.name());
    }
}
