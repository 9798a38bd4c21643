//! GLFW backend
//!
//! Cross-platform window creation and event handling through GLFW, including
//! Vulkan surface creation and OpenGL context control. Every window enables
//! polling for the callback categories the wrapper publishes; events are then
//! drained from each window's receiver after `glfwPollEvents`.

use crate::events::WindowEvent;
use crate::foundation::math::{Extent2D, Point2D};
use crate::platform::NativeHandle;
use crate::window::{
    ClientApi, DisplayMode, Hint, NativeId, NativeWindow, Platform, WindowBuilder, WindowError,
    WindowResult,
};
use ash::vk;
use glfw::Context as _;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Set while GLFW is initialized through this crate
static GLFW_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Claim on [`GLFW_ACTIVE`], shared by the platform and every window it made
///
/// GLFW stays initialized until the last `glfw::Glfw` clone drops, and windows
/// hold clones. The flag is released only when the last holder is gone.
struct ActiveGuard;

impl ActiveGuard {
    fn acquire() -> WindowResult<Arc<Self>> {
        GLFW_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Arc::new(Self))
            .map_err(|_| WindowError::AlreadyInitialized)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        GLFW_ACTIVE.store(false, Ordering::Release);
        log::info!("GLFW released");
    }
}

/// Description of the most recent GLFW error
static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

fn record_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {:?}: {}", error, description);
    if let Ok(mut last) = LAST_ERROR.lock() {
        *last = Some(description);
    }
}

fn take_last_error() -> Option<String> {
    LAST_ERROR.lock().ok().and_then(|mut last| last.take())
}

/// Run a native creation call, reporting a `None` result with the error GLFW
/// raised during that call
fn create_native<T>(create: impl FnOnce() -> Option<T>) -> WindowResult<T> {
    take_last_error();
    create().ok_or_else(|| {
        WindowError::CreationFailed(
            take_last_error().unwrap_or_else(|| "GLFW returned no window".to_string()),
        )
    })
}

fn to_glfw_hint(hint: Hint) -> glfw::WindowHint {
    use glfw::WindowHint as G;
    match hint {
        Hint::Resizable(value) => G::Resizable(value),
        Hint::Visible(value) => G::Visible(value),
        Hint::Decorated(value) => G::Decorated(value),
        Hint::Focused(value) => G::Focused(value),
        Hint::Floating(value) => G::Floating(value),
        Hint::Maximized(value) => G::Maximized(value),
        Hint::CenterCursor(value) => G::CenterCursor(value),
        Hint::FocusOnShow(value) => G::FocusOnShow(value),
        Hint::ScaleToMonitor(value) => G::ScaleToMonitor(value),
        Hint::ClientApi(ClientApi::NoApi) => G::ClientApi(glfw::ClientApiHint::NoApi),
        Hint::ClientApi(ClientApi::OpenGl) => G::ClientApi(glfw::ClientApiHint::OpenGl),
        Hint::ContextVersion(version) => G::ContextVersion(version.major, version.minor),
    }
}

fn from_glfw_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
    match event {
        glfw::WindowEvent::Close => Some(WindowEvent::Close),
        glfw::WindowEvent::Size(w, h) => Some(WindowEvent::Resize(Extent2D::from_signed(w, h))),
        glfw::WindowEvent::FramebufferSize(w, h) => {
            Some(WindowEvent::FramebufferResize(Extent2D::from_signed(w, h)))
        }
        glfw::WindowEvent::Pos(x, y) => Some(WindowEvent::Move(Point2D::new(x, y))),
        glfw::WindowEvent::Maximize(value) => Some(WindowEvent::Maximize(value)),
        glfw::WindowEvent::Focus(value) => Some(WindowEvent::Focus(value)),
        glfw::WindowEvent::Iconify(value) => Some(WindowEvent::Iconify(value)),
        _ => None,
    }
}

/// GLFW global state
///
/// At most one may be alive per process; see [`GlfwPlatform::init`].
pub struct GlfwPlatform {
    glfw: glfw::Glfw,
    guard: Arc<ActiveGuard>,
}

impl GlfwPlatform {
    /// Run GLFW's global init
    ///
    /// # Errors
    /// `AlreadyInitialized` while another `GlfwPlatform` is alive,
    /// `InitializationFailed` when `glfwInit` fails.
    pub fn init() -> WindowResult<Self> {
        let guard = ActiveGuard::acquire()?;

        match glfw::init(record_error) {
            Ok(glfw) => {
                log::info!("GLFW initialized ({})", glfw::get_version_string());
                Ok(Self { glfw, guard })
            }
            Err(error) => {
                let detail = take_last_error().unwrap_or_else(|| format!("{error:?}"));
                Err(WindowError::InitializationFailed(detail))
            }
        }
    }
}

impl Platform for GlfwPlatform {
    fn name(&self) -> &'static str {
        "glfw"
    }

    fn create_window(&mut self, builder: &WindowBuilder) -> WindowResult<Box<dyn NativeWindow>> {
        self.glfw.default_window_hints();
        for hint in builder.hints() {
            self.glfw.window_hint(to_glfw_hint(hint));
        }

        let size = builder.get_size();
        let (mut window, events) = create_native(|| {
            self.glfw.create_window(
                size.width,
                size.height,
                builder.get_title(),
                glfw::WindowMode::Windowed,
            )
        })?;

        window.set_close_polling(true);
        window.set_size_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_pos_polling(true);
        window.set_maximize_polling(true);
        window.set_focus_polling(true);
        window.set_iconify_polling(true);

        Ok(Box::new(GlfwWindow {
            glfw: self.glfw.clone(),
            window,
            events,
            _guard: Arc::clone(&self.guard),
        }))
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    fn wait_events_timeout(&mut self, timeout: Duration) {
        self.glfw.wait_events_timeout(timeout.as_secs_f64());
    }

    fn refresh_rate(&mut self) -> Option<u32> {
        self.glfw.with_primary_monitor(|_, monitor| {
            monitor
                .and_then(|monitor| monitor.get_video_mode())
                .map(|mode| mode.refresh_rate)
        })
    }

    fn vulkan_supported(&self) -> bool {
        self.glfw.vulkan_supported()
    }

    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.glfw.get_required_instance_extensions()
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.glfw.set_swap_interval(glfw::SwapInterval::Sync(interval));
    }
}

/// One GLFW window with its event receiver
///
/// Dropping it destroys the native window. It keeps GLFW claimed for as long as
/// it lives, even past the `GlfwPlatform` that created it.
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    // Declared last so the claim outlives the native window and the Glfw clone
    _guard: Arc<ActiveGuard>,
}

impl GlfwWindow {
    fn raw_ptr(&self) -> *mut c_void {
        self.window.window_ptr().cast()
    }
}

impl NativeWindow for GlfwWindow {
    fn id(&self) -> NativeId {
        NativeId::from_ptr(self.raw_ptr())
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn size(&self) -> Extent2D {
        let (width, height) = self.window.get_size();
        Extent2D::from_signed(width, height)
    }

    fn set_size(&mut self, size: Extent2D) {
        let (width, height) = size.to_signed();
        self.window.set_size(width, height);
    }

    fn position(&self) -> Point2D {
        self.window.get_pos().into()
    }

    fn set_position(&mut self, position: Point2D) {
        self.window.set_pos(position.x, position.y);
    }

    fn framebuffer_size(&self) -> Extent2D {
        let (width, height) = self.window.get_framebuffer_size();
        Extent2D::from_signed(width, height)
    }

    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, value: bool) {
        self.window.set_should_close(value);
    }

    fn set_display_mode(&mut self, mode: DisplayMode) {
        match mode {
            DisplayMode::Borderless => self.window.set_decorated(false),
            DisplayMode::Framed => self.window.set_decorated(true),
            DisplayMode::FullScreen | DisplayMode::Windowed => {
                let window = &mut self.window;
                self.glfw.with_primary_monitor(|_, monitor| {
                    let Some(monitor) = monitor else {
                        log::warn!("No primary monitor; ignoring {:?}", mode);
                        return;
                    };
                    let Some(video) = monitor.get_video_mode() else {
                        log::warn!("Primary monitor has no video mode; ignoring {:?}", mode);
                        return;
                    };
                    if mode == DisplayMode::FullScreen {
                        window.set_monitor(
                            glfw::WindowMode::FullScreen(&*monitor),
                            0,
                            0,
                            video.width,
                            video.height,
                            Some(video.refresh_rate),
                        );
                    } else {
                        let (x, y) = Extent2D::new(video.width / 3, video.height / 3).to_signed();
                        window.set_monitor(
                            glfw::WindowMode::Windowed,
                            x,
                            y,
                            video.width / 3,
                            video.height / 3,
                            Some(video.refresh_rate),
                        );
                    }
                });
            }
        }
    }

    fn drain_events(&mut self) -> Vec<WindowEvent> {
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| from_glfw_event(event))
            .collect()
    }

    #[cfg(target_os = "linux")]
    fn native_handle(&self) -> Option<NativeHandle> {
        let xwindow = self.window.get_x11_window() as usize as std::ffi::c_ulong;
        crate::platform::x11::from_glfw(self.glfw.get_x11_display(), xwindow)
    }

    #[cfg(target_os = "windows")]
    fn native_handle(&self) -> Option<NativeHandle> {
        crate::platform::win32::from_hwnd(self.window.get_win32_window())
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    fn native_handle(&self) -> Option<NativeHandle> {
        None
    }

    fn create_vulkan_surface(&mut self, instance: vk::Instance) -> Result<vk::SurfaceKHR, vk::Result> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(result)
        }
    }

    fn make_current(&mut self) {
        self.window.make_current();
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }
}
