//! In-memory backend
//!
//! `HeadlessPlatform` creates windows that exist only as records in shared
//! state. A [`HeadlessDriver`] handle on the same state plays the role of the
//! user and the window manager: it injects native events, inspects what the
//! wrapper did to each window and makes the next creation fail. The driver is
//! `Send`, so it can drive a platform owned by a window thread.
//!
//! Injected events stay pending until the next poll, like native events that
//! GLFW only reports from `glfwPollEvents`.

use crate::events::WindowEvent;
use crate::foundation::math::{Extent2D, Point2D};
use crate::platform::NativeHandle;
use crate::window::{
    DisplayMode, Hint, NativeId, NativeWindow, Platform, WindowBuilder, WindowError, WindowResult,
};
use ash::vk;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Video mode of the simulated primary monitor
const MONITOR_EXTENT: Extent2D = Extent2D::new(1920, 1080);

#[derive(Debug)]
struct WindowRecord {
    title: String,
    size: Extent2D,
    position: Point2D,
    should_close: bool,
    display_mode: Option<DisplayMode>,
    hints: Vec<Hint>,
    pending: Vec<WindowEvent>,
    delivered: Vec<WindowEvent>,
    swaps: usize,
}

impl WindowRecord {
    fn queue_resize(&mut self, size: Extent2D, scale: u32) {
        self.size = size;
        self.pending.push(WindowEvent::Resize(size));
        self.pending.push(WindowEvent::FramebufferResize(scaled(size, scale)));
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: usize,
    windows: HashMap<NativeId, WindowRecord>,
    failure: Option<String>,
    surface_requests: usize,
    swap_interval: Option<u32>,
    current: Option<NativeId>,
    polls: usize,
}

impl HeadlessState {
    fn flush(&mut self) {
        self.polls += 1;
        for record in self.windows.values_mut() {
            let pending = std::mem::take(&mut record.pending);
            record.delivered.extend(pending);
        }
    }
}

type SharedState = Arc<Mutex<HeadlessState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, HeadlessState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

const fn scaled(size: Extent2D, scale: u32) -> Extent2D {
    Extent2D::new(size.width.saturating_mul(scale), size.height.saturating_mul(scale))
}

/// Backend without a display
pub struct HeadlessPlatform {
    state: SharedState,
    refresh_rate: Option<u32>,
    framebuffer_scale: u32,
}

impl HeadlessPlatform {
    /// 60 Hz monitor, framebuffer scale 1
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            refresh_rate: Some(60),
            framebuffer_scale: 1,
        }
    }

    /// Simulated refresh rate; 0 behaves like a monitor that reports none
    #[must_use]
    pub const fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = Some(hz);
        self
    }

    /// Pixels per screen coordinate, as on high-DPI monitors
    #[must_use]
    pub fn with_framebuffer_scale(mut self, scale: u32) -> Self {
        self.framebuffer_scale = scale.max(1);
        self
    }

    /// A handle for injecting events and inspecting windows
    pub fn driver(&self) -> HeadlessDriver {
        HeadlessDriver {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_window(&mut self, builder: &WindowBuilder) -> WindowResult<Box<dyn NativeWindow>> {
        let mut state = lock(&self.state);
        if let Some(reason) = state.failure.take() {
            return Err(WindowError::CreationFailed(reason));
        }

        state.next_id += 1;
        let id = NativeId::from_raw(state.next_id);
        state.windows.insert(
            id,
            WindowRecord {
                title: builder.get_title().to_string(),
                size: builder.get_size(),
                position: Point2D::default(),
                should_close: false,
                display_mode: None,
                hints: builder.hints(),
                pending: Vec::new(),
                delivered: Vec::new(),
                swaps: 0,
            },
        );
        log::debug!("Headless window {:?} created", id);

        Ok(Box::new(HeadlessWindow {
            id,
            state: Arc::clone(&self.state),
            scale: self.framebuffer_scale,
        }))
    }

    fn poll_events(&mut self) {
        lock(&self.state).flush();
    }

    fn wait_events_timeout(&mut self, _timeout: Duration) {
        lock(&self.state).flush();
    }

    fn refresh_rate(&mut self) -> Option<u32> {
        self.refresh_rate
    }

    fn vulkan_supported(&self) -> bool {
        false
    }

    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        None
    }

    fn set_swap_interval(&mut self, interval: u32) {
        lock(&self.state).swap_interval = Some(interval);
    }
}

/// A simulated window; dropping it removes its record
pub struct HeadlessWindow {
    id: NativeId,
    state: SharedState,
    scale: u32,
}

impl HeadlessWindow {
    fn with_record<R>(&self, f: impl FnOnce(&mut WindowRecord) -> R) -> Option<R> {
        lock(&self.state).windows.get_mut(&self.id).map(f)
    }
}

impl NativeWindow for HeadlessWindow {
    fn id(&self) -> NativeId {
        self.id
    }

    fn set_title(&mut self, title: &str) {
        self.with_record(|record| title.clone_into(&mut record.title));
    }

    fn size(&self) -> Extent2D {
        self.with_record(|record| record.size).unwrap_or_default()
    }

    fn set_size(&mut self, size: Extent2D) {
        let scale = self.scale;
        self.with_record(|record| record.queue_resize(size, scale));
    }

    fn position(&self) -> Point2D {
        self.with_record(|record| record.position).unwrap_or_default()
    }

    fn set_position(&mut self, position: Point2D) {
        self.with_record(|record| {
            record.position = position;
            record.pending.push(WindowEvent::Move(position));
        });
    }

    fn framebuffer_size(&self) -> Extent2D {
        scaled(self.size(), self.scale)
    }

    fn should_close(&self) -> bool {
        self.with_record(|record| record.should_close).unwrap_or(false)
    }

    fn set_should_close(&mut self, value: bool) {
        self.with_record(|record| record.should_close = value);
    }

    fn set_display_mode(&mut self, mode: DisplayMode) {
        let scale = self.scale;
        self.with_record(|record| {
            record.display_mode = Some(mode);
            match mode {
                DisplayMode::FullScreen => {
                    record.position = Point2D::default();
                    record.queue_resize(MONITOR_EXTENT, scale);
                }
                DisplayMode::Windowed => {
                    let third = Extent2D::new(MONITOR_EXTENT.width / 3, MONITOR_EXTENT.height / 3);
                    record.position = third.to_signed().into();
                    record.queue_resize(third, scale);
                }
                DisplayMode::Borderless | DisplayMode::Framed => {}
            }
        });
    }

    fn drain_events(&mut self) -> Vec<WindowEvent> {
        self.with_record(|record| std::mem::take(&mut record.delivered))
            .unwrap_or_default()
    }

    fn native_handle(&self) -> Option<NativeHandle> {
        None
    }

    fn create_vulkan_surface(&mut self, _instance: vk::Instance) -> Result<vk::SurfaceKHR, vk::Result> {
        lock(&self.state).surface_requests += 1;
        Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT)
    }

    fn make_current(&mut self) {
        lock(&self.state).current = Some(self.id);
    }

    fn swap_buffers(&mut self) {
        self.with_record(|record| record.swaps += 1);
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.windows.remove(&self.id);
        if state.current == Some(self.id) {
            state.current = None;
        }
        drop(state);
        log::debug!("Headless window {:?} destroyed", self.id);
    }
}

/// Test-side handle on a [`HeadlessPlatform`]
#[derive(Clone)]
pub struct HeadlessDriver {
    state: SharedState,
}

impl HeadlessDriver {
    /// Whether the native window still exists
    pub fn is_alive(&self, id: NativeId) -> bool {
        lock(&self.state).windows.contains_key(&id)
    }

    /// Number of native windows that exist
    pub fn live_windows(&self) -> usize {
        lock(&self.state).windows.len()
    }

    /// Native title bar text
    pub fn title(&self, id: NativeId) -> Option<String> {
        lock(&self.state).windows.get(&id).map(|record| record.title.clone())
    }

    /// Last display mode applied to the window
    pub fn display_mode(&self, id: NativeId) -> Option<DisplayMode> {
        lock(&self.state).windows.get(&id).and_then(|record| record.display_mode)
    }

    /// Hints the window was created with
    pub fn hints(&self, id: NativeId) -> Option<Vec<Hint>> {
        lock(&self.state).windows.get(&id).map(|record| record.hints.clone())
    }

    /// Queue an event for the next poll; false if the window is gone
    pub fn push_event(&self, id: NativeId, event: WindowEvent) -> bool {
        lock(&self.state)
            .windows
            .get_mut(&id)
            .map(|record| record.pending.push(event))
            .is_some()
    }

    /// Simulate the user clicking the close button
    pub fn request_close(&self, id: NativeId) -> bool {
        lock(&self.state)
            .windows
            .get_mut(&id)
            .map(|record| {
                record.should_close = true;
                record.pending.push(WindowEvent::Close);
            })
            .is_some()
    }

    /// Make the next window creation fail with `reason`
    pub fn fail_next_creation(&self, reason: &str) {
        lock(&self.state).failure = Some(reason.to_string());
    }

    /// Number of Vulkan surface creations attempted
    pub fn surface_requests(&self) -> usize {
        lock(&self.state).surface_requests
    }

    /// Buffer swaps presented by the window
    pub fn swaps(&self, id: NativeId) -> usize {
        lock(&self.state).windows.get(&id).map_or(0, |record| record.swaps)
    }

    /// Last swap interval set
    pub fn swap_interval(&self) -> Option<u32> {
        lock(&self.state).swap_interval
    }

    /// Window whose OpenGL context is current
    pub fn current_context(&self) -> Option<NativeId> {
        lock(&self.state).current
    }

    /// Number of event pumps so far
    pub fn polls(&self) -> usize {
        lock(&self.state).polls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_become_visible_after_poll() {
        let mut platform = HeadlessPlatform::new();
        let driver = platform.driver();
        let mut window = platform.create_window(&WindowBuilder::new()).unwrap();

        assert!(driver.push_event(window.id(), WindowEvent::Focus(true)));
        assert!(window.drain_events().is_empty());

        platform.poll_events();
        assert_eq!(window.drain_events(), vec![WindowEvent::Focus(true)]);
        assert!(window.drain_events().is_empty());
    }

    #[test]
    fn test_framebuffer_scale() {
        let mut platform = HeadlessPlatform::new().with_framebuffer_scale(2);
        let mut window = platform
            .create_window(&WindowBuilder::new().size(Extent2D::new(400, 300)))
            .unwrap();

        assert_eq!(window.framebuffer_size(), Extent2D::new(800, 600));
        window.set_size(Extent2D::new(100, 50));
        platform.poll_events();
        assert_eq!(
            window.drain_events(),
            vec![
                WindowEvent::Resize(Extent2D::new(100, 50)),
                WindowEvent::FramebufferResize(Extent2D::new(200, 100)),
            ]
        );
    }

    #[test]
    fn test_full_screen_covers_monitor() {
        let mut platform = HeadlessPlatform::new();
        let mut window = platform.create_window(&WindowBuilder::new()).unwrap();

        window.set_display_mode(DisplayMode::FullScreen);
        assert_eq!(window.size(), MONITOR_EXTENT);
        window.set_display_mode(DisplayMode::Windowed);
        assert_eq!(window.size(), Extent2D::new(640, 360));
        assert_eq!(window.position(), Point2D::new(640, 360));
    }

    #[test]
    fn test_drop_removes_record() {
        let mut platform = HeadlessPlatform::new();
        let driver = platform.driver();
        let window = platform.create_window(&WindowBuilder::new()).unwrap();
        let id = window.id();

        assert_eq!(driver.live_windows(), 1);
        drop(window);
        assert!(!driver.is_alive(id));
        assert!(!driver.request_close(id));
    }

    #[test]
    fn test_destroying_current_window_clears_context() {
        let mut platform = HeadlessPlatform::new();
        let driver = platform.driver();
        let mut window = platform.create_window(&WindowBuilder::new()).unwrap();

        window.make_current();
        assert_eq!(driver.current_context(), Some(window.id()));
        drop(window);
        assert_eq!(driver.current_context(), None);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut platform = HeadlessPlatform::new();
        let first = platform.create_window(&WindowBuilder::new()).unwrap().id();
        let second = platform.create_window(&WindowBuilder::new()).unwrap().id();
        assert_ne!(first, second);
    }
}
