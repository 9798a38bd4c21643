//! Window management subsystem
//!
//! A [`Window`] exclusively owns one native window and re-publishes its native
//! callbacks as signals. Windows are created through a [`WindowBuilder`] inside a
//! [`Context`](crate::context::Context), which keeps a registry from native
//! identity to each window's shared state and routes events on every poll.
//!
//! # Module Organization
//!
//! - **`builder`**: fluent creation options and hint translation
//! - **`backend`**: the native backend contract (`Platform`, `NativeWindow`)
//! - **`error`**: `WindowError` and `WindowResult`
//! - **`registry`**: native identity → window lookup for event dispatch

pub mod backend;
pub mod builder;
pub mod error;
pub(crate) mod registry;

pub use backend::{NativeId, NativeWindow, Platform};
pub use builder::{ClientApi, Hint, WindowBuilder, WindowFlags};
pub use error::{WindowError, WindowResult};

use crate::context::Context;
use crate::events::{Signal, Subscription, SubscriptionId, WindowEvent, WindowSignals};
use crate::foundation::math::{Extent2D, Point2D};
use crate::platform::NativeHandle;
use ash::vk;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// Presentation mode switchable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Exclusive full screen on the primary monitor at its current video mode
    FullScreen,
    /// Leave full screen; the window takes a third of the primary monitor
    Windowed,
    /// Remove decorations
    Borderless,
    /// Restore decorations
    Framed,
}

/// Input for a window property: a fixed value or a live source
#[derive(Debug, Clone)]
pub enum Property<T: 'static> {
    /// Applied once, immediately
    Value(T),
    /// Applied on every emission for as long as the window lives
    Bound(Signal<T>),
}

impl<T: 'static> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Property<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

/// State shared between a `Window` and the context registry
pub(crate) struct WindowShared {
    pub(crate) native: RefCell<Box<dyn NativeWindow>>,
    pub(crate) signals: WindowSignals,
    title: RefCell<String>,
}

impl WindowShared {
    fn set_title(&self, title: &str) {
        self.native.borrow_mut().set_title(title);
        title.clone_into(&mut self.title.borrow_mut());
    }

    fn set_display_mode(&self, mode: DisplayMode) {
        self.native.borrow_mut().set_display_mode(mode);
    }
}

/// An open window
///
/// Owns the native window: it is destroyed when the `Window` drops. Equality
/// and hashing follow the native identity, so two `Window`s are equal only if
/// they wrap the same native window.
///
/// # Thread Safety
/// `Window` is `!Send`. Every call must come from the thread that owns the
/// `Context`; use [`WindowThread`](crate::event_loop::WindowThread) to reach
/// windows from other threads.
pub struct Window {
    id: NativeId,
    shared: Rc<WindowShared>,
}

impl Window {
    /// Create a window with default options, a title and a size
    ///
    /// # Errors
    /// See [`WindowBuilder::build`].
    pub fn new(context: &mut Context, title: &str, size: Extent2D) -> WindowResult<Self> {
        WindowBuilder::new().title(title).size(size).build(context)
    }

    /// Wrap a freshly created native window; the caller registers it
    pub(crate) fn from_native(native: Box<dyn NativeWindow>, title: String) -> Self {
        let id = native.id();
        Self {
            id,
            shared: Rc::new(WindowShared {
                native: RefCell::new(native),
                signals: WindowSignals::new(),
                title: RefCell::new(title),
            }),
        }
    }

    pub(crate) const fn shared(&self) -> &Rc<WindowShared> {
        &self.shared
    }

    /// Native identity
    pub const fn id(&self) -> NativeId {
        self.id
    }

    // properties ---------------------------------------------------------------------------------

    /// Last title set on this window
    pub fn title(&self) -> String {
        self.shared.title.borrow().clone()
    }

    /// Update the title bar text
    pub fn set_title(&mut self, title: &str) {
        self.shared.set_title(title);
    }

    /// Content-area size in screen coordinates
    pub fn size(&self) -> Extent2D {
        self.shared.native.borrow().size()
    }

    /// Resize the content area
    pub fn set_size(&mut self, size: Extent2D) {
        self.shared.native.borrow_mut().set_size(size);
    }

    /// Position of the content area's top-left corner
    pub fn position(&self) -> Point2D {
        self.shared.native.borrow().position()
    }

    /// Move the window
    pub fn set_position(&mut self, position: Point2D) {
        self.shared.native.borrow_mut().set_position(position);
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> Extent2D {
        self.shared.native.borrow().framebuffer_size()
    }

    /// Whether a close was requested
    pub fn should_close(&self) -> bool {
        self.shared.native.borrow().should_close()
    }

    /// Set or clear the close flag
    pub fn set_should_close(&mut self, value: bool) {
        self.shared.native.borrow_mut().set_should_close(value);
    }

    /// Switch display mode
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.shared.set_display_mode(mode);
    }

    /// Drive the title from a value or a signal
    ///
    /// Returns the subscription on the source signal for bound properties.
    pub fn bind_title(&mut self, title: Property<String>) -> Option<SubscriptionId> {
        self.bind(title, |shared, title: &String| shared.set_title(title))
    }

    /// Drive the display mode from a value or a signal
    pub fn bind_display_mode(&mut self, mode: Property<DisplayMode>) -> Option<SubscriptionId> {
        self.bind(mode, |shared, mode: &DisplayMode| shared.set_display_mode(*mode))
    }

    fn bind<T, F>(&self, property: Property<T>, apply: F) -> Option<SubscriptionId>
    where
        T: 'static,
        F: Fn(&WindowShared, &T) + 'static,
    {
        match property {
            Property::Value(value) => {
                apply(&self.shared, &value);
                None
            }
            Property::Bound(source) => {
                let target: Weak<WindowShared> = Rc::downgrade(&self.shared);
                Some(source.connect(move |value| {
                    if let Some(shared) = target.upgrade() {
                        apply(&shared, value);
                    }
                }))
            }
        }
    }

    // signals ------------------------------------------------------------------------------------

    /// Listen for close requests
    pub fn on_close<F: FnMut() + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_close(slot)
    }

    /// Listen for content-area resizes
    pub fn on_resize<F: FnMut(Extent2D) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_resize(slot)
    }

    /// Listen for framebuffer resizes
    pub fn on_framebuffer_resize<F: FnMut(Extent2D) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_framebuffer_resize(slot)
    }

    /// Listen for position changes
    pub fn on_move<F: FnMut(Point2D) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_move(slot)
    }

    /// Listen for maximize/restore
    pub fn on_maximize<F: FnMut(bool) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_maximize(slot)
    }

    /// Listen for focus changes
    pub fn on_focus<F: FnMut(bool) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_focus(slot)
    }

    /// Listen for minimize/restore
    pub fn on_iconify<F: FnMut(bool) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_iconify(slot)
    }

    /// Listen for every event
    pub fn on_event<F: FnMut(&WindowEvent) + 'static>(&self, slot: F) -> Subscription {
        self.shared.signals.on_event(slot)
    }

    /// Remove a listener, returning whether it was still connected
    pub fn disconnect(&self, subscription: Subscription) -> bool {
        self.shared.signals.disconnect(subscription)
    }

    /// The window's signals
    pub fn signals(&self) -> &WindowSignals {
        &self.shared.signals
    }

    // surfaces -----------------------------------------------------------------------------------

    /// OS-level handles, looked up now; valid while this window lives
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.shared.native.borrow().native_handle()
    }

    /// Create a Vulkan surface for this window
    ///
    /// The caller owns the returned surface and must destroy it before the
    /// instance; [`VulkanSurface`](crate::surface::VulkanSurface) does that.
    ///
    /// # Errors
    /// `InvalidInstance` for a null instance (no native call is made),
    /// `SurfaceCreationFailed` for any non-success result.
    pub fn create_vulkan_surface(&self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR> {
        if instance == vk::Instance::null() {
            return Err(WindowError::InvalidInstance);
        }
        self.shared
            .native
            .borrow_mut()
            .create_vulkan_surface(instance)
            .map_err(WindowError::SurfaceCreationFailed)
    }

    /// Make this window's OpenGL context current on the calling thread
    pub fn make_context_current(&mut self) {
        self.shared.native.borrow_mut().make_current();
    }

    /// Present the OpenGL back buffer
    pub fn swap_buffers(&mut self) {
        self.shared.native.borrow_mut().swap_buffers();
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Window {}

impl Hash for Window {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &*self.shared.title.borrow())
            .finish_non_exhaustive()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        log::debug!("Destroying window {:?}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;
    use ash::vk::Handle;
    use std::cell::Cell;
    use std::collections::HashSet;

    fn headless() -> (Context, crate::platform::headless::HeadlessDriver) {
        let platform = HeadlessPlatform::new();
        let driver = platform.driver();
        (Context::with_platform(platform), driver)
    }

    #[test]
    fn test_window_has_requested_size() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "Ave Gaben!", Extent2D::new(800, 600)).unwrap();

        assert!(driver.is_alive(window.id()));
        assert_eq!(window.size(), Extent2D::new(800, 600));
        assert_eq!(window.framebuffer_size(), Extent2D::new(800, 600));
    }

    #[test]
    fn test_title_round_trips() {
        let (mut context, driver) = headless();
        let mut window = Window::new(&mut context, "untitled", Extent2D::new(64, 64)).unwrap();

        window.set_title("Ave Gaben!");
        assert_eq!(window.title(), "Ave Gaben!");
        assert_eq!(driver.title(window.id()).as_deref(), Some("Ave Gaben!"));
    }

    #[test]
    fn test_moved_window_keeps_receiving_events() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "moving", Extent2D::new(64, 64)).unwrap();
        let resizes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&resizes);
        window.on_resize(move |_| counter.set(counter.get() + 1));

        let id = window.id();
        let mut owners = vec![window];
        let moved = owners.pop().unwrap();

        driver.push_event(id, WindowEvent::Resize(Extent2D::new(10, 10)));
        context.poll_events();

        assert_eq!(resizes.get(), 1);
        assert_eq!(moved.id(), id);
    }

    #[test]
    fn test_close_reaches_each_listener_once() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "closing", Extent2D::new(64, 64)).unwrap();
        let hits: Vec<Rc<Cell<u32>>> = (0..3).map(|_| Rc::new(Cell::new(0))).collect();
        for hit in &hits {
            let hit = Rc::clone(hit);
            window.on_close(move || hit.set(hit.get() + 1));
        }

        driver.request_close(window.id());
        context.poll_events();
        context.poll_events();

        assert!(window.should_close());
        assert!(hits.iter().all(|hit| hit.get() == 1));
    }

    #[test]
    fn test_disconnected_listener_is_silent() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "quiet", Extent2D::new(64, 64)).unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let subscription = window.on_move(move |_| counter.set(counter.get() + 1));

        assert!(window.disconnect(subscription));
        driver.push_event(window.id(), WindowEvent::Move(Point2D::new(3, 4)));
        context.poll_events();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_distinct_windows_are_unequal() {
        let (mut context, _driver) = headless();
        let first = Window::new(&mut context, "Ave Gaben!", Extent2D::new(800, 600)).unwrap();
        let second = Window::new(&mut context, "Ave Hackman!", Extent2D::new(800, 600)).unwrap();

        assert_ne!(first, second);
        let mut windows = HashSet::new();
        windows.insert(first);
        windows.insert(second);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_null_instance_is_rejected() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "vk", Extent2D::new(64, 64)).unwrap();

        let result = window.create_vulkan_surface(vk::Instance::null());
        assert!(matches!(result, Err(WindowError::InvalidInstance)));
        assert_eq!(driver.surface_requests(), 0);
    }

    #[test]
    fn test_surface_failure_is_reported() {
        let (mut context, driver) = headless();
        let window = Window::new(&mut context, "vk", Extent2D::new(64, 64)).unwrap();

        let result = window.create_vulkan_surface(vk::Instance::from_raw(0x1000));
        assert!(matches!(result, Err(WindowError::SurfaceCreationFailed(_))));
        assert_eq!(driver.surface_requests(), 1);
    }

    #[test]
    fn test_creation_failure_carries_native_error() {
        let (mut context, driver) = headless();
        driver.fail_next_creation("X11: Failed to open display");

        let error = Window::new(&mut context, "doomed", Extent2D::new(64, 64)).unwrap_err();
        assert!(error.to_string().contains("Failed to open display"));
        assert_eq!(context.window_count(), 0);
    }

    #[test]
    fn test_bound_title_follows_signal() {
        let (mut context, _driver) = headless();
        let mut window = Window::new(&mut context, "first", Extent2D::new(64, 64)).unwrap();
        let source = Signal::<String>::new();

        let subscription = window.bind_title(Property::Bound(source.clone()));
        assert!(subscription.is_some());
        source.emit(&"second".to_string());
        assert_eq!(window.title(), "second");

        assert!(window.bind_title("third".into()).is_none());
        assert_eq!(window.title(), "third");
    }

    #[test]
    fn test_bound_source_outliving_window_is_harmless() {
        let (mut context, driver) = headless();
        let mut window = Window::new(&mut context, "short", Extent2D::new(64, 64)).unwrap();
        let id = window.id();
        let source = Signal::<DisplayMode>::new();
        window.bind_display_mode(Property::Bound(source.clone()));
        drop(window);

        assert!(!driver.is_alive(id));
        source.emit(&DisplayMode::Borderless);
    }

    #[test]
    fn test_display_mode_reaches_native_window() {
        let (mut context, driver) = headless();
        let mut window = Window::new(&mut context, "modes", Extent2D::new(64, 64)).unwrap();

        window.set_display_mode(DisplayMode::Borderless);
        assert_eq!(driver.display_mode(window.id()), Some(DisplayMode::Borderless));
        window.bind_display_mode(Property::Value(DisplayMode::FullScreen));
        assert_eq!(driver.display_mode(window.id()), Some(DisplayMode::FullScreen));
    }

    #[test]
    fn test_swaps_are_counted_per_window() {
        let (mut context, driver) = headless();
        let mut first = Window::new(&mut context, "first", Extent2D::new(64, 64)).unwrap();
        let mut second = Window::new(&mut context, "second", Extent2D::new(64, 64)).unwrap();

        first.make_context_current();
        first.swap_buffers();
        first.swap_buffers();
        assert_eq!(driver.current_context(), Some(first.id()));
        assert_eq!(driver.swaps(first.id()), 2);
        assert_eq!(driver.swaps(second.id()), 0);

        second.make_context_current();
        second.swap_buffers();
        assert_eq!(driver.current_context(), Some(second.id()));
        assert_eq!(driver.swaps(second.id()), 1);
    }

    #[test]
    fn test_headless_has_no_native_handle() {
        let (mut context, _driver) = headless();
        let window = Window::new(&mut context, "nohandle", Extent2D::new(64, 64)).unwrap();
        assert!(window.native_handle().is_none());
    }
}
