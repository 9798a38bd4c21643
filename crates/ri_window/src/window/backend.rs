//! Native windowing backend contract
//!
//! This module defines the traits every native backend implements. `Window` and
//! `Context` only talk to these traits, which is what lets the GLFW backend and
//! the in-memory headless backend share all of the wrapper logic.

use crate::events::WindowEvent;
use crate::foundation::math::{Extent2D, Point2D};
use crate::platform::NativeHandle;
use crate::window::{DisplayMode, WindowBuilder, WindowResult};
use ash::vk;
use std::time::Duration;

/// Identity of a native window
///
/// For GLFW this is the address of the `GLFWwindow`. It is stable for the
/// lifetime of the native window and is what `Window` equality and hashing use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(usize);

impl NativeId {
    /// Identity from a raw pointer
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Identity from a plain number (backends without pointers)
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw numeric identity
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Process-level backend: initialization, window creation and the event pump
///
/// A `Platform` is created once and handed to a `Context`, which then owns it
/// for the rest of its life. Applications normally never call it directly.
///
/// # Design Philosophy
/// - **Native calls only**: no signals, no registry, no bookkeeping. Event
///   routing and property bindings live in `Context` and `Window`
/// - **Backend neutral**: hints and events cross the trait as crate types, so
///   nothing GLFW-specific leaks into the wrapper
///
/// # Thread Safety
/// Backends are not required to be `Send`; GLFW demands that all of these calls
/// come from one thread, which the owning `Context` guarantees.
pub trait Platform {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Apply the builder's hints and create one native window
    ///
    /// Returns `CreationFailed` with the backend's last error text when the
    /// native call yields no window.
    fn create_window(&mut self, builder: &WindowBuilder) -> WindowResult<Box<dyn NativeWindow>>;

    /// Process pending native events without blocking
    ///
    /// Events become visible through each window's
    /// [`drain_events`](NativeWindow::drain_events) only after this call.
    fn poll_events(&mut self);

    /// Block until an event arrives or `timeout` elapses
    fn wait_events_timeout(&mut self, timeout: Duration);

    /// Refresh rate of the primary monitor in Hz, if known
    ///
    /// Some monitors report 0; callers treat that the same as `None`.
    fn refresh_rate(&mut self) -> Option<u32>;

    /// Whether Vulkan surfaces can be created
    fn vulkan_supported(&self) -> bool;

    /// Instance extensions a Vulkan instance needs to present to windows
    fn required_instance_extensions(&self) -> Option<Vec<String>>;

    /// Swap interval for the current OpenGL context
    fn set_swap_interval(&mut self, interval: u32);
}

/// One live native window
///
/// Dropping the implementor destroys the native window. The wrapper `Window`
/// keeps it behind a `RefCell` and forwards every getter and setter here; the
/// implementor only reports native state and never emits signals itself.
///
/// # Events
/// Setters that change size or position do not report anything synchronously.
/// The resulting events are queued natively and come back out of
/// [`drain_events`](Self::drain_events) after the next poll, exactly like
/// changes made by the user.
///
/// # Thread Safety
/// Same as [`Platform`]: one thread, no `Send` requirement.
pub trait NativeWindow {
    /// Stable identity of the native window
    fn id(&self) -> NativeId;

    /// Update the title bar text
    fn set_title(&mut self, title: &str);

    /// Content-area size in screen coordinates
    fn size(&self) -> Extent2D;

    /// Resize the content area
    fn set_size(&mut self, size: Extent2D);

    /// Top-left corner of the content area
    fn position(&self) -> Point2D;

    /// Move the window
    fn set_position(&mut self, position: Point2D);

    /// Framebuffer size in pixels
    fn framebuffer_size(&self) -> Extent2D;

    /// Whether a close was requested
    fn should_close(&self) -> bool;

    /// Set or clear the close flag
    fn set_should_close(&mut self, value: bool);

    /// Switch between full screen/windowed or framed/borderless
    ///
    /// Full screen takes the primary monitor's video mode. Windowed places the
    /// window at a third of that mode, offset by a third. Without a primary
    /// monitor both are ignored with a warning.
    fn set_display_mode(&mut self, mode: DisplayMode);

    /// Take the events delivered since the last call
    fn drain_events(&mut self) -> Vec<WindowEvent>;

    /// OS-level handles, when the window is backed by a real OS window
    ///
    /// `None` when the lookup yields nothing usable, e.g. GLFW running on
    /// Wayland where no X11 window exists.
    fn native_handle(&self) -> Option<NativeHandle>;

    /// Create a Vulkan surface for this window
    fn create_vulkan_surface(&mut self, instance: vk::Instance) -> Result<vk::SurfaceKHR, vk::Result>;

    /// Make this window's OpenGL context current on the calling thread
    fn make_current(&mut self);

    /// Swap front and back buffers of the OpenGL context
    fn swap_buffers(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_id_uses_pointer_identity() {
        let a = 1_u8;
        let b = 2_u8;
        let id_a = NativeId::from_ptr(&a);
        assert_eq!(id_a, NativeId::from_ptr(&a));
        assert_ne!(id_a, NativeId::from_ptr(&b));
        assert_eq!(NativeId::from_raw(7).as_raw(), 7);
    }
}
