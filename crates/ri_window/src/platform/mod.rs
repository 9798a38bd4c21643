//! Native backends and platform handles
//!
//! - **`glfw`**: the real backend, wrapping GLFW
//! - **`headless`**: an in-memory backend for tests and CI machines without a display
//!
//! The OS handle aggregate is chosen at compile time: `Win32Handle` on Windows,
//! `X11Handle` on Linux. Elsewhere `NativeHandle` is an empty marker and lookups
//! return `None`.

pub mod glfw;
pub mod headless;

#[cfg(target_os = "windows")]
pub(crate) mod win32;
#[cfg(target_os = "windows")]
pub use win32::Win32Handle as NativeHandle;

#[cfg(target_os = "linux")]
pub(crate) mod x11;
#[cfg(target_os = "linux")]
pub use x11::X11Handle as NativeHandle;

/// Placeholder on platforms without a native handle accessor
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHandle {
    _private: (),
}
