//! Win32 native handle

use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
    Win32WindowHandle, WindowsDisplayHandle,
};
use std::ffi::c_void;

/// Win32 window handle of a live GLFW window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Win32Handle {
    /// `HWND` of the window
    pub hwnd: *mut c_void,
}

/// Wrap the `HWND` GLFW reports; `None` if it is null
pub(crate) fn from_hwnd(hwnd: *mut c_void) -> Option<Win32Handle> {
    (!hwnd.is_null()).then_some(Win32Handle { hwnd })
}

// SAFETY: the handle comes from a live GLFW window; callers must not outlive it.
unsafe impl HasRawWindowHandle for Win32Handle {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = self.hwnd;
        RawWindowHandle::Win32(handle)
    }
}

// SAFETY: Windows has no display connection to borrow.
unsafe impl HasRawDisplayHandle for Win32Handle {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Windows(WindowsDisplayHandle::empty())
    }
}
