//! X11 native handle lookup
//!
//! The display connection and the X window id come from the glfw crate's safe
//! accessors. The visual is matched the way GLFW-based renderers expect it:
//! 24-bit TrueColor on the default screen.

use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
    XlibDisplayHandle, XlibWindowHandle,
};
use std::ffi::{c_int, c_ulong, c_void};
use std::mem::MaybeUninit;

const TRUE_COLOR: c_int = 4;
const VISUAL_DEPTH: c_int = 24;

#[repr(C)]
#[allow(dead_code)]
struct XVisualInfo {
    visual: *mut c_void,
    visualid: c_ulong,
    screen: c_int,
    depth: c_int,
    class: c_int,
    red_mask: c_ulong,
    green_mask: c_ulong,
    blue_mask: c_ulong,
    colormap_size: c_int,
    bits_per_rgb: c_int,
}

#[link(name = "X11")]
extern "C" {
    fn XDefaultScreen(display: *mut c_void) -> c_int;
    fn XMatchVisualInfo(
        display: *mut c_void,
        screen: c_int,
        depth: c_int,
        class: c_int,
        vinfo_return: *mut XVisualInfo,
    ) -> c_int;
}

/// X11 display, window and visual of a live GLFW window
///
/// Borrowed references: valid only while the source window is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X11Handle {
    /// `Display*` connection shared by every GLFW window
    pub display: *mut c_void,
    /// X window id
    pub window: c_ulong,
    /// Default screen of the display
    pub screen: i32,
    /// `Visual*` of the matched visual, null if none matched
    pub visual: *mut c_void,
    /// Id of the matched visual, 0 if none matched
    pub visual_id: c_ulong,
    /// Depth of the matched visual
    pub depth: u32,
}

/// Complete a handle from GLFW's display connection and X window id
///
/// Returns `None` when GLFW is not running on X11 (for example under Wayland),
/// in which case both come back null.
pub(crate) fn from_glfw(display: *mut c_void, xwindow: c_ulong) -> Option<X11Handle> {
    if display.is_null() || xwindow == 0 {
        return None;
    }

    // SAFETY: `display` is GLFW's open connection; `info` is written before being read.
    let (screen, info) = unsafe {
        let screen = XDefaultScreen(display);
        let mut info = MaybeUninit::<XVisualInfo>::zeroed();
        let found = XMatchVisualInfo(display, screen, VISUAL_DEPTH, TRUE_COLOR, info.as_mut_ptr());
        (screen, (found != 0).then(|| info.assume_init()))
    };

    Some(X11Handle {
        display,
        window: xwindow,
        screen,
        visual: info.as_ref().map_or(std::ptr::null_mut(), |info| info.visual),
        visual_id: info.as_ref().map_or(0, |info| info.visualid),
        depth: info.map_or(0, |info| u32::try_from(info.depth).unwrap_or(0)),
    })
}

// SAFETY: the handles come from a live GLFW window; callers must not outlive it.
unsafe impl HasRawWindowHandle for X11Handle {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = XlibWindowHandle::empty();
        handle.window = self.window;
        handle.visual_id = self.visual_id;
        RawWindowHandle::Xlib(handle)
    }
}

// SAFETY: see `HasRawWindowHandle` above.
unsafe impl HasRawDisplayHandle for X11Handle {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        let mut handle = XlibDisplayHandle::empty();
        handle.display = self.display;
        handle.screen = self.screen;
        RawDisplayHandle::Xlib(handle)
    }
}
