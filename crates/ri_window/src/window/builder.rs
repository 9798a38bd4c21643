//! Fluent window configuration
//!
//! `WindowBuilder` collects creation-time options and translates them into
//! native hints. Building is a single linear pass: reset hints, apply one hint
//! per flag, create the window, register it with the context.

use crate::context::Context;
use crate::foundation::math::{Extent2D, Version};
use crate::window::{DisplayMode, Window, WindowResult};
use bitflags::bitflags;

bitflags! {
    /// Boolean creation flags, one native hint each
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u16 {
        /// User can resize the window
        const RESIZABLE        = 1 << 0;
        /// Window is shown on creation
        const VISIBLE          = 1 << 1;
        /// Window has title bar and borders
        const DECORATED        = 1 << 2;
        /// Window takes input focus on creation
        const FOCUSED          = 1 << 3;
        /// Window stays above other windows
        const FLOATING         = 1 << 4;
        /// Window starts maximized
        const MAXIMIZED        = 1 << 5;
        /// Cursor is centered over full screen windows
        const CENTER_CURSOR    = 1 << 6;
        /// Window takes focus when shown
        const FOCUS_ON_SHOW    = 1 << 7;
        /// Content area is scaled by the monitor content scale
        const SCALE_TO_MONITOR = 1 << 8;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::RESIZABLE | Self::VISIBLE | Self::DECORATED
    }
}

/// Rendering API the native window is prepared for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientApi {
    /// No context; the caller creates a Vulkan surface
    NoApi,
    /// Desktop OpenGL context
    OpenGl,
}

/// Backend-neutral creation hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Resizable hint
    Resizable(bool),
    /// Visible hint
    Visible(bool),
    /// Decorated hint
    Decorated(bool),
    /// Focused hint
    Focused(bool),
    /// Floating hint
    Floating(bool),
    /// Maximized hint
    Maximized(bool),
    /// Center-cursor hint
    CenterCursor(bool),
    /// Focus-on-show hint
    FocusOnShow(bool),
    /// Scale-to-monitor hint
    ScaleToMonitor(bool),
    /// Client API selection
    ClientApi(ClientApi),
    /// Requested context version (OpenGL only)
    ContextVersion(Version),
}

/// Fluent builder consumed once by [`WindowBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBuilder {
    title: String,
    size: Extent2D,
    flags: WindowFlags,
    opengl: Option<Version>,
    display_mode: Option<DisplayMode>,
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self {
            title: "RiWindow".to_string(),
            size: Extent2D::new(800, 600),
            flags: WindowFlags::default(),
            opengl: None,
            display_mode: None,
        }
    }
}

impl WindowBuilder {
    /// Start from the defaults: "RiWindow", 800x600, resizable, visible, decorated
    pub fn new() -> Self {
        Self::default()
    }

    /// Window title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Content-area size in screen coordinates
    pub fn size(mut self, size: Extent2D) -> Self {
        self.size = size;
        self
    }

    /// Request an OpenGL context of the given version instead of `NoApi`
    pub fn opengl(mut self, version: Version) -> Self {
        self.opengl = Some(version);
        self
    }

    /// Display mode applied right after creation
    pub fn display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = Some(mode);
        self
    }

    /// Replace all flags at once
    pub fn flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    fn flag(mut self, flag: WindowFlags, value: bool) -> Self {
        self.flags.set(flag, value);
        self
    }

    /// Whether the user can resize the window
    pub fn resizable(self, value: bool) -> Self {
        self.flag(WindowFlags::RESIZABLE, value)
    }

    /// Whether the window is shown on creation
    pub fn visible(self, value: bool) -> Self {
        self.flag(WindowFlags::VISIBLE, value)
    }

    /// Whether the window has decorations
    pub fn decorated(self, value: bool) -> Self {
        self.flag(WindowFlags::DECORATED, value)
    }

    /// Whether the window is focused on creation
    pub fn focused(self, value: bool) -> Self {
        self.flag(WindowFlags::FOCUSED, value)
    }

    /// Whether the window floats above others
    pub fn floating(self, value: bool) -> Self {
        self.flag(WindowFlags::FLOATING, value)
    }

    /// Whether the window starts maximized
    pub fn maximized(self, value: bool) -> Self {
        self.flag(WindowFlags::MAXIMIZED, value)
    }

    /// Whether the cursor is centered on full screen windows
    pub fn center_cursor(self, value: bool) -> Self {
        self.flag(WindowFlags::CENTER_CURSOR, value)
    }

    /// Whether the window takes focus when shown
    pub fn focus_on_show(self, value: bool) -> Self {
        self.flag(WindowFlags::FOCUS_ON_SHOW, value)
    }

    /// Whether the content area follows the monitor content scale
    pub fn scale_to_monitor(self, value: bool) -> Self {
        self.flag(WindowFlags::SCALE_TO_MONITOR, value)
    }

    /// Configured title
    pub fn get_title(&self) -> &str {
        &self.title
    }

    /// Configured size
    pub const fn get_size(&self) -> Extent2D {
        self.size
    }

    /// Configured flags
    pub const fn get_flags(&self) -> WindowFlags {
        self.flags
    }

    /// Configured OpenGL version, if any
    pub const fn get_opengl(&self) -> Option<Version> {
        self.opengl
    }

    /// Configured initial display mode, if any
    pub const fn get_display_mode(&self) -> Option<DisplayMode> {
        self.display_mode
    }

    /// Translate the configuration into native hints
    ///
    /// Every flag yields exactly one hint, followed by the client API and,
    /// for OpenGL, the context version.
    pub fn hints(&self) -> Vec<Hint> {
        let flags = self.flags;
        let mut hints = vec![
            Hint::Resizable(flags.contains(WindowFlags::RESIZABLE)),
            Hint::Visible(flags.contains(WindowFlags::VISIBLE)),
            Hint::Decorated(flags.contains(WindowFlags::DECORATED)),
            Hint::Focused(flags.contains(WindowFlags::FOCUSED)),
            Hint::Floating(flags.contains(WindowFlags::FLOATING)),
            Hint::Maximized(flags.contains(WindowFlags::MAXIMIZED)),
            Hint::CenterCursor(flags.contains(WindowFlags::CENTER_CURSOR)),
            Hint::FocusOnShow(flags.contains(WindowFlags::FOCUS_ON_SHOW)),
            Hint::ScaleToMonitor(flags.contains(WindowFlags::SCALE_TO_MONITOR)),
        ];

        match self.opengl {
            Some(version) => {
                hints.push(Hint::ClientApi(ClientApi::OpenGl));
                hints.push(Hint::ContextVersion(version));
            }
            None => hints.push(Hint::ClientApi(ClientApi::NoApi)),
        }
        hints
    }

    /// Create the window inside `context`
    ///
    /// # Errors
    /// `CreationFailed` carrying the native error text when the platform
    /// returns no window.
    pub fn build(self, context: &mut Context) -> WindowResult<Window> {
        let native = context.platform_mut().create_window(&self)?;
        let mut window = context.adopt(native, self.title);
        if let Some(mode) = self.display_mode {
            window.set_display_mode(mode);
        }
        log::info!("Created window {:?} ({})", window.id(), self.size);
        Ok(window)
    }
}
