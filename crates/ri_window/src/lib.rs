//! # RiWindow
//!
//! A thin, safe wrapper around GLFW windows.
//!
//! ## Features
//!
//! - **Explicit context**: GLFW's global state lives in a [`Context`] value
//! - **Signals**: every window callback is re-published as a connectable signal
//! - **Bindable properties**: title and display mode follow a value or a signal
//! - **Vulkan and OpenGL**: surface creation, context switching, buffer swaps
//! - **Native handles**: Win32/X11 handles with `raw-window-handle` support
//! - **Window thread**: a dedicated thread owning all windows, driven by channels
//! - **Headless backend**: windows without a display, for tests and CI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ri_window::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut context = Context::init()?;
//!     let window = WindowBuilder::new()
//!         .title("Ave Gaben!")
//!         .size(Extent2D::new(800, 600))
//!         .build(&mut context)?;
//!
//!     window.on_resize(|size| println!("resized to {}", size));
//!     let interval = context.refresh_interval();
//!     while !window.should_close() {
//!         context.wait_events_timeout(interval);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod event_loop;
pub mod events;
pub mod foundation;
pub mod platform;
pub mod surface;
pub mod window;

pub use context::Context;
pub use window::{Window, WindowBuilder, WindowError, WindowResult};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{ApplicationConfig, Config, EventLoopConfig, WindowConfig},
        context::Context,
        event_loop::{PendingWindow, WindowId, WindowThread},
        events::{EventKind, Signal, Subscription, WindowEvent},
        foundation::math::{Extent2D, Point2D, Version},
        platform::NativeHandle,
        surface::VulkanSurface,
        window::{DisplayMode, Property, Window, WindowBuilder, WindowError, WindowResult},
    };
}
