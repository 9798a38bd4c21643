//! Window management errors

use crate::event_loop::WindowId;
use ash::vk;
use std::time::Duration;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW's global init failed
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// A GLFW context is already alive in this process
    #[error("GLFW is already initialized in this process")]
    AlreadyInitialized,

    /// The native window could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),

    /// The platform cannot present through Vulkan
    #[error("Vulkan is not supported by this platform")]
    VulkanUnsupported,

    /// A null Vulkan instance was supplied
    #[error("Vulkan instance handle is null")]
    InvalidInstance,

    /// Surface creation returned a non-success code
    #[error("Vulkan surface creation failed: {0:?}")]
    SurfaceCreationFailed(vk::Result),

    /// The window thread did not answer in time
    #[error("Window thread did not respond within {0:?}")]
    Timeout(Duration),

    /// The request was cancelled before it was delivered
    #[error("Window request was cancelled")]
    Cancelled,

    /// The window thread has shut down
    #[error("Window thread is no longer running")]
    EventLoopClosed,

    /// No window with this id lives on the window thread
    #[error("Unknown window: {0:?}")]
    UnknownWindow(WindowId),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;
