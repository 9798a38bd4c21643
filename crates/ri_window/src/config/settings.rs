//! Serializable window and event loop settings

use super::{Config, Deserialize, Serialize};
use crate::context::MIN_POLL_INTERVAL;
use crate::foundation::math::{Extent2D, Version};
use crate::window::{DisplayMode, WindowBuilder, WindowFlags};
use std::time::Duration;

/// Creation options for one window, mirroring [`WindowBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Content-area width in screen coordinates
    pub width: u32,
    /// Content-area height in screen coordinates
    pub height: u32,
    /// User can resize the window
    pub resizable: bool,
    /// Shown on creation
    pub visible: bool,
    /// Title bar and borders
    pub decorated: bool,
    /// Focused on creation
    pub focused: bool,
    /// Stays above other windows
    pub floating: bool,
    /// Starts maximized
    pub maximized: bool,
    /// Cursor centered on full screen windows
    pub center_cursor: bool,
    /// Takes focus when shown
    pub focus_on_show: bool,
    /// Content area follows the monitor content scale
    pub scale_to_monitor: bool,
    /// Display mode applied after creation
    pub display_mode: Option<DisplayMode>,
    /// OpenGL context version; no client API when unset
    pub opengl: Option<Version>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::from(&WindowBuilder::default())
    }
}

impl From<&WindowBuilder> for WindowConfig {
    fn from(builder: &WindowBuilder) -> Self {
        let flags = builder.get_flags();
        let size = builder.get_size();
        Self {
            title: builder.get_title().to_string(),
            width: size.width,
            height: size.height,
            resizable: flags.contains(WindowFlags::RESIZABLE),
            visible: flags.contains(WindowFlags::VISIBLE),
            decorated: flags.contains(WindowFlags::DECORATED),
            focused: flags.contains(WindowFlags::FOCUSED),
            floating: flags.contains(WindowFlags::FLOATING),
            maximized: flags.contains(WindowFlags::MAXIMIZED),
            center_cursor: flags.contains(WindowFlags::CENTER_CURSOR),
            focus_on_show: flags.contains(WindowFlags::FOCUS_ON_SHOW),
            scale_to_monitor: flags.contains(WindowFlags::SCALE_TO_MONITOR),
            display_mode: builder.get_display_mode(),
            opengl: builder.get_opengl(),
        }
    }
}

impl From<&WindowConfig> for WindowBuilder {
    fn from(config: &WindowConfig) -> Self {
        let mut builder = Self::new()
            .title(config.title.as_str())
            .size(Extent2D::new(config.width, config.height))
            .resizable(config.resizable)
            .visible(config.visible)
            .decorated(config.decorated)
            .focused(config.focused)
            .floating(config.floating)
            .maximized(config.maximized)
            .center_cursor(config.center_cursor)
            .focus_on_show(config.focus_on_show)
            .scale_to_monitor(config.scale_to_monitor);

        if let Some(mode) = config.display_mode {
            builder = builder.display_mode(mode);
        }
        if let Some(version) = config.opengl {
            builder = builder.opengl(version);
        }
        builder
    }
}

impl WindowConfig {
    /// Builder carrying these options
    pub fn builder(&self) -> WindowBuilder {
        WindowBuilder::from(self)
    }
}

/// Window thread settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Poll rate in Hz; the primary monitor's refresh rate when unset
    pub refresh_rate: Option<u32>,
    /// How long a caller waits for the window thread to answer
    pub request_timeout_ms: u64,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            refresh_rate: None,
            request_timeout_ms: 5_000,
        }
    }
}

impl EventLoopConfig {
    /// Request timeout as a `Duration`
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Configured poll interval, if the refresh rate is overridden
    ///
    /// Clamped to [`MIN_POLL_INTERVAL`] so absurd rates cannot spin the thread.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_rate
            .filter(|rate| *rate > 0)
            .map(|rate| (Duration::from_secs(1) / rate).max(MIN_POLL_INTERVAL))
    }
}

/// Top-level application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Main window options
    pub window: WindowConfig,
    /// Window thread options
    pub event_loop: EventLoopConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            event_loop: EventLoopConfig::default(),
        }
    }
}

impl Config for ApplicationConfig {}
impl Config for WindowConfig {}
impl Config for EventLoopConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builder() {
        let config = WindowConfig::default();
        assert_eq!(config.title, "RiWindow");
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.resizable && config.visible && config.decorated);
        assert!(!config.floating);
        assert_eq!(config.builder(), WindowBuilder::new());
    }

    #[test]
    fn test_builder_conversion_keeps_everything() {
        let builder = WindowBuilder::new()
            .title("Ave Hackman!")
            .size(Extent2D::new(1024, 768))
            .decorated(false)
            .scale_to_monitor(true)
            .opengl(Version::new(4, 5))
            .display_mode(DisplayMode::Borderless);

        assert_eq!(WindowConfig::from(&builder).builder(), builder);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
            log_level = "warn"

            [window]
            title = "Ave Gaben!"
            display_mode = "FullScreen"

            [event_loop]
            refresh_rate = 75
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.window.title, "Ave Gaben!");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.display_mode, Some(DisplayMode::FullScreen));
        assert_eq!(config.event_loop.refresh_interval(), Some(Duration::from_secs(1) / 75));
        assert_eq!(config.event_loop.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_refresh_rate_means_monitor_rate() {
        let config = EventLoopConfig {
            refresh_rate: Some(0),
            ..EventLoopConfig::default()
        };
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_huge_refresh_rate_is_clamped() {
        let config = EventLoopConfig {
            refresh_rate: Some(u32::MAX),
            ..EventLoopConfig::default()
        };
        assert_eq!(config.refresh_interval(), Some(Duration::from_millis(1)));
    }
}
