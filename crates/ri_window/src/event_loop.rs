//! Dedicated window thread
//!
//! GLFW windows are bound to the thread that created them, so a
//! [`WindowThread`] spawns one OS thread that owns the [`Context`] and every
//! window created through it. Other threads talk to it over channels:
//!
//! - window requests return a [`PendingWindow`] that can be awaited with a
//!   timeout or cancelled
//! - [`WindowThread::with_window`] runs a closure against a window on its thread
//! - every window event is forwarded as `(WindowId, WindowEvent)` on
//!   [`WindowThread::events`]
//!
//! Between commands the thread pumps native events once per refresh interval.
//!
//! # Request Handoff
//!
//! A pending request is settled exactly once through an atomic state:
//! `WAITING → DELIVERED` by the window thread after the window exists, or
//! `WAITING → CANCELLED` by the requester. A window whose request was cancelled
//! first is destroyed on the window thread instead of being stored, so a request
//! abandoned on timeout never leaks a window.

use crate::config::EventLoopConfig;
use crate::context::Context;
use crate::events::WindowEvent;
use crate::window::{Window, WindowBuilder, WindowError, WindowResult};
use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle of a window owned by a [`WindowThread`]
    pub struct WindowId;
}

const WAITING: u8 = 0;
const DELIVERED: u8 = 1;
const CANCELLED: u8 = 2;

type Job = Box<dyn FnOnce(&mut WindowHost) + Send>;

enum Command {
    Create {
        builder: WindowBuilder,
        handoff: Arc<AtomicU8>,
        reply: Sender<WindowResult<WindowId>>,
    },
    Run(Job),
    Shutdown,
}

/// State living on the window thread
struct WindowHost {
    windows: SlotMap<WindowId, Window>,
    context: Context,
    events: Sender<(WindowId, WindowEvent)>,
}

impl WindowHost {
    fn create(
        &mut self,
        builder: WindowBuilder,
        handoff: &AtomicU8,
        reply: &Sender<WindowResult<WindowId>>,
    ) {
        if handoff.load(Ordering::Acquire) == CANCELLED {
            log::warn!("Skipping cancelled window request");
            return;
        }

        let result = builder.build(&mut self.context).and_then(|window| {
            if handoff
                .compare_exchange(WAITING, DELIVERED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                log::warn!("Window request cancelled during creation; destroying {:?}", window.id());
                return Err(WindowError::Cancelled);
            }
            Ok(self.adopt(window))
        });

        // The requester may have gone away; its PendingWindow drop already settled the handoff
        let _ = reply.send(result);
    }

    fn adopt(&mut self, window: Window) -> WindowId {
        let id = self.windows.insert(window);
        let events = self.events.clone();
        self.windows[id].on_event(move |event| {
            let _ = events.send((id, *event));
        });
        id
    }

    fn destroy(&mut self, id: WindowId) -> bool {
        self.windows.remove(id).is_some()
    }
}

fn run_host<F>(
    init: F,
    config: &EventLoopConfig,
    commands: &Receiver<Command>,
    ready: &Sender<WindowResult<Duration>>,
    events: Sender<(WindowId, WindowEvent)>,
) where
    F: FnOnce() -> WindowResult<Context>,
{
    let mut context = match init() {
        Ok(context) => context,
        Err(error) => {
            log::error!("Window thread failed to initialize: {}", error);
            let _ = ready.send(Err(error));
            return;
        }
    };

    let interval = config
        .refresh_interval()
        .unwrap_or_else(|| context.refresh_interval());
    let mut host = WindowHost {
        windows: SlotMap::with_key(),
        context,
        events,
    };
    let _ = ready.send(Ok(interval));
    log::info!("Window thread running, polling every {:?}", interval);

    let mut next_poll = Instant::now() + interval;
    loop {
        match commands.recv_deadline(next_poll) {
            Ok(Command::Create { builder, handoff, reply }) => host.create(builder, &handoff, &reply),
            Ok(Command::Run(job)) => job(&mut host),
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        if now >= next_poll {
            host.context.poll_events();
            next_poll = (next_poll + interval).max(now);
        }
    }

    let WindowHost { windows, context, .. } = host;
    log::info!("Window thread stopping with {} window(s)", windows.len());
    drop(windows);
    drop(context);
}

/// Owner of the window thread
///
/// Dropping it shuts the thread down and joins it; windows are destroyed
/// before the context.
pub struct WindowThread {
    commands: Sender<Command>,
    events: Receiver<(WindowId, WindowEvent)>,
    config: EventLoopConfig,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl WindowThread {
    /// Spawn the thread with default settings and GLFW
    ///
    /// # Errors
    /// The context initialization error, reported from the window thread.
    pub fn spawn_glfw() -> WindowResult<Self> {
        Self::spawn(EventLoopConfig::default(), Context::init)
    }

    /// Spawn the thread; `init` runs on it and builds the context
    ///
    /// Blocks until `init` has finished.
    ///
    /// # Errors
    /// Whatever `init` returns, or `InitializationFailed` if the thread could
    /// not be started or died during startup.
    pub fn spawn<F>(config: EventLoopConfig, init: F) -> WindowResult<Self>
    where
        F: FnOnce() -> WindowResult<Context> + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);
        let host_config = config.clone();

        let handle = thread::Builder::new()
            .name("ri-window".to_string())
            .spawn(move || run_host(init, &host_config, &command_rx, &ready_tx, event_tx))
            .map_err(|e| WindowError::InitializationFailed(e.to_string()))?;

        let interval = match ready_rx.recv() {
            Ok(Ok(interval)) => interval,
            Ok(Err(error)) => {
                let _ = handle.join();
                return Err(error);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(WindowError::InitializationFailed(
                    "window thread exited during startup".to_string(),
                ));
            }
        };

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            config,
            interval,
            handle: Some(handle),
        })
    }

    /// Interval between event pumps
    pub const fn poll_interval(&self) -> Duration {
        self.interval
    }

    /// Events of every window on this thread
    pub const fn events(&self) -> &Receiver<(WindowId, WindowEvent)> {
        &self.events
    }

    /// Ask the thread to create a window
    ///
    /// # Errors
    /// `EventLoopClosed` if the thread has stopped.
    pub fn request_window(&self, builder: WindowBuilder) -> WindowResult<PendingWindow> {
        let handoff = Arc::new(AtomicU8::new(WAITING));
        let (reply_tx, reply_rx) = bounded(1);
        self.send(Command::Create {
            builder,
            handoff: Arc::clone(&handoff),
            reply: reply_tx,
        })?;

        Ok(PendingWindow {
            handoff,
            reply: reply_rx,
            commands: self.commands.clone(),
            settled: false,
        })
    }

    /// Create a window and wait for it within the configured request timeout
    ///
    /// # Errors
    /// See [`PendingWindow::wait`].
    pub fn create_window(&self, builder: WindowBuilder) -> WindowResult<WindowId> {
        self.request_window(builder)?.wait(self.config.request_timeout())
    }

    /// Run `f` against a window on the window thread and return its result
    ///
    /// # Errors
    /// `UnknownWindow` if no such window lives, `Timeout` if the thread does
    /// not answer in time, `EventLoopClosed` if it has stopped.
    pub fn with_window<R, F>(&self, id: WindowId, f: F) -> WindowResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Window) -> R + Send + 'static,
    {
        self.call(move |host| {
            host.windows
                .get_mut(id)
                .map(f)
                .ok_or(WindowError::UnknownWindow(id))
        })?
    }

    /// Run `f` against the context on the window thread
    ///
    /// # Errors
    /// `Timeout` or `EventLoopClosed`, as for [`WindowThread::with_window`].
    pub fn with_context<R, F>(&self, f: F) -> WindowResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Context) -> R + Send + 'static,
    {
        self.call(move |host| f(&mut host.context))
    }

    /// Destroy a window
    ///
    /// # Errors
    /// `UnknownWindow` if it was already gone.
    pub fn destroy_window(&self, id: WindowId) -> WindowResult<()> {
        if self.call(move |host| host.destroy(id))? {
            Ok(())
        } else {
            Err(WindowError::UnknownWindow(id))
        }
    }

    /// Ids of the windows alive on the thread
    ///
    /// # Errors
    /// `Timeout` or `EventLoopClosed`.
    pub fn window_ids(&self) -> WindowResult<Vec<WindowId>> {
        self.call(|host| host.windows.keys().collect())
    }

    /// Stop the thread, destroying its windows and then the context
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn call<R, F>(&self, f: F) -> WindowResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut WindowHost) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(Command::Run(Box::new(move |host| {
            let _ = reply_tx.send(f(host));
        })))?;

        let timeout = self.config.request_timeout();
        reply_rx.recv_timeout(timeout).map_err(|error| match error {
            RecvTimeoutError::Timeout => WindowError::Timeout(timeout),
            RecvTimeoutError::Disconnected => WindowError::EventLoopClosed,
        })
    }

    fn send(&self, command: Command) -> WindowResult<()> {
        self.commands
            .send(command)
            .map_err(|_| WindowError::EventLoopClosed)
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(Command::Shutdown);
            if handle.join().is_err() {
                log::error!("Window thread panicked");
            }
        }
    }
}

impl Drop for WindowThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A window request in flight
///
/// Dropping it unanswered cancels the request; a window delivered to a dropped
/// request is destroyed on the window thread.
pub struct PendingWindow {
    handoff: Arc<AtomicU8>,
    reply: Receiver<WindowResult<WindowId>>,
    commands: Sender<Command>,
    settled: bool,
}

impl PendingWindow {
    /// Wait up to `timeout` for the window
    ///
    /// # Errors
    /// The creation error, `Timeout` if the request was still waiting when the
    /// time ran out (it is then cancelled), or `EventLoopClosed`.
    pub fn wait(mut self, timeout: Duration) -> WindowResult<WindowId> {
        self.settled = true;
        match self.reply.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Disconnected) => Err(WindowError::EventLoopClosed),
            Err(RecvTimeoutError::Timeout) => {
                if self.try_cancel() {
                    log::warn!("Window request timed out after {:?}", timeout);
                    Err(WindowError::Timeout(timeout))
                } else {
                    // Delivered just as the clock ran out; the reply follows immediately
                    self.reply
                        .recv()
                        .unwrap_or(Err(WindowError::EventLoopClosed))
                }
            }
        }
    }

    /// Withdraw the request
    ///
    /// Returns `true` if it was withdrawn before delivery. Otherwise the window
    /// already exists and is destroyed on the window thread.
    pub fn cancel(mut self) -> bool {
        self.settled = true;
        self.withdraw()
    }

    /// Whether the window thread has already created the window
    pub fn is_delivered(&self) -> bool {
        self.handoff.load(Ordering::Acquire) == DELIVERED
    }

    fn try_cancel(&self) -> bool {
        self.handoff
            .compare_exchange(WAITING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn withdraw(&self) -> bool {
        if self.try_cancel() {
            return true;
        }

        // The reply is queued; destroy the window once the thread gets to it
        let reply = self.reply.clone();
        let _ = self.commands.send(Command::Run(Box::new(move |host| {
            if let Ok(Ok(id)) = reply.try_recv() {
                host.destroy(id);
                log::debug!("Destroyed window {:?} of a withdrawn request", id);
            }
        })));
        false
    }
}

impl Drop for PendingWindow {
    fn drop(&mut self) {
        if !self.settled {
            self.withdraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Extent2D;
    use crate::platform::headless::{HeadlessDriver, HeadlessPlatform};
    use std::sync::mpsc;

    fn fast_config() -> EventLoopConfig {
        EventLoopConfig {
            refresh_rate: Some(500),
            request_timeout_ms: 2_000,
        }
    }

    fn spawn_headless() -> (WindowThread, HeadlessDriver) {
        let platform = HeadlessPlatform::new();
        let driver = platform.driver();
        let thread =
            WindowThread::spawn(fast_config(), move || Ok(Context::with_platform(platform))).unwrap();
        (thread, driver)
    }

    #[test]
    fn test_create_window_from_another_thread() {
        let (thread, driver) = spawn_headless();
        let id = thread
            .create_window(WindowBuilder::new().title("Ave Gaben!"))
            .unwrap();

        let (native, title) = thread
            .with_window(id, |window| (window.id(), window.title()))
            .unwrap();
        assert_eq!(title, "Ave Gaben!");
        assert!(driver.is_alive(native));
        assert_eq!(thread.window_ids().unwrap(), vec![id]);
    }

    #[test]
    fn test_events_are_forwarded() {
        let (thread, driver) = spawn_headless();
        let id = thread.create_window(WindowBuilder::new()).unwrap();
        let native = thread.with_window(id, |window| window.id()).unwrap();

        driver.request_close(native);
        let (from, event) = thread.events().recv_timeout(Duration::from_secs(2)).unwrap();

        assert_eq!(from, id);
        assert_eq!(event, WindowEvent::Close);
        assert!(thread.with_window(id, |window| window.should_close()).unwrap());
    }

    #[test]
    fn test_destroy_window() {
        let (thread, driver) = spawn_headless();
        let id = thread.create_window(WindowBuilder::new()).unwrap();

        thread.destroy_window(id).unwrap();
        assert_eq!(driver.live_windows(), 0);
        assert!(matches!(thread.destroy_window(id), Err(WindowError::UnknownWindow(_))));
        assert!(matches!(
            thread.with_window(id, |window| window.title()),
            Err(WindowError::UnknownWindow(_))
        ));
    }

    #[test]
    fn test_creation_error_reaches_requester() {
        let (thread, driver) = spawn_headless();
        driver.fail_next_creation("no display");

        let error = thread.create_window(WindowBuilder::new()).unwrap_err();
        assert!(matches!(error, WindowError::CreationFailed(ref reason) if reason == "no display"));
    }

    #[test]
    fn test_timeout_on_busy_thread_does_not_leak() {
        let (thread, driver) = spawn_headless();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        thread
            .send(Command::Run(Box::new(move |_| {
                let _ = started_tx.send(());
                let _ = release_rx.recv();
            })))
            .unwrap();
        started_rx.recv().unwrap();

        let pending = thread.request_window(WindowBuilder::new()).unwrap();
        let result = pending.wait(Duration::from_millis(20));
        assert!(matches!(result, Err(WindowError::Timeout(_))));

        release_tx.send(()).unwrap();
        assert!(thread.window_ids().unwrap().is_empty());
        assert_eq!(driver.live_windows(), 0);
    }

    #[test]
    fn test_cancel_after_delivery_destroys_window() {
        let (thread, driver) = spawn_headless();
        let pending = thread.request_window(WindowBuilder::new()).unwrap();

        // Any later round trip guarantees the create command ran
        thread.window_ids().unwrap();
        assert!(pending.is_delivered());
        assert!(!pending.cancel());

        assert!(thread.window_ids().unwrap().is_empty());
        assert_eq!(driver.live_windows(), 0);
    }

    #[test]
    fn test_dropped_request_does_not_leak() {
        let (thread, driver) = spawn_headless();
        drop(thread.request_window(WindowBuilder::new()).unwrap());

        assert!(thread.window_ids().unwrap().is_empty());
        assert!(thread.window_ids().unwrap().is_empty());
        assert_eq!(driver.live_windows(), 0);
    }

    #[test]
    fn test_init_failure_is_reported() {
        let result = WindowThread::spawn(EventLoopConfig::default(), || {
            Err(WindowError::InitializationFailed("no display".to_string()))
        });
        assert!(matches!(result, Err(WindowError::InitializationFailed(_))));
    }

    #[test]
    fn test_shutdown_destroys_windows() {
        let (thread, driver) = spawn_headless();
        thread.create_window(WindowBuilder::new()).unwrap();
        thread
            .create_window(WindowBuilder::new().size(Extent2D::new(10, 10)))
            .unwrap();
        assert_eq!(driver.live_windows(), 2);

        thread.shutdown();
        assert_eq!(driver.live_windows(), 0);
    }

    #[test]
    fn test_thread_keeps_polling() {
        let (thread, driver) = spawn_headless();
        assert_eq!(thread.poll_interval(), Duration::from_secs(1) / 500);

        let start = driver.polls();
        thread::sleep(Duration::from_millis(50));
        assert!(driver.polls() > start);
    }

    #[test]
    fn test_interval_falls_back_to_monitor_rate() {
        let platform = HeadlessPlatform::new().with_refresh_rate(120);
        let thread = WindowThread::spawn(EventLoopConfig::default(), move || {
            Ok(Context::with_platform(platform))
        })
        .unwrap();
        assert_eq!(thread.poll_interval(), Duration::from_secs(1) / 120);
    }
}
