//! Window event model
//!
//! Native callbacks are translated into [`WindowEvent`] values and re-published
//! through one [`Signal`] per event category. Every `connect` hands back a
//! [`Subscription`] that can later be passed to [`WindowSignals::disconnect`].

mod signal;

pub use signal::{Signal, SubscriptionId};

use crate::foundation::math::{Extent2D, Point2D};

/// Raw window event as delivered by the native layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked to close the window
    Close,
    /// The window's content area was resized (screen coordinates)
    Resize(Extent2D),
    /// The framebuffer was resized (pixels)
    FramebufferResize(Extent2D),
    /// The window was moved
    Move(Point2D),
    /// The window was maximized (`true`) or restored (`false`)
    Maximize(bool),
    /// The window gained (`true`) or lost (`false`) input focus
    Focus(bool),
    /// The window was minimized (`true`) or restored (`false`)
    Iconify(bool),
}

impl WindowEvent {
    /// Category used to route the event to its signal
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Close => EventKind::Close,
            Self::Resize(_) => EventKind::Resize,
            Self::FramebufferResize(_) => EventKind::FramebufferResize,
            Self::Move(_) => EventKind::Move,
            Self::Maximize(_) => EventKind::Maximize,
            Self::Focus(_) => EventKind::Focus,
            Self::Iconify(_) => EventKind::Iconify,
        }
    }
}

/// Event category, one per window signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Close requests
    Close,
    /// Content-area resizes
    Resize,
    /// Framebuffer resizes
    FramebufferResize,
    /// Position changes
    Move,
    /// Maximize/restore
    Maximize,
    /// Focus changes
    Focus,
    /// Minimize/restore
    Iconify,
    /// Every event, unfiltered
    Any,
}

/// Removable connection to one of a window's signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: SubscriptionId,
}

impl Subscription {
    /// Which signal this subscription belongs to
    pub const fn kind(&self) -> EventKind {
        self.kind
    }
}

/// The full set of signals a window publishes
#[derive(Debug, Default)]
pub struct WindowSignals {
    close: Signal<()>,
    resize: Signal<Extent2D>,
    framebuffer_resize: Signal<Extent2D>,
    moved: Signal<Point2D>,
    maximize: Signal<bool>,
    focus: Signal<bool>,
    iconify: Signal<bool>,
    any: Signal<WindowEvent>,
}

impl WindowSignals {
    /// Create a set of empty signals
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for close requests
    pub fn on_close<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut() + 'static,
    {
        let id = self.close.connect(move |_| slot());
        Subscription { kind: EventKind::Close, id }
    }

    /// Listen for content-area resizes
    pub fn on_resize<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(Extent2D) + 'static,
    {
        let id = self.resize.connect(move |size| slot(*size));
        Subscription { kind: EventKind::Resize, id }
    }

    /// Listen for framebuffer resizes
    pub fn on_framebuffer_resize<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(Extent2D) + 'static,
    {
        let id = self.framebuffer_resize.connect(move |size| slot(*size));
        Subscription { kind: EventKind::FramebufferResize, id }
    }

    /// Listen for position changes
    pub fn on_move<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(Point2D) + 'static,
    {
        let id = self.moved.connect(move |pos| slot(*pos));
        Subscription { kind: EventKind::Move, id }
    }

    /// Listen for maximize (`true`) / restore (`false`)
    pub fn on_maximize<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(bool) + 'static,
    {
        let id = self.maximize.connect(move |value| slot(*value));
        Subscription { kind: EventKind::Maximize, id }
    }

    /// Listen for focus gained (`true`) / lost (`false`)
    pub fn on_focus<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(bool) + 'static,
    {
        let id = self.focus.connect(move |value| slot(*value));
        Subscription { kind: EventKind::Focus, id }
    }

    /// Listen for minimize (`true`) / restore (`false`)
    pub fn on_iconify<F>(&self, mut slot: F) -> Subscription
    where
        F: FnMut(bool) + 'static,
    {
        let id = self.iconify.connect(move |value| slot(*value));
        Subscription { kind: EventKind::Iconify, id }
    }

    /// Listen for every event
    pub fn on_event<F>(&self, slot: F) -> Subscription
    where
        F: FnMut(&WindowEvent) + 'static,
    {
        let id = self.any.connect(slot);
        Subscription { kind: EventKind::Any, id }
    }

    /// Remove a subscription, returning whether it was still connected
    pub fn disconnect(&self, subscription: Subscription) -> bool {
        let id = subscription.id;
        match subscription.kind {
            EventKind::Close => self.close.disconnect(id),
            EventKind::Resize => self.resize.disconnect(id),
            EventKind::FramebufferResize => self.framebuffer_resize.disconnect(id),
            EventKind::Move => self.moved.disconnect(id),
            EventKind::Maximize => self.maximize.disconnect(id),
            EventKind::Focus => self.focus.disconnect(id),
            EventKind::Iconify => self.iconify.disconnect(id),
            EventKind::Any => self.any.disconnect(id),
        }
    }

    /// Number of listeners on one category
    pub fn listener_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Close => self.close.len(),
            EventKind::Resize => self.resize.len(),
            EventKind::FramebufferResize => self.framebuffer_resize.len(),
            EventKind::Move => self.moved.len(),
            EventKind::Maximize => self.maximize.len(),
            EventKind::Focus => self.focus.len(),
            EventKind::Iconify => self.iconify.len(),
            EventKind::Any => self.any.len(),
        }
    }

    /// Route one event to the catch-all signal and then to its category signal
    pub fn dispatch(&self, event: &WindowEvent) {
        self.any.emit(event);
        match *event {
            WindowEvent::Close => self.close.emit(&()),
            WindowEvent::Resize(size) => self.resize.emit(&size),
            WindowEvent::FramebufferResize(size) => self.framebuffer_resize.emit(&size),
            WindowEvent::Move(pos) => self.moved.emit(&pos),
            WindowEvent::Maximize(value) => self.maximize.emit(&value),
            WindowEvent::Focus(value) => self.focus.emit(&value),
            WindowEvent::Iconify(value) => self.iconify.emit(&value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_dispatch_routes_by_category() {
        let signals = WindowSignals::new();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let closes = Rc::new(Cell::new(0));

        let sink = Rc::clone(&sizes);
        signals.on_resize(move |size| sink.borrow_mut().push(size));
        let counter = Rc::clone(&closes);
        signals.on_close(move || counter.set(counter.get() + 1));

        signals.dispatch(&WindowEvent::Resize(Extent2D::new(640, 480)));
        signals.dispatch(&WindowEvent::Move(Point2D::new(1, 2)));
        signals.dispatch(&WindowEvent::Close);

        assert_eq!(*sizes.borrow(), vec![Extent2D::new(640, 480)]);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_catch_all_sees_everything() {
        let signals = WindowSignals::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        signals.on_event(move |event| sink.borrow_mut().push(event.kind()));

        signals.dispatch(&WindowEvent::Focus(true));
        signals.dispatch(&WindowEvent::Iconify(false));

        assert_eq!(*seen.borrow(), vec![EventKind::Focus, EventKind::Iconify]);
    }

    #[test]
    fn test_disconnect_uses_subscription_kind() {
        let signals = WindowSignals::new();
        let close = signals.on_close(|| {});
        let moved = signals.on_move(|_| {});

        assert_eq!(signals.listener_count(EventKind::Close), 1);
        assert!(signals.disconnect(close));
        assert!(!signals.disconnect(close));
        assert_eq!(signals.listener_count(EventKind::Close), 0);
        assert_eq!(signals.listener_count(EventKind::Move), 1);
        assert_eq!(moved.kind(), EventKind::Move);
    }
}
