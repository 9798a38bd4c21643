//! Native identity → window lookup used for event dispatch
//!
//! The registry holds weak references only. A `Window` owns its shared state;
//! once it drops, the entry dies with it and is pruned on the next pass. Moving
//! a `Window` value never touches the registry.

use crate::window::backend::NativeId;
use crate::window::WindowShared;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Default)]
pub(crate) struct WindowRegistry {
    entries: HashMap<NativeId, Weak<WindowShared>>,
}

impl WindowRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Track a window; a stale entry for a recycled native address is replaced
    pub(crate) fn register(&mut self, id: NativeId, shared: &Rc<WindowShared>) {
        if self.entries.insert(id, Rc::downgrade(shared)).is_some() {
            log::debug!("Replaced stale registry entry for {:?}", id);
        }
    }

    /// Drop entries whose window is gone, returning the survivors
    fn live(&mut self) -> Vec<Rc<WindowShared>> {
        let mut alive = Vec::with_capacity(self.entries.len());
        self.entries.retain(|id, weak| match weak.upgrade() {
            Some(shared) => {
                alive.push(shared);
                true
            }
            None => {
                log::debug!("Pruned destroyed window {:?}", id);
                false
            }
        });
        alive
    }

    /// Deliver every pending native event to the owning window's signals
    pub(crate) fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        for shared in self.live() {
            // Release the native borrow before slots run; they may call back in
            let events = shared.native.borrow_mut().drain_events();
            for event in &events {
                shared.signals.dispatch(event);
            }
            delivered += events.len();
        }
        delivered
    }

    pub(crate) fn len(&mut self) -> usize {
        self.live().len()
    }
}
