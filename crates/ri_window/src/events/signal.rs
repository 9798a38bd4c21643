//! Single-threaded signal with removable subscriptions
//!
//! Slots are stored in a slotmap so a `SubscriptionId` stays valid (and unique)
//! until it is disconnected, even while other slots come and go.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle returned by [`Signal::connect`], used to disconnect the slot later
    pub struct SubscriptionId;
}

type Slot<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Multicast notification source
///
/// Cloning a `Signal` yields another handle to the same slot list, which is how
/// bound window properties share a source with the code that emits into it.
pub struct Signal<T: 'static> {
    slots: Rc<RefCell<SlotMap<SubscriptionId, Slot<T>>>>,
}

impl<T: 'static> Signal<T> {
    /// Create a signal with no connected slots
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Connect a slot; it is called once for every subsequent emission
    pub fn connect<F>(&self, slot: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let slot: Slot<T> = Rc::new(RefCell::new(slot));
        self.slots.borrow_mut().insert(slot)
    }

    /// Disconnect a slot, returning whether it was still connected
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        self.slots.borrow_mut().remove(id).is_some()
    }

    /// Remove every slot
    pub fn disconnect_all(&self) {
        self.slots.borrow_mut().clear();
    }

    /// Whether `id` is currently connected
    pub fn is_connected(&self, id: SubscriptionId) -> bool {
        self.slots.borrow().contains_key(id)
    }

    /// Number of connected slots
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// True when nothing is connected
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Deliver `value` to every slot connected at the time of the call
    ///
    /// Slots may connect or disconnect (themselves or others) while running.
    /// Newly connected slots first fire on the next emission; a slot removed
    /// mid-emission is skipped if it has not run yet.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(SubscriptionId, Slot<T>)> = self
            .slots
            .borrow()
            .iter()
            .map(|(id, slot)| (id, Rc::clone(slot)))
            .collect();

        for (id, slot) in snapshot {
            if !self.is_connected(id) {
                continue;
            }
            match slot.try_borrow_mut() {
                Ok(mut slot) => (*slot)(value),
                Err(_) => log::warn!("Skipping re-entrant emission into slot {:?}", id),
            }
        }
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("slots", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_every_slot_receives_emission_once() {
        let signal = Signal::<u32>::new();
        let total = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let total = Rc::clone(&total);
            signal.connect(move |value| total.set(total.get() + value));
        }

        signal.emit(&5);
        assert_eq!(total.get(), 15);
    }

    #[test]
    fn test_disconnect() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = signal.connect(move |_| counter.set(counter.get() + 1));

        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(&());
        assert_eq!(hits.get(), 0);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_connect_during_emit_fires_next_time() {
        let signal = Signal::<()>::new();
        let late_hits = Rc::new(Cell::new(0));

        let handle = signal.clone();
        let late = Rc::clone(&late_hits);
        signal.connect(move |_| {
            let late = Rc::clone(&late);
            handle.connect(move |_| late.set(late.get() + 1));
        });

        signal.emit(&());
        assert_eq!(late_hits.get(), 0);
        assert_eq!(signal.len(), 2);

        signal.emit(&());
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_slot_removed_mid_emission_is_skipped() {
        let signal = Signal::<()>::new();
        let second_hits = Rc::new(Cell::new(0));
        let victim = Rc::new(Cell::new(None));

        let handle = signal.clone();
        let target = Rc::clone(&victim);
        signal.connect(move |_| {
            if let Some(id) = target.get() {
                handle.disconnect(id);
            }
        });
        let counter = Rc::clone(&second_hits);
        let id = signal.connect(move |_| counter.set(counter.get() + 1));
        victim.set(Some(id));

        signal.emit(&());
        assert_eq!(second_hits.get(), 0);
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn test_clones_share_slots() {
        let signal = Signal::<i32>::new();
        let copy = signal.clone();
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        signal.connect(move |v| sink.set(*v));

        copy.emit(&42);
        assert_eq!(seen.get(), 42);
    }
}
