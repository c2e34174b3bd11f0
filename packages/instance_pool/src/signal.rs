use std::fmt;

/// A zero-argument notification that any number of listeners can subscribe to.
///
/// An [`InstancePool`][crate::InstancePool] owns one signal per observable event (size changed,
/// instance activated, instance deactivated). Listeners are called synchronously, in the order they
/// were connected, on the thread that performed the pool operation.
///
/// Listeners cannot borrow the pool that owns the signal, so a listener can never call pool
/// operations while the pool is in the middle of one. A listener that wants to react with further
/// pool operations records the event (e.g. sets a flag) and the owner of the pool acts on it after
/// the triggering call has returned.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use instance_pool::Signal;
///
/// let mut signal = Signal::new();
/// let calls = Rc::new(Cell::new(0));
///
/// let id = signal.connect({
///     let calls = Rc::clone(&calls);
///     move || calls.set(calls.get() + 1)
/// });
///
/// assert_eq!(signal.listener_count(), 1);
/// assert!(signal.disconnect(id));
/// assert!(!signal.disconnect(id));
/// ```
pub struct Signal {
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
    next_id: u64,
}

/// Identifies a listener connected to a [`Signal`], for later disconnection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerId(u64);

impl Signal {
    /// Creates a signal without any listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Connects a listener that will be called every time the signal is emitted.
    pub fn connect<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        let id = ListenerId(self.next_id);

        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("listener IDs cannot be exhausted by any realistic number of connections");

        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Disconnects a previously connected listener.
    ///
    /// Returns `false` if the listener was not connected (e.g. it was already disconnected).
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let Some(position) = self
            .listeners
            .iter()
            .position(|(listener_id, _)| *listener_id == id)
        else {
            return false;
        };

        drop(self.listeners.remove(position));
        true
    }

    /// The number of currently connected listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn emit(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Signal {
    #[cfg_attr(test, mutants::skip)] // Debug output has no behavior to verify beyond smoke tests.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listener_count", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use static_assertions::assert_not_impl_any;

    use super::*;

    assert_not_impl_any!(Signal: Send, Sync);

    #[test]
    fn emit_calls_listeners_in_connection_order() {
        let mut signal = Signal::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            signal.connect(move || log.borrow_mut().push(name));
        }

        signal.emit();

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn disconnected_listener_is_not_called() {
        let mut signal = Signal::new();
        let calls = Rc::new(RefCell::new(0_u32));

        let id = signal.connect({
            let calls = Rc::clone(&calls);
            move || *calls.borrow_mut() += 1
        });

        signal.emit();
        assert!(signal.disconnect(id));
        signal.emit();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn disconnect_twice_returns_false() {
        let mut signal = Signal::new();

        let first = signal.connect(|| {});
        let second = signal.connect(|| {});

        assert!(signal.disconnect(first));
        assert!(!signal.disconnect(first));
        assert_eq!(signal.listener_count(), 1);

        assert!(signal.disconnect(second));
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn emit_without_listeners_does_nothing() {
        let mut signal = Signal::default();

        signal.emit();

        assert_eq!(signal.listener_count(), 0);
    }
}
