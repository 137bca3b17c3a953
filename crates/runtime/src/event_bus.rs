/// Token returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// Single-threaded, typed notification channel.
///
/// Listeners run synchronously in subscription order.
pub struct EventBus<T> {
    next_id: u64,
    listeners: Vec<(Subscription, Listener<T>)>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let sub = Subscription(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((sub, Box::new(listener)));
        sub
    }

    /// Returns `true` if the subscription was still registered.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != sub);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &T) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_events_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let a = Rc::clone(&seen);
        bus.subscribe(move |v: &u32| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        bus.subscribe(move |v: &u32| b.borrow_mut().push(("b", *v)));

        bus.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let sub = bus.subscribe(move |_: &()| *c.borrow_mut() += 1);

        bus.emit(&());
        assert!(bus.unsubscribe(sub));
        assert!(!bus.unsubscribe(sub));
        bus.emit(&());
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
