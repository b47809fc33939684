use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

/// Listeners a manager notifies after it commits new state.
pub struct Subscribers<S> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<S> fmt::Debug for Subscribers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S> Subscribers<S> {
    pub fn subscribe(&mut self, listener: impl FnMut(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, state: &S) {
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn notifies_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::<u32>::default();

        let first = Rc::clone(&seen);
        subscribers.subscribe(move |value| first.borrow_mut().push(("first", *value)));
        let second = Rc::clone(&seen);
        subscribers.subscribe(move |value| second.borrow_mut().push(("second", *value)));

        subscribers.notify(&7);
        assert_eq!(*seen.borrow(), [("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = Subscribers::<()>::default();

        let counter = Rc::clone(&count);
        let id = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);
        let counter = Rc::clone(&count);
        subscribers.subscribe(move |_| *counter.borrow_mut() += 10);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(&());

        assert_eq!(*count.borrow(), 10);
        assert_eq!(subscribers.len(), 1);
        assert!(!subscribers.is_empty());
    }
}
