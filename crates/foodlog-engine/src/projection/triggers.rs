//! Events that should cause a reconciliation pass, and the subscriptions
//! that listen for them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Why a pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The document source was edited.
    DocumentChanged,
    /// Another part of the document scrolled into view.
    ViewportChanged,
    /// The host finished rendering the document.
    RenderPass,
}

type Listener = Box<dyn FnMut(Trigger)>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Ids unsubscribed while their listener was taken out for a fire.
    removed: Vec<u64>,
    firing: bool,
}

/// Fans triggers out to subscribed listeners.
///
/// Listeners live as long as the [`Subscription`] returned for them; dropping
/// it unsubscribes. A listener may drop subscriptions or subscribe new
/// listeners while being fired; the hub is single-threaded.
#[derive(Clone, Default)]
pub struct TriggerHub {
    inner: Rc<RefCell<HubInner>>,
    /// Ids whose subscription was dropped while `inner` was borrowed.
    deferred: Rc<RefCell<Vec<u64>>>,
}

impl TriggerHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(Trigger) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        self.settle_deferred(&mut inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));
        Subscription {
            hub: Rc::downgrade(&self.inner),
            deferred: Rc::downgrade(&self.deferred),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        self.settle_deferred(&mut inner);
        inner
            .listeners
            .iter()
            .filter(|(id, _)| !inner.removed.contains(id))
            .count()
    }

    /// Calls every listener with `trigger`. Returns how many were called.
    ///
    /// A fire from inside a listener is ignored and returns 0.
    pub fn fire(&self, trigger: Trigger) -> usize {
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.firing {
                log::debug!("ignoring nested {trigger:?}");
                return 0;
            }
            self.settle_deferred(&mut inner);
            inner.firing = true;
            std::mem::take(&mut inner.listeners)
        };

        let mut called = 0;
        for (id, listener) in listeners.iter_mut() {
            let skip = {
                let mut inner = self.inner.borrow_mut();
                self.settle_deferred(&mut inner);
                inner.removed.contains(id)
            };
            if skip {
                continue;
            }
            listener(trigger);
            called += 1;
        }

        let mut inner = self.inner.borrow_mut();
        self.settle_deferred(&mut inner);
        // Listeners subscribed during the fire go after the existing ones.
        let added = std::mem::take(&mut inner.listeners);
        listeners.extend(added);
        let removed = std::mem::take(&mut inner.removed);
        listeners.retain(|(id, _)| !removed.contains(id));
        inner.listeners = listeners;
        inner.firing = false;
        called
    }

    /// Applies unsubscriptions that could not reach `inner` when they happened.
    fn settle_deferred(&self, inner: &mut HubInner) {
        let ids = std::mem::take(&mut *self.deferred.borrow_mut());
        for id in ids {
            unsubscribe(inner, id);
        }
    }
}

fn unsubscribe(inner: &mut HubInner, id: u64) {
    if inner.firing {
        inner.removed.push(id);
    } else {
        inner.listeners.retain(|(other, _)| *other != id);
    }
}

/// Keeps a listener subscribed; dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes its listener"]
pub struct Subscription {
    hub: Weak<RefCell<HubInner>>,
    deferred: Weak<RefCell<Vec<u64>>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        match hub.try_borrow_mut() {
            Ok(mut inner) => unsubscribe(&mut inner, self.id),
            Err(_) => {
                log::debug!("hub busy, deferring unsubscribe of listener {}", self.id);
                if let Some(deferred) = self.deferred.upgrade() {
                    deferred.borrow_mut().push(self.id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recorder() -> (Rc<RefCell<Vec<Trigger>>>, impl FnMut(Trigger) + 'static) {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        (seen, move |t| sink.borrow_mut().push(t))
    }

    #[test]
    fn fires_every_subscriber() {
        let hub = TriggerHub::new();
        let (a, la) = recorder();
        let (b, lb) = recorder();
        let _sa = hub.subscribe(la);
        let _sb = hub.subscribe(lb);

        assert_eq!(hub.fire(Trigger::DocumentChanged), 2);
        assert_eq!(*a.borrow(), vec![Trigger::DocumentChanged]);
        assert_eq!(*b.borrow(), vec![Trigger::DocumentChanged]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let hub = TriggerHub::new();
        let (seen, listener) = recorder();
        let sub = hub.subscribe(listener);
        hub.fire(Trigger::RenderPass);
        drop(sub);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.fire(Trigger::RenderPass), 0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn subscription_may_outlive_hub() {
        let hub = TriggerHub::new();
        let sub = hub.subscribe(|_| {});
        drop(hub);
        drop(sub);
    }

    #[test]
    fn listener_can_unsubscribe_another_mid_fire() {
        let hub = TriggerHub::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot = victim.clone();
        let _killer = hub.subscribe(move |_| {
            slot.borrow_mut().take();
        });
        let (seen, listener) = recorder();
        *victim.borrow_mut() = Some(hub.subscribe(listener));

        assert_eq!(hub.fire(Trigger::ViewportChanged), 1);
        assert!(seen.borrow().is_empty());
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn drop_while_hub_is_borrowed_unsubscribes_later() {
        let hub = TriggerHub::new();
        let (seen, listener) = recorder();
        let sub = hub.subscribe(listener);
        {
            let _held = hub.inner.borrow();
            drop(sub);
        }
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.fire(Trigger::RenderPass), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn nested_fire_is_ignored() {
        let hub = TriggerHub::new();
        let inner_hub = hub.clone();
        let nested = Rc::new(RefCell::new(None));
        let result = nested.clone();
        let _sub = hub.subscribe(move |_| {
            *result.borrow_mut() = Some(inner_hub.fire(Trigger::RenderPass));
        });
        assert_eq!(hub.fire(Trigger::DocumentChanged), 1);
        assert_eq!(*nested.borrow(), Some(0));
    }
}
