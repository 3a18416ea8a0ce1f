use crate::domain_model::SessionEvent;
use crate::domain_port::Navigator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// Typed observer registry over the closed set of [`SessionEvent`]s.
///
/// Dispatch is synchronous and follows registration order. Nothing is
/// buffered: a handler registered after an emission never sees it.
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<SessionEvent, Vec<EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A handler that panicked must not silence later session events.
    fn handlers(&self) -> MutexGuard<'_, HashMap<SessionEvent, Vec<EventHandler>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on(&self, event: SessionEvent, handler: EventHandler) {
        self.handlers().entry(event).or_default().push(handler);
    }

    /// Removes the registration holding this exact handler reference.
    /// Returns whether one was found.
    pub fn off(&self, event: SessionEvent, handler: &EventHandler) -> bool {
        let mut handlers = self.handlers();
        let Some(list) = handlers.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|h| Arc::ptr_eq(h, handler)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn emit(&self, event: SessionEvent) {
        // Snapshot so handlers may subscribe or unsubscribe while dispatching.
        let snapshot: Vec<EventHandler> =
            self.handlers().get(&event).cloned().unwrap_or_default();
        tracing::debug!(%event, listeners = snapshot.len(), "emitting session event");
        for handler in snapshot {
            handler();
        }
    }

    pub fn listener_count(&self, event: SessionEvent) -> usize {
        self.handlers().get(&event).map_or(0, Vec::len)
    }
}

/// Sends the user to `login_path` whenever the session ends.
///
/// Returns the installed handler so it can be passed back to [`EventBus::off`].
pub fn redirect_on_session_end(
    bus: &EventBus,
    navigator: Arc<dyn Navigator>,
    login_path: &str,
) -> EventHandler {
    let login_path = login_path.to_owned();
    let handler: EventHandler = Arc::new(move || navigator.navigate(&login_path));
    for event in SessionEvent::ALL {
        bus.on(event, handler.clone());
    }
    handler
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: &Arc<AtomicUsize>) -> EventHandler {
        let counter = counter.clone();
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn off_with_same_reference_stops_delivery() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&calls);

        bus.on(SessionEvent::SessionExpired, handler.clone());
        bus.emit(SessionEvent::SessionExpired);
        assert!(bus.off(SessionEvent::SessionExpired, &handler));
        bus.emit(SessionEvent::SessionExpired);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_ignores_a_different_reference_with_same_behavior() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let registered = counting_handler(&calls);
        let lookalike = counting_handler(&calls);

        bus.on(SessionEvent::RefreshFailed, registered);
        assert!(!bus.off(SessionEvent::RefreshFailed, &lookalike));
        bus.emit(SessionEvent::RefreshFailed);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatches_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            bus.on(
                SessionEvent::RefreshFailed,
                Arc::new(move || order.lock().unwrap().push(i)),
            );
        }

        bus.emit(SessionEvent::RefreshFailed);

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn events_are_routed_by_name() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.on(SessionEvent::SessionExpired, counting_handler(&calls));

        bus.emit(SessionEvent::RefreshFailed);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.listener_count(SessionEvent::SessionExpired), 1);
        assert_eq!(bus.listener_count(SessionEvent::RefreshFailed), 0);
    }

    #[test]
    fn redirect_listener_covers_both_events() {
        let bus = EventBus::new();
        let navigator = Arc::new(crate::infra::RecordingNavigator::new());
        let handler = redirect_on_session_end(&bus, navigator.clone(), "/login");

        bus.emit(SessionEvent::SessionExpired);
        bus.emit(SessionEvent::RefreshFailed);
        assert_eq!(navigator.visited(), vec!["/login".to_string(), "/login".to_string()]);

        for event in SessionEvent::ALL {
            assert!(bus.off(event, &handler));
        }
        bus.emit(SessionEvent::RefreshFailed);
        assert_eq!(navigator.visited().len(), 2);
    }

    #[test]
    fn late_subscribers_miss_past_events() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.emit(SessionEvent::SessionExpired);
        bus.on(SessionEvent::SessionExpired, counting_handler(&calls));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_can_unsubscribe_itself_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));

        let handler: EventHandler = {
            let bus = bus.clone();
            let calls = calls.clone();
            let slot = slot.clone();
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.lock().unwrap().take() {
                    bus.off(SessionEvent::SessionExpired, &me);
                }
            })
        };
        *slot.lock().unwrap() = Some(handler.clone());
        bus.on(SessionEvent::SessionExpired, handler);

        bus.emit(SessionEvent::SessionExpired);
        bus.emit(SessionEvent::SessionExpired);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keeps_delivering_after_lock_was_poisoned() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = bus.handlers.lock().unwrap();
            panic!("listener blew up");
        }));
        assert!(poisoned.is_err());
        assert!(bus.handlers.is_poisoned());

        bus.on(SessionEvent::SessionExpired, counting_handler(&calls));
        bus.emit(SessionEvent::SessionExpired);

        assert_eq!(bus.listener_count(SessionEvent::SessionExpired), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
