use std::sync::{Arc, Mutex};

use cyclarb::port::outbound::notifier::{Event, Notifier};

/// Thread-safe event collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("lock notifier events").clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn cycles(&self) -> usize {
        self.count(|e| matches!(e, Event::CycleCompleted(_)))
    }

    pub fn trades(&self) -> usize {
        self.count(|e| matches!(e, Event::TradeRecorded(_)))
    }

    pub fn transitions(&self) -> usize {
        self.count(|e| matches!(e, Event::CircuitBreakerTransitioned { .. }))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events
            .lock()
            .expect("lock notifier events")
            .push(event);
    }
}
