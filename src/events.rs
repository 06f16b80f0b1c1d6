//! Controller event stream
//!
//! Subscribers are called synchronously, in subscription order, within the
//! same event-loop turn as the change that produced the event. Callbacks must
//! not call back into the controller.

use serde::Serialize;

use crate::playback::PlaybackStatus;
use crate::regions::ComplianceRegion;

/// A state change pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    StatusChanged {
        from: PlaybackStatus,
        to: PlaybackStatus,
    },
    LoadProgress {
        percent: f64,
    },
    DurationKnown {
        duration_seconds: f64,
    },
    PositionChanged {
        position_seconds: f64,
    },
    ZoomChanged {
        pixels_per_second: f64,
    },
    RegionAdded {
        id: String,
    },
    RegionRemoved {
        id: String,
    },
    RegionResized {
        id: String,
        start_seconds: f64,
        end_seconds: f64,
    },
    RegionsCleared,
    /// A provisional region failed validation once the duration was known
    RegionRejected {
        region: ComplianceRegion,
        reason: String,
    },
    /// Load or runtime failure folded into the Error status
    Failed {
        message: String,
    },
    Disposed,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ControllerEvent)>;

/// Fan-out of controller events to subscribers
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ControllerEvent) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription did not exist
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: ControllerEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
