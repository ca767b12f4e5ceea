/// Account-level notifications published after a confirmed award, so any
/// interested surface can refresh without coupling to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    BalanceChanged { points_delta: i64, exp_delta: i64 },
    LevelChanged { old_level: u32, new_level: u32 },
}

/// Process-wide typed publish/subscribe bus. Single-threaded by design;
/// subscribers run inline on publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn Fn(&AccountEvent)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&AccountEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&self, event: &AccountEvent) {
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
