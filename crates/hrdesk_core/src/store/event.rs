//! Change notifications delivered to store subscribers.

use crate::model::record::RecordId;
use log::debug;

/// One committed store change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added {
        id: RecordId,
    },
    Updated {
        id: RecordId,
    },
    Removed {
        id: RecordId,
    },
    /// Status labels before and after.
    Transitioned {
        id: RecordId,
        from: &'static str,
        to: &'static str,
    },
    SettingsChanged,
    Cleared,
    /// Collection replaced by a caller-provided batch.
    Replaced {
        count: usize,
    },
    /// Local state overwritten by a write from another handle.
    Rehydrated {
        revision: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Ordered listener registry; listeners run in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&mut self, namespace: &str, event: &StoreEvent) {
        debug!(
            "event=store_notify module=store status=ok namespace={namespace} listeners={}",
            self.listeners.len()
        );
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
