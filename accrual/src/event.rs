//! Events emitted by the coordinator for indexers and other observers.

use drip_types::{AccountId, Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
///
/// Events are emitted only after an operation has fully committed; a failed
/// operation emits nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The global rate was lowered.
    GlobalRateChanged { rate: Rate },
    /// Accrued interest was realized into principal.
    Settled {
        account: AccountId,
        increase: u128,
        at: Timestamp,
    },
    /// New principal was created at a snapshotted rate.
    Minted {
        to: AccountId,
        amount: u128,
        rate: Rate,
    },
    /// Principal was destroyed.
    Burned { from: AccountId, amount: u128 },
    /// Principal moved between accounts.
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: u128,
    },
    /// `spender` may move up to `amount` out of `owner`'s balance.
    Approved {
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast to
/// avoid stalling ledger operations.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn emit_all(&self, events: &[LedgerEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_: &LedgerEvent| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_: &LedgerEvent| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&LedgerEvent::GlobalRateChanged {
            rate: Rate::from_raw(5),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::default();
        bus.emit(&LedgerEvent::Burned {
            from: AccountId::new("alice"),
            amount: 1,
        });
        assert!(bus.listeners.is_empty());
    }

    #[test]
    fn emit_all_preserves_order() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let s = Arc::clone(&seen);
        bus.subscribe(Box::new(move |event: &LedgerEvent| {
            s.lock().unwrap().push(event.clone());
        }));

        let events = vec![
            LedgerEvent::Settled {
                account: AccountId::new("alice"),
                increase: 3,
                at: Timestamp::new(9),
            },
            LedgerEvent::Burned {
                from: AccountId::new("alice"),
                amount: 13,
            },
        ];
        bus.emit_all(&events);
        assert_eq!(*seen.lock().unwrap(), events);
    }
}
