//! # Storage-Sync Bus
//!
//! Change notifications for views that derive state from local storage.
//!
//! ## Two Streams
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storage-Sync Bus                                │
//! │                                                                         │
//! │   Tab A                                  Tab B                          │
//! │   ─────                                  ─────                          │
//! │   set_item("syspharma_productos")                                       │
//! │      │                                                                  │
//! │      ├──► StorageHub ─── StorageEvent ──────────────► Subscription B    │
//! │      │    (shared)       (skipped for Tab A: the                        │
//! │      │                    writer never sees its own)                    │
//! │      │                                                                  │
//! │   trigger_update()                                                      │
//! │      │                                                                  │
//! │      └──► Tab A channel ─── localStorageUpdated ───► Subscription A    │
//! │           (same tab only)                                              │
//! │                                                                         │
//! │   Subscriptions drop storage events whose key lacks "syspharma_".      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dispatch is synchronous: `trigger_update()` has already enqueued the
//! event for every live subscription when it returns. No debounce.
//!
//! ## Usage
//! ```rust
//! use syspharma_store::events::{StorageHub, SyncCounter};
//!
//! let hub = StorageHub::new(16);
//! let tab = hub.open_tab();
//! let mut productos_view = SyncCounter::new(tab.subscribe());
//!
//! tab.trigger_update();
//! assert_eq!(productos_view.poll(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, trace, warn};

use crate::keys;

/// Name of the custom same-tab event fired after every write.
pub const LOCAL_STORAGE_UPDATED: &str = "localStorageUpdated";

/// Name of the custom same-tab event the navbar fires to open the cart.
pub const OPEN_CART: &str = "openCart";

/// Name of the native cross-tab event.
pub const STORAGE: &str = "storage";

// =============================================================================
// Event Types
// =============================================================================

/// Identifies one browsing context (tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TabId(u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Native-style storage event, published on every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEvent {
    /// Key that changed; `None` when the whole storage was cleared.
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Tab that performed the write.
    pub origin: TabId,
    pub timestamp: DateTime<Utc>,
}

/// Custom same-tab events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CustomEvent {
    LocalStorageUpdated,
    OpenCart,
}

impl CustomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CustomEvent::LocalStorageUpdated => LOCAL_STORAGE_UPDATED,
            CustomEvent::OpenCart => OPEN_CART,
        }
    }
}

/// What a subscription delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Custom(CustomEvent),
    Storage(StorageEvent),
}

impl Notification {
    /// Event name as the front end knows it.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::Custom(e) => e.name(),
            Notification::Storage(_) => STORAGE,
        }
    }

    /// True for notifications that mean "stored data changed".
    pub fn is_data_change(&self) -> bool {
        matches!(
            self,
            Notification::Custom(CustomEvent::LocalStorageUpdated) | Notification::Storage(_)
        )
    }
}

// =============================================================================
// Storage Hub
// =============================================================================

/// Process-wide channel shared by every tab.
#[derive(Debug, Clone)]
pub struct StorageHub {
    inner: Arc<HubInner>,
}

#[derive(Debug)]
struct HubInner {
    storage_tx: broadcast::Sender<StorageEvent>,
    next_tab: AtomicU64,
    capacity: usize,
}

impl StorageHub {
    /// Creates a hub whose channels buffer `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (storage_tx, _) = broadcast::channel(capacity);
        StorageHub {
            inner: Arc::new(HubInner {
                storage_tx,
                next_tab: AtomicU64::new(1),
                capacity,
            }),
        }
    }

    /// Opens a new tab with its own same-tab event channel.
    pub fn open_tab(&self) -> TabBus {
        let id = TabId(self.inner.next_tab.fetch_add(1, Ordering::Relaxed));
        let (local_tx, _) = broadcast::channel(self.inner.capacity);
        debug!(tab = %id, "Tab opened");
        TabBus {
            id,
            hub: self.clone(),
            local_tx,
        }
    }

    fn publish(&self, event: StorageEvent) {
        // No receivers is fine: nobody else has the app open.
        let _ = self.inner.storage_tx.send(event);
    }
}

// =============================================================================
// Tab Bus
// =============================================================================

/// One tab's view of the bus.
///
/// Cloning shares the same tab identity and same-tab channel.
#[derive(Debug, Clone)]
pub struct TabBus {
    id: TabId,
    hub: StorageHub,
    local_tx: broadcast::Sender<CustomEvent>,
}

impl TabBus {
    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn hub(&self) -> &StorageHub {
        &self.hub
    }

    /// Dispatches `localStorageUpdated` to every subscription in this tab.
    ///
    /// Call after every write so derived state recomputes.
    pub fn trigger_update(&self) {
        trace!(tab = %self.id, "localStorageUpdated");
        self.dispatch(CustomEvent::LocalStorageUpdated);
    }

    /// Dispatches `openCart` to every subscription in this tab.
    pub fn open_cart(&self) {
        self.dispatch(CustomEvent::OpenCart);
    }

    fn dispatch(&self, event: CustomEvent) {
        let _ = self.local_tx.send(event);
    }

    /// Publishes a storage event on the shared hub, stamped with this tab.
    pub(crate) fn publish_storage(
        &self,
        key: Option<&str>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.hub.publish(StorageEvent {
            key: key.map(str::to_string),
            old_value,
            new_value,
            origin: self.id,
            timestamp: Utc::now(),
        });
    }

    /// Subscribes to this tab's custom events and other tabs' storage events.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            tab: self.id,
            local_rx: self.local_tx.subscribe(),
            storage_rx: self.hub.inner.storage_tx.subscribe(),
        }
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A live listener on both streams.
///
/// Only events sent after `subscribe()` are delivered. A subscription that
/// falls more than the channel capacity behind skips the missed events.
#[derive(Debug)]
pub struct Subscription {
    tab: TabId,
    local_rx: broadcast::Receiver<CustomEvent>,
    storage_rx: broadcast::Receiver<StorageEvent>,
}

impl Subscription {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Storage events from this tab, or for foreign keys, never arrive.
    fn accepts(&self, event: &StorageEvent) -> bool {
        event.origin != self.tab && event.key.as_deref().map(keys::is_app_key).unwrap_or(false)
    }

    /// Returns the next pending notification without waiting.
    pub fn try_next(&mut self) -> Option<Notification> {
        loop {
            match self.local_rx.try_recv() {
                Ok(event) => return Some(Notification::Custom(event)),
                Err(TryRecvError::Lagged(n)) => {
                    warn!(tab = %self.tab, skipped = n, "Custom event receiver lagged");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        loop {
            match self.storage_rx.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Notification::Storage(event)),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(n)) => {
                    warn!(tab = %self.tab, skipped = n, "Storage event receiver lagged");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once both channels are closed.
    pub async fn next(&mut self) -> Option<Notification> {
        let mut local_open = true;
        let mut storage_open = true;

        while local_open || storage_open {
            tokio::select! {
                res = self.local_rx.recv(), if local_open => match res {
                    Ok(event) => return Some(Notification::Custom(event)),
                    Err(RecvError::Lagged(n)) => {
                        warn!(tab = %self.tab, skipped = n, "Custom event receiver lagged");
                    }
                    Err(RecvError::Closed) => local_open = false,
                },
                res = self.storage_rx.recv(), if storage_open => match res {
                    Ok(event) if self.accepts(&event) => return Some(Notification::Storage(event)),
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        warn!(tab = %self.tab, skipped = n, "Storage event receiver lagged");
                    }
                    Err(RecvError::Closed) => storage_open = false,
                },
            }
        }

        None
    }
}

// =============================================================================
// Sync Counter
// =============================================================================

/// The counter a view's derived computations depend on.
///
/// Each delivered data-change notification bumps it exactly once; views
/// recompute when the value they last saw differs.
#[derive(Debug)]
pub struct SyncCounter {
    subscription: Subscription,
    count: u64,
}

impl SyncCounter {
    pub fn new(subscription: Subscription) -> Self {
        SyncCounter {
            subscription,
            count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Drains pending notifications and returns the updated count.
    pub fn poll(&mut self) -> u64 {
        while let Some(notification) = self.subscription.try_next() {
            if notification.is_data_change() {
                self.count += 1;
            }
        }
        self.count
    }

    /// Waits for the next data change and returns the updated count.
    ///
    /// Returns `None` once the bus is gone.
    pub async fn changed(&mut self) -> Option<u64> {
        loop {
            let notification = self.subscription.next().await?;
            if notification.is_data_change() {
                self.count += 1;
                return Some(self.count);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
