//! Connection-change broadcast
//!
//! A replay-one multicast: the most recent published settings are cached and
//! delivered immediately to every new subscriber, then all later values
//! follow. Consumers only need to check for an empty host, never for a
//! "not yet configured" state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::settings::ConnectionSettings;

/// Trait for receiving connection-change notifications.
///
/// Implement this trait to be notified when the active connection settings
/// are replaced.
pub trait SettingsChangeListener: Send + Sync + 'static {
    /// Called with a snapshot of the new active settings.
    fn settings_changed(&self, settings: ConnectionSettings);
}

/// A simple listener that invokes a closure.
pub struct FnSettingsListener<F>
where
    F: Fn(ConnectionSettings) + Send + Sync + 'static,
{
    f: F,
}

impl<F> FnSettingsListener<F>
where
    F: Fn(ConnectionSettings) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SettingsChangeListener for FnSettingsListener<F>
where
    F: Fn(ConnectionSettings) + Send + Sync + 'static,
{
    fn settings_changed(&self, settings: ConnectionSettings) {
        (self.f)(settings);
    }
}

/// Handle returned by [`SettingsBroadcast::subscribe`], used to detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Replay-one listener registry with a last-value cell
pub struct SettingsBroadcast {
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn SettingsChangeListener>)>>,
    latest: RwLock<Option<ConnectionSettings>>,
    next_id: AtomicU64,
}

impl SettingsBroadcast {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            latest: RwLock::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Cache `settings` as the latest value and notify every listener in
    /// registration order.
    pub fn publish(&self, settings: ConnectionSettings) {
        *self.latest.write() = Some(settings.clone());

        // Snapshot the registry so listeners may subscribe/unsubscribe
        // from within their callback.
        let listeners: Vec<_> = self.listeners.read().clone();
        for (_, listener) in listeners {
            listener.settings_changed(settings.clone());
        }
    }

    /// Attach a listener. The latest published value, if any, is replayed to
    /// it immediately.
    pub fn subscribe(&self, listener: Arc<dyn SettingsChangeListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener.clone()));

        let latest = self.latest.read().clone();
        if let Some(settings) = latest {
            listener.settings_changed(settings);
        }

        id
    }

    /// Detach the listener registered under `id`.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.write().retain(|(sid, _)| *sid != id);
    }

    /// The most recently published settings, if any.
    pub fn latest(&self) -> Option<ConnectionSettings> {
        self.latest.read().clone()
    }
}

impl Default for SettingsBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
