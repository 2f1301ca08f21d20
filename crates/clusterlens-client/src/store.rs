//! Single source of truth for the active cluster connection
//!
//! The store owns the current [`ConnectionSettings`], persists them through
//! an injected [`SettingsStorage`], and announces every change on a
//! replay-one broadcast. A prior session is restored once at construction.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::broadcast::{SettingsBroadcast, SettingsChangeListener, SubscriptionId};
use crate::error::{ClientError, Result};
use crate::settings::ConnectionSettings;
use crate::storage::{SETTINGS_KEY, SettingsStorage};

/// Connection settings store
pub struct SettingsStore {
    storage: Arc<dyn SettingsStorage>,
    current: RwLock<Option<ConnectionSettings>>,
    broadcast: SettingsBroadcast,
}

impl SettingsStore {
    /// Create a store, restoring any settings persisted by a prior session.
    ///
    /// An unreadable or corrupt stored value is discarded with a warning;
    /// the store then starts unconfigured.
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        let restored = match storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<ConnectionSettings>(&raw) {
                Ok(settings) => {
                    debug!(host = %settings.host, "restored connection settings");
                    Some(settings)
                }
                Err(e) => {
                    warn!("discarding unreadable stored settings: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("failed to read stored settings: {}", e);
                None
            }
        };

        let store = Self {
            storage,
            current: RwLock::new(restored.clone()),
            broadcast: SettingsBroadcast::new(),
        };

        if let Some(settings) = restored {
            store.broadcast.publish(settings);
        }

        store
    }

    /// Replace the active configuration.
    ///
    /// The candidate's credentials are reduced to a single shape (a complete
    /// api-key pair takes precedence over basic credentials), then the new
    /// settings are stored, persisted, and broadcast. Re-initializing always
    /// overwrites the previous configuration.
    pub fn initialize(&self, candidate: ConnectionSettings) -> Result<()> {
        if candidate.host.is_empty() {
            return Err(ClientError::MissingHost);
        }

        let settings = ConnectionSettings {
            host: candidate.host,
            auth: candidate.auth.and_then(|auth| auth.normalized()),
        };

        *self.write_guard() = Some(settings.clone());
        self.persist()?;
        self.broadcast.publish(settings);

        Ok(())
    }

    /// Whether a non-empty host is currently configured.
    pub fn has_active_host(&self) -> bool {
        self.current().is_some_and(|settings| !settings.host.is_empty())
    }

    /// The configured host with a single trailing `/` removed, `None` while
    /// unconfigured.
    pub fn effective_host(&self) -> Option<String> {
        self.current().map(|settings| settings.effective_host())
    }

    /// Authorization headers for the active credentials; empty when there
    /// are none.
    pub fn auth_headers(&self) -> HashMap<&'static str, String> {
        self.current()
            .map(|settings| settings.auth_headers())
            .unwrap_or_default()
    }

    /// Snapshot of the active settings.
    pub fn current(&self) -> Option<ConnectionSettings> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Write the active settings to storage under the session key.
    pub fn persist(&self) -> Result<()> {
        if let Some(settings) = self.current() {
            let raw = serde_json::to_string(&settings)?;
            self.storage.put(SETTINGS_KEY, &raw)?;
        }

        Ok(())
    }

    /// Attach a listener to the connection broadcast; the latest settings
    /// are replayed to it immediately.
    pub fn subscribe(&self, listener: Arc<dyn SettingsChangeListener>) -> SubscriptionId {
        self.broadcast.subscribe(listener)
    }

    /// Detach a previously subscribed listener.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcast.unsubscribe(id)
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<ConnectionSettings>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::FnSettingsListener;
    use crate::settings::AuthSettings;
    use crate::storage::MemorySettingsStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_with_memory() -> (Arc<MemorySettingsStorage>, SettingsStore) {
        let storage = Arc::new(MemorySettingsStorage::new());
        let store = SettingsStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_starts_unconfigured() {
        let (_, store) = store_with_memory();
        assert!(!store.has_active_host());
        assert_eq!(store.effective_host(), None);
        assert!(store.auth_headers().is_empty());
    }

    #[test]
    fn test_initialize_rejects_empty_host() {
        let (_, store) = store_with_memory();
        let result = store.initialize(ConnectionSettings::default());
        assert!(matches!(result, Err(ClientError::MissingHost)));
        assert!(!store.has_active_host());
    }

    #[test]
    fn test_initialize_stores_persists_and_broadcasts() {
        let (storage, store) = store_with_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        store.subscribe(Arc::new(FnSettingsListener::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })));

        store
            .initialize(ConnectionSettings::new("http://localhost:9200/"))
            .unwrap();

        assert!(store.has_active_host());
        assert_eq!(
            store.effective_host().as_deref(),
            Some("http://localhost:9200")
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let raw = storage.get(SETTINGS_KEY).unwrap().unwrap();
        let persisted: ConnectionSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.host, "http://localhost:9200/");
    }

    #[test]
    fn test_reinitialize_overwrites() {
        let (_, store) = store_with_memory();
        store
            .initialize(ConnectionSettings::new("http://first:9200"))
            .unwrap();
        store
            .initialize(
                ConnectionSettings::new("http://second:9200")
                    .with_auth(AuthSettings::basic("u", "p")),
            )
            .unwrap();

        let current = store.current().unwrap();
        assert_eq!(current.host, "http://second:9200");
        assert_eq!(store.auth_headers()["Authorization"], "Basic dTpw");
    }

    #[test]
    fn test_initialize_normalizes_credentials() {
        let (_, store) = store_with_memory();
        store
            .initialize(ConnectionSettings::new("http://x").with_auth(AuthSettings {
                username: Some("u".to_string()),
                password: Some("p".to_string()),
                api_key_id: Some("id".to_string()),
                api_key: Some("key".to_string()),
            }))
            .unwrap();

        let auth = store.current().unwrap().auth.unwrap();
        assert_eq!(auth, AuthSettings::api_key("id", "key"));
    }

    #[test]
    fn test_restores_prior_session_and_replays() {
        let storage = Arc::new(MemorySettingsStorage::new());
        {
            let store = SettingsStore::new(storage.clone());
            store
                .initialize(
                    ConnectionSettings::new("http://localhost:9200")
                        .with_auth(AuthSettings::api_key("id", "key")),
                )
                .unwrap();
        }

        let restored = SettingsStore::new(storage);
        assert!(restored.has_active_host());

        let seen = Arc::new(parking_lot::RwLock::new(None));
        let seen_clone = seen.clone();
        restored.subscribe(Arc::new(FnSettingsListener::new(move |settings| {
            *seen_clone.write() = Some(settings.host);
        })));
        assert_eq!(seen.read().as_deref(), Some("http://localhost:9200"));
    }

    #[test]
    fn test_corrupt_stored_settings_are_discarded() {
        let storage = Arc::new(MemorySettingsStorage::new());
        storage.put(SETTINGS_KEY, "not json").unwrap();

        let store = SettingsStore::new(storage);
        assert!(!store.has_active_host());
    }

    #[test]
    fn test_unsubscribe_detaches() {
        let (_, store) = store_with_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = store.subscribe(Arc::new(FnSettingsListener::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })));
        store.unsubscribe(id);

        store
            .initialize(ConnectionSettings::new("http://x"))
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
