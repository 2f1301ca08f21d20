//! clusterlens-client - connection layer for a search-cluster monitoring tool
//!
//! This crate provides:
//! - A settings store owning the active connection configuration (host +
//!   credentials), with session persistence behind a storage trait
//! - Authorization-header derivation for basic and api-key credentials
//! - A replay-one broadcast announcing connection changes to consumers
//! - An HTTP client for the cluster's liveness check and task listing

pub mod broadcast;
pub mod client;
pub mod error;
pub mod model;
pub mod settings;
pub mod storage;
pub mod store;

pub use broadcast::{
    FnSettingsListener, SettingsBroadcast, SettingsChangeListener, SubscriptionId,
};
pub use client::{ClientConfig, ClusterClient};
pub use error::{ClientError, Result};
pub use model::{ClusterInfo, ClusterVersion, NodeTasks, TaskGroupBy, TaskInfo, TaskListResponse};
pub use settings::{AuthSettings, ConnectionSettings};
pub use storage::{FileSettingsStorage, MemorySettingsStorage, SETTINGS_KEY, SettingsStorage};
pub use store::SettingsStore;
