// SettingsStore Service
// Persists site display settings and notifies listeners when they change

use std::sync::{Arc, Mutex, OnceLock};

use chrono::Utc;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{
    AppSettings, SettingsPatch, SiteInfo, SocialLink, SocialLinkDraft, SocialLinkPatch,
};
use crate::services::events::{EventBus, Subscription};
use crate::services::storage::{KeyValueStorage, MemoryStorage, StorageError};

/// Storage key holding the JSON-serialized settings
pub const SETTINGS_STORAGE_KEY: &str = "app_settings_v1";

/// Event published after every successful settings write. Carries no payload.
pub const SETTINGS_UPDATED_EVENT: &str = "app-settings-updated";

static URL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Loose URL check used by editors before they allow a save.
/// The store itself never calls this.
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN
        .get_or_init(|| Regex::new(r"(?i)^https?://.+").ok())
        .as_ref()
        .map(|re| re.is_match(url))
        .unwrap_or(false)
}

/// Owns the canonical `AppSettings`.
///
/// Every mutating call persists the complete resulting value and then
/// publishes exactly one `SETTINGS_UPDATED_EVENT` on the store's bus. The
/// event is delivered synchronously after the write, so a listener calling
/// `get_settings` always sees the new value. When the store has no backend,
/// reads return defaults and writes are silent no-ops.
pub struct SettingsStore {
    storage: Option<Arc<dyn KeyValueStorage>>,
    events: EventBus,
    // Serializes read-modify-write sequences; never held while listeners run
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Create a store persisting to `storage` and publishing on `events`
    pub fn new(storage: Arc<dyn KeyValueStorage>, events: EventBus) -> Self {
        Self {
            storage: Some(storage),
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store for contexts with no persistent storage
    pub fn without_storage(events: EventBus) -> Self {
        Self {
            storage: None,
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store over fresh in-memory storage and a private bus
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), EventBus::new())
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Register a listener for settings changes.
    /// Listeners receive no payload and should call `get_settings` themselves.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events
            .subscribe(SETTINGS_UPDATED_EVENT, move |_payload| listener())
    }

    /// Read the current settings. Never fails: missing or malformed data
    /// degrades to defaults.
    pub fn get_settings(&self) -> AppSettings {
        let Some(storage) = &self.storage else {
            return AppSettings::default();
        };

        match storage.get_item(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => parse_settings(&raw),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                log::warn!("Failed to read settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Replace the stored settings with `next` and notify listeners
    pub fn save_settings(&self, next: &AppSettings) -> Result<(), StorageError> {
        let persisted = {
            let _guard = self.lock_writes();
            self.write(next)?
        };
        if persisted {
            self.notify();
        }
        Ok(())
    }

    /// Merge `patch` onto the current settings and save the result
    pub fn patch_settings(&self, patch: SettingsPatch) -> Result<(), StorageError> {
        self.mutate(|current| current.patched(patch))?;
        Ok(())
    }

    /// Restore the hard-coded defaults
    pub fn reset_settings(&self) -> Result<(), StorageError> {
        self.save_settings(&AppSettings::default())
    }

    /// Append a new social link and return its generated id
    pub fn add_social_link(&self, draft: SocialLinkDraft) -> Result<String, StorageError> {
        let mut assigned = String::new();
        self.mutate(|mut current| {
            let id = generate_link_id(&current.social);
            assigned = id.clone();
            current.social.push(draft.into_link(id));
            current
        })?;

        log::info!("Added social link '{}'", assigned);
        Ok(assigned)
    }

    /// Remove the link with `id`. A missing id leaves the list unchanged.
    pub fn remove_social_link(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|mut current| {
            current.social.retain(|link| link.id != id);
            current
        })?;
        Ok(())
    }

    /// Merge `patch` onto the link with `id` in place. A missing id leaves the list unchanged.
    pub fn update_social_link(&self, id: &str, patch: SocialLinkPatch) -> Result<(), StorageError> {
        self.mutate(|mut current| {
            if let Some(link) = current.social.iter_mut().find(|link| link.id == id) {
                link.apply(&patch);
            }
            current
        })?;
        Ok(())
    }

    fn mutate<F>(&self, change: F) -> Result<AppSettings, StorageError>
    where
        F: FnOnce(AppSettings) -> AppSettings,
    {
        let (next, persisted) = {
            let _guard = self.lock_writes();
            let next = change(self.get_settings());
            let persisted = self.write(&next)?;
            (next, persisted)
        };
        if persisted {
            self.notify();
        }
        Ok(next)
    }

    /// Write without notifying. Returns false when there is no backend.
    fn write(&self, settings: &AppSettings) -> Result<bool, StorageError> {
        let Some(storage) = &self.storage else {
            log::debug!("No settings storage available, skipping write");
            return Ok(false);
        };

        let content = serde_json::to_string(settings)?;
        storage.set_item(SETTINGS_STORAGE_KEY, &content)?;
        Ok(true)
    }

    fn notify(&self) {
        let delivered = self.events.publish(SETTINGS_UPDATED_EVENT, &Value::Null);
        log::debug!("Settings updated, notified {} listener(s)", delivered);
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse a stored settings blob, merging it over the defaults.
///
/// `site` fields present in the blob win over defaults; fields of the wrong
/// type and unknown fields are ignored. `social` is taken from the blob when
/// it is an array, otherwise the defaults are used.
pub fn parse_settings(raw: &str) -> AppSettings {
    let defaults = AppSettings::default();

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored settings are not valid JSON, using defaults: {}", e);
            return defaults;
        }
    };
    let Value::Object(map) = value else {
        log::warn!("Stored settings are not an object, using defaults");
        return defaults;
    };

    let site = match map.get("site") {
        Some(Value::Object(stored)) => merge_site(defaults.site, stored),
        _ => defaults.site,
    };

    let social = match map.get("social") {
        Some(Value::Array(items)) => parse_social(items),
        _ => defaults.social,
    };

    AppSettings { site, social }
}

fn merge_site(mut site: SiteInfo, stored: &Map<String, Value>) -> SiteInfo {
    if let Some(Value::String(title)) = stored.get("title") {
        site.title = title.clone();
    }
    if let Some(Value::String(subtitle)) = stored.get("subtitle") {
        site.subtitle = subtitle.clone();
    }
    match stored.get("avatarUrl") {
        Some(Value::String(url)) => site.avatar_url = Some(url.clone()),
        Some(Value::Null) => site.avatar_url = None,
        _ => {}
    }
    site
}

/// Read stored links field by field. Null or wrong-typed fields become empty
/// strings so the entry survives the next write; only non-object elements
/// are dropped.
fn parse_social(items: &[Value]) -> Vec<SocialLink> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(stored) => Some(SocialLink {
                id: string_field(stored, "id"),
                label: string_field(stored, "label"),
                href: string_field(stored, "href"),
                icon_url: string_field(stored, "iconUrl"),
            }),
            other => {
                log::warn!("Skipping social link entry that is not an object: {}", other);
                None
            }
        })
        .collect()
}

fn string_field(stored: &Map<String, Value>, key: &str) -> String {
    match stored.get(key) {
        Some(Value::String(value)) => value.clone(),
        _ => String::new(),
    }
}

/// `<unix millis>-<random hex>`, retried until unique within `existing`
fn generate_link_id(existing: &[SocialLink]) -> String {
    loop {
        let id = format!("{}-{:x}", Utc::now().timestamp_millis(), rand::random::<u64>());
        if !existing.iter().any(|link| link.id == id) {
            return id;
        }
    }
}
