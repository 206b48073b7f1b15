// Settings Commands
// Console-side editing of site settings and social links

use crate::models::{AppSettings, SettingsPatch, SitePatch, SocialLinkDraft, SocialLinkPatch};
use crate::services::{is_valid_url, SettingsStore};

/// Check every social link before a full save: labels must be non-empty and
/// hrefs must be http(s) URLs. Icon URLs may be empty.
pub fn validate_settings(settings: &AppSettings) -> Result<(), String> {
    for link in &settings.social {
        if link.label.trim().is_empty() {
            return Err("Every social link needs a label".to_string());
        }
        if !is_valid_url(&link.href) {
            return Err(format!("Invalid link: {}", link.href));
        }
    }
    Ok(())
}

pub fn show_settings(store: &SettingsStore) -> Result<String, String> {
    serde_json::to_string_pretty(&store.get_settings())
        .map_err(|e| format!("Failed to serialize settings: {e}"))
}

/// Validate and save a complete settings document
pub fn import_settings(store: &SettingsStore, json: &str) -> Result<AppSettings, String> {
    let settings: AppSettings =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse settings: {e}"))?;
    validate_settings(&settings)?;
    store
        .save_settings(&settings)
        .map_err(|e| format!("Failed to save settings: {e}"))?;
    Ok(settings)
}

pub fn update_site(store: &SettingsStore, patch: SitePatch) -> Result<(), String> {
    if patch.is_empty() {
        return Err("Nothing to update: pass --title, --subtitle or --avatar-url".to_string());
    }
    if let Some(url) = patch.avatar_url.as_deref() {
        if !url.is_empty() && !is_valid_url(url) {
            return Err(format!("Invalid avatar URL: {url}"));
        }
    }

    store
        .patch_settings(SettingsPatch {
            site: Some(patch),
            social: None,
        })
        .map_err(|e| format!("Failed to save settings: {e}"))
}

pub fn reset_settings(store: &SettingsStore) -> Result<(), String> {
    store
        .reset_settings()
        .map_err(|e| format!("Failed to reset settings: {e}"))
}

pub fn add_social(store: &SettingsStore, draft: SocialLinkDraft) -> Result<String, String> {
    if draft.label.trim().is_empty() {
        return Err("Social link label must not be empty".to_string());
    }
    if !is_valid_url(&draft.href) {
        return Err(format!("Invalid link: {}", draft.href));
    }

    store
        .add_social_link(draft)
        .map_err(|e| format!("Failed to add social link: {e}"))
}

pub fn remove_social(store: &SettingsStore, id: &str) -> Result<bool, String> {
    let existed = store.get_settings().social_link(id).is_some();
    store
        .remove_social_link(id)
        .map_err(|e| format!("Failed to remove social link: {e}"))?;
    Ok(existed)
}

pub fn update_social(store: &SettingsStore, id: &str, patch: SocialLinkPatch) -> Result<(), String> {
    if store.get_settings().social_link(id).is_none() {
        return Err(format!("No social link with id '{id}'"));
    }
    if let Some(href) = patch.href.as_deref() {
        if !is_valid_url(href) {
            return Err(format!("Invalid link: {href}"));
        }
    }

    store
        .update_social_link(id, patch)
        .map_err(|e| format!("Failed to update social link: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_settings() {
        let mut settings = AppSettings::default();
        assert!(validate_settings(&settings).is_ok());

        settings.social[0].href = "x.com".to_string();
        assert_eq!(validate_settings(&settings).unwrap_err(), "Invalid link: x.com");

        settings.social[0].href = "https://x.com".to_string();
        settings.social[1].label = "  ".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_add_social_rejects_invalid_href_without_writing() {
        let store = SettingsStore::in_memory();
        let result = add_social(
            &store,
            SocialLinkDraft {
                label: "Bad".to_string(),
                href: "ftp://x".to_string(),
                icon_url: String::new(),
            },
        );
        assert!(result.is_err());
        assert_eq!(store.get_settings(), AppSettings::default());
    }

    #[test]
    fn test_update_site_requires_fields() {
        let store = SettingsStore::in_memory();
        assert!(update_site(&store, SitePatch::default()).is_err());

        update_site(
            &store,
            SitePatch {
                avatar_url: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.get_settings().site.avatar_url.as_deref(), Some(""));
    }

    #[test]
    fn test_update_and_remove_social() {
        let store = SettingsStore::in_memory();
        assert!(update_social(&store, "missing", SocialLinkPatch::default()).is_err());

        update_social(
            &store,
            "x",
            SocialLinkPatch {
                label: Some("Twitter".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.get_settings().social[0].label, "Twitter");

        assert!(remove_social(&store, "x").unwrap());
        assert!(!remove_social(&store, "x").unwrap());
    }

    #[test]
    fn test_import_settings_round_trip() {
        let store = SettingsStore::in_memory();
        let json = show_settings(&store).unwrap();
        let imported = import_settings(&store, &json).unwrap();
        assert_eq!(imported, AppSettings::default());
        assert!(import_settings(&store, "{}").is_err());
    }
}
