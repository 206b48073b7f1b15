// Settings Model
// Site-wide display settings (title, avatar, social links)

use serde::{Deserialize, Serialize};

const DEFAULT_TITLE: &str = "Kris Magic";
const DEFAULT_SUBTITLE: &str = "Blog & Notes";

const X_ICON_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e1/X_logo_2023.svg/1200px-X_logo_2023.svg.png";
const YOUTUBE_ICON_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/4/42/YouTube_icon_%282013-2017%29.png";
const GITHUB_ICON_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/9/91/Octicons-mark-github.svg";

/// Site header shown at the top of the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    /// Display name
    pub title: String,
    /// Tagline under the title
    pub subtitle: String,
    /// Absolute avatar URL; empty or None falls back to the bundled image
    pub avatar_url: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            avatar_url: Some(String::new()),
        }
    }
}

impl SiteInfo {
    /// Avatar URL to render, or None when the fallback image should be used
    pub fn effective_avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// One outbound link rendered as an icon in the sidebar footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    #[serde(default)]
    pub id: String,
    /// Hover text and accessible name
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub href: String,
    /// Icon image URL; empty means the UI supplies a fallback
    #[serde(default)]
    pub icon_url: String,
}

impl SocialLink {
    fn builtin(id: &str, label: &str, href: &str, icon_url: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            href: href.to_string(),
            icon_url: icon_url.to_string(),
        }
    }

    /// Merge the fields present in `patch` onto this link, keeping the id
    pub fn apply(&mut self, patch: &SocialLinkPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(href) = &patch.href {
            self.href = href.clone();
        }
        if let Some(icon_url) = &patch.icon_url {
            self.icon_url = icon_url.clone();
        }
    }
}

/// A social link before it has been assigned an id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkDraft {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon_url: String,
}

impl SocialLinkDraft {
    pub fn into_link(self, id: String) -> SocialLink {
        SocialLink {
            id,
            label: self.label,
            href: self.href,
            icon_url: self.icon_url,
        }
    }
}

/// Partial update for a single social link
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Partial update for the site header
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl SitePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.avatar_url.is_none()
    }
}

/// Partial update for the whole settings value.
/// `site` merges field by field; `social` replaces the list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SitePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<Vec<SocialLink>>,
}

/// Application display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub site: SiteInfo,
    pub social: Vec<SocialLink>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            social: vec![
                SocialLink::builtin("x", "X", "https://x.com", X_ICON_URL),
                SocialLink::builtin("youtube", "YouTube", "https://youtube.com", YOUTUBE_ICON_URL),
                SocialLink::builtin("github", "GitHub", "https://github.com", GITHUB_ICON_URL),
                SocialLink::builtin("magic", "Magic Hat", "https://www.sunqixian.xyz", ""),
            ],
        }
    }
}

impl AppSettings {
    /// Return a copy with `patch` merged in
    pub fn patched(&self, patch: SettingsPatch) -> Self {
        let mut site = self.site.clone();
        if let Some(site_patch) = patch.site {
            if let Some(title) = site_patch.title {
                site.title = title;
            }
            if let Some(subtitle) = site_patch.subtitle {
                site.subtitle = subtitle;
            }
            if let Some(avatar_url) = site_patch.avatar_url {
                site.avatar_url = Some(avatar_url);
            }
        }

        Self {
            site,
            social: patch.social.unwrap_or_else(|| self.social.clone()),
        }
    }

    pub fn social_link(&self, id: &str) -> Option<&SocialLink> {
        self.social.iter().find(|link| link.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_shape() {
        let settings = AppSettings::default();
        assert_eq!(settings.site.title, "Kris Magic");
        assert_eq!(settings.site.subtitle, "Blog & Notes");
        assert_eq!(settings.site.effective_avatar_url(), None);

        let ids: Vec<&str> = settings.social.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "youtube", "github", "magic"]);
        assert!(settings.social[3].icon_url.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(AppSettings::default()).unwrap();
        assert!(value["site"].get("avatarUrl").is_some());
        assert!(value["social"][0].get("iconUrl").is_some());
    }

    #[test]
    fn test_patched_merges_site_and_keeps_social() {
        let base = AppSettings::default();
        let next = base.patched(SettingsPatch {
            site: Some(SitePatch {
                subtitle: Some("Notes".to_string()),
                ..Default::default()
            }),
            social: None,
        });

        assert_eq!(next.site.title, base.site.title);
        assert_eq!(next.site.subtitle, "Notes");
        assert_eq!(next.site.avatar_url, base.site.avatar_url);
        assert_eq!(next.social, base.social);
    }

    #[test]
    fn test_patched_replaces_social_wholesale() {
        let base = AppSettings::default();
        let next = base.patched(SettingsPatch {
            site: None,
            social: Some(Vec::new()),
        });
        assert!(next.social.is_empty());
        assert_eq!(next.site, base.site);
    }

    #[test]
    fn test_link_apply_keeps_id() {
        let mut link = SocialLink::builtin("a", "A", "https://a", "");
        link.apply(&SocialLinkPatch {
            href: Some("https://b".to_string()),
            ..Default::default()
        });
        assert_eq!(link.id, "a");
        assert_eq!(link.label, "A");
        assert_eq!(link.href, "https://b");
    }

    #[test]
    fn test_effective_avatar_url() {
        let mut site = SiteInfo::default();
        site.avatar_url = Some("https://cdn.example/avatar.png".to_string());
        assert_eq!(site.effective_avatar_url(), Some("https://cdn.example/avatar.png"));
        site.avatar_url = None;
        assert_eq!(site.effective_avatar_url(), None);
    }
}
