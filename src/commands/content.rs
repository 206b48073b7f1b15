// Content Commands
// Console workflows that combine the blog API with local state

use std::path::Path;

use crate::models::{PostDetailDto, SettingsPatch, SitePatch, SocialLinkPatch};
use crate::services::{sidebar_items, BlogApiClient, NavItem, SettingsStore, TokenStore};

/// Log in and remember the session token
pub async fn login(
    client: &BlogApiClient,
    tokens: &TokenStore,
    username: &str,
    password: &str,
) -> Result<(), String> {
    if username.trim().is_empty() || password.is_empty() {
        return Err("Username and password are required".to_string());
    }

    let token = client
        .login(username, password)
        .await
        .map_err(|e| format!("Login failed: {e}"))?;
    if token.is_empty() {
        return Err("Login failed: server returned an empty token".to_string());
    }

    tokens
        .set_token(&token)
        .map_err(|e| format!("Failed to store session token: {e}"))?;
    log::info!("Logged in as '{}'", username);
    Ok(())
}

pub fn logout(tokens: &TokenStore) -> Result<(), String> {
    tokens
        .clear_token()
        .map_err(|e| format!("Failed to clear session token: {e}"))
}

/// Fetch categories and derive the sidebar for `current_path`.
/// A failed category fetch still yields the fixed entries.
pub async fn navigation(
    client: &BlogApiClient,
    tokens: &TokenStore,
    current_path: &str,
) -> Vec<NavItem> {
    let categories = match client.get_all_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to load categories for sidebar: {}", e);
            Vec::new()
        }
    };
    sidebar_items(&categories, tokens.is_logged_in(), current_path)
}

/// Upload an image and use it as the site avatar
pub async fn upload_avatar(
    client: &BlogApiClient,
    store: &SettingsStore,
    file: &Path,
) -> Result<String, String> {
    let url = client
        .upload_image(file)
        .await
        .map_err(|e| format!("Avatar upload failed: {e}"))?;

    store
        .patch_settings(SettingsPatch {
            site: Some(SitePatch {
                avatar_url: Some(url.clone()),
                ..Default::default()
            }),
            social: None,
        })
        .map_err(|e| format!("Failed to save settings: {e}"))?;
    Ok(url)
}

/// Upload an image and use it as the icon of social link `id`
pub async fn upload_social_icon(
    client: &BlogApiClient,
    store: &SettingsStore,
    id: &str,
    file: &Path,
) -> Result<String, String> {
    if store.get_settings().social_link(id).is_none() {
        return Err(format!("No social link with id '{id}'"));
    }

    let url = client
        .upload_image(file)
        .await
        .map_err(|e| format!("Icon upload failed: {e}"))?;

    store
        .update_social_link(
            id,
            SocialLinkPatch {
                icon_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .map_err(|e| format!("Failed to save settings: {e}"))?;
    Ok(url)
}

/// Build a create-post body, requiring title, slug and content
pub fn new_post_body(title: &str, slug: &str, content: &str) -> Result<PostDetailDto, String> {
    if title.trim().is_empty() || slug.trim().is_empty() || content.trim().is_empty() {
        return Err("Title, slug and content are all required".to_string());
    }
    Ok(PostDetailDto {
        title: Some(title.to_string()),
        slug: Some(slug.to_string()),
        content: Some(content.to_string()),
        ..Default::default()
    })
}

/// Markdown snippet embedding an uploaded image
pub fn image_markdown(url: &str) -> String {
    format!("\n\n![image]({url})\n\n")
}

/// Markdown snippet embedding an uploaded video
pub fn video_markdown(url: &str) -> String {
    format!("\n\n@[video]({url})\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_new_post_body_requires_fields() {
        assert!(new_post_body("", "slug", "body").is_err());
        assert!(new_post_body("Title", " ", "body").is_err());

        let body = new_post_body("Title", "title", "# Title").unwrap();
        assert_eq!(body.slug.as_deref(), Some("title"));
        assert_eq!(body.id, None);
    }

    #[test]
    fn test_media_markdown() {
        assert_eq!(image_markdown("https://c/a.png"), "\n\n![image](https://c/a.png)\n\n");
        assert_eq!(video_markdown("https://c/v.mp4"), "\n\n@[video](https://c/v.mp4)\n\n");
    }

    #[tokio::test]
    async fn test_login_rejects_blank_credentials() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        let client = BlogApiClient::new("http://127.0.0.1:9", tokens.clone()).unwrap();

        assert!(login(&client, &tokens, " ", "pw").await.is_err());
        assert!(!tokens.is_logged_in());
    }

    #[tokio::test]
    async fn test_upload_icon_checks_link_before_uploading() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        let client = BlogApiClient::new("http://127.0.0.1:9", tokens).unwrap();
        let store = SettingsStore::in_memory();

        let err = upload_social_icon(&client, &store, "missing", Path::new("icon.png"))
            .await
            .unwrap_err();
        assert!(err.contains("missing"));
    }

    #[test]
    fn test_logout_clears_token() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        tokens.set_token("t").unwrap();
        logout(&tokens).unwrap();
        assert!(!tokens.is_logged_in());
    }
}
