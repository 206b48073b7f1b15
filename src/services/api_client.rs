// Blog API Client Service
// Typed HTTP access to the remote blog backend (content, comments, auth, uploads)

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    CategoryDto, CategoryRequest, CommentDto, CreateCommentRequest, LikeResponseDto,
    LoginRequest, PageDto, PostDetailDto, PostSummaryDto,
};
use crate::services::token_store::TokenStore;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

/// Client for the blog backend. Requests carry `Authorization: Bearer <token>`
/// whenever the token store holds a session token.
pub struct BlogApiClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl BlogApiClient {
    pub fn new(base_url: &str, tokens: TokenStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.tokens.get_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn get_all_categories(&self) -> Result<Vec<CategoryDto>, ApiError> {
        send_json(self.request(Method::GET, "/api/categories")).await
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> Result<CategoryDto, ApiError> {
        let body = CategoryRequest { name, slug };
        send_json(self.request(Method::POST, "/api/categories").json(&body)).await
    }

    pub async fn update_category(&self, id: i64, name: &str, slug: &str) -> Result<CategoryDto, ApiError> {
        let body = CategoryRequest { name, slug };
        send_json(
            self.request(Method::PUT, &format!("/api/categories/{id}"))
                .json(&body),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn get_posts_by_category(&self, slug: &str) -> Result<Vec<PostSummaryDto>, ApiError> {
        let path = format!("/api/posts/category/{}", urlencoding::encode(slug));
        send_json(self.request(Method::GET, &path)).await
    }

    pub async fn get_post_detail(&self, slug: &str) -> Result<PostDetailDto, ApiError> {
        let path = format!("/api/posts/{}", urlencoding::encode(slug));
        send_json(self.request(Method::GET, &path)).await
    }

    pub async fn get_like_and_dislike_count(&self, slug: &str) -> Result<LikeResponseDto, ApiError> {
        let path = format!("/api/posts/{}/likes", urlencoding::encode(slug));
        send_json(self.request(Method::GET, &path)).await
    }

    /// Vote on a post; `positive = false` records a dislike
    pub async fn post_like(&self, post_id: i64, positive: bool) -> Result<LikeResponseDto, ApiError> {
        send_json(
            self.request(Method::POST, &format!("/api/posts/{post_id}/like"))
                .query(&[("positive", positive)]),
        )
        .await
    }

    pub async fn create_post(
        &self,
        body: &PostDetailDto,
        category_slug: &str,
    ) -> Result<PostDetailDto, ApiError> {
        send_json(
            self.request(Method::POST, "/api/posts/create")
                .query(&[("categorySlug", category_slug)])
                .json(body),
        )
        .await
    }

    /// Create a post from a markdown file upload
    pub async fn create_post_from_md(
        &self,
        file: &Path,
        category_slug: &str,
    ) -> Result<PostDetailDto, ApiError> {
        let form = file_form(file).await?;
        send_json(
            self.request(Method::POST, "/api/posts/create-md")
                .query(&[("categorySlug", category_slug)])
                .multipart(form),
        )
        .await
    }

    pub async fn update_post(
        &self,
        id: i64,
        body: &PostDetailDto,
        category_slug: Option<&str>,
    ) -> Result<PostDetailDto, ApiError> {
        let builder = self.request(Method::PUT, &format!("/api/posts/update/{id}"));
        send_json(with_category(builder, category_slug).json(body)).await
    }

    pub async fn update_post_from_md(
        &self,
        id: i64,
        file: &Path,
        category_slug: Option<&str>,
    ) -> Result<PostDetailDto, ApiError> {
        let form = file_form(file).await?;
        let builder = self.request(Method::PUT, &format!("/api/posts/update-md/{id}"));
        send_json(with_category(builder, category_slug).multipart(form)).await
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub async fn get_page_by_slug(&self, slug: &str) -> Result<PageDto, ApiError> {
        let path = format!("/api/pages/{}", urlencoding::encode(slug));
        send_json(self.request(Method::GET, &path)).await
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn get_comments(&self, post_id: i64) -> Result<Vec<CommentDto>, ApiError> {
        send_json(self.request(Method::GET, &format!("/api/comments/post/{post_id}"))).await
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        body: &CreateCommentRequest,
    ) -> Result<CommentDto, ApiError> {
        send_json(
            self.request(Method::POST, &format!("/api/comments/post/{post_id}"))
                .json(body),
        )
        .await
    }

    /// Delete a comment; the backend checks `email` against the one used to create it
    pub async fn delete_comment(&self, comment_id: i64, email: &str) -> Result<CommentDto, ApiError> {
        send_json(
            self.request(Method::DELETE, &format!("/api/comments/{comment_id}"))
                .query(&[("email", email)]),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Exchange credentials for a bearer token. The token is returned, not stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest { username, password };
        send_text(self.request(Method::POST, "/login").json(&body)).await
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Upload an image and return its public URL
    pub async fn upload_image(&self, file: &Path) -> Result<String, ApiError> {
        let form = file_form(file).await?;
        send_text(
            self.request(Method::POST, "/api/posts/upload/image")
                .multipart(form),
        )
        .await
    }

    /// Upload a video and return its public URL
    pub async fn upload_video(&self, file: &Path) -> Result<String, ApiError> {
        let form = file_form(file).await?;
        send_text(
            self.request(Method::POST, "/api/posts/upload/video")
                .multipart(form),
        )
        .await
    }
}

fn with_category(builder: RequestBuilder, category_slug: Option<&str>) -> RequestBuilder {
    match category_slug {
        Some(slug) => builder.query(&[("categorySlug", slug)]),
        None => builder,
    }
}

async fn file_form(file: &Path) -> Result<Form, ApiError> {
    let bytes = tokio::fs::read(file).await?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Form::new().part("file", Part::bytes(bytes).file_name(file_name)))
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("Blog API request failed with {}: {}", status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let response = check_status(builder.send().await?).await?;
    Ok(response.json::<T>().await?)
}

/// Endpoints that answer with a bare string (token, upload URL)
async fn send_text(builder: RequestBuilder) -> Result<String, ApiError> {
    let response = check_status(builder.send().await?).await?;
    let text = response.text().await?;
    Ok(unwrap_text_body(&text))
}

/// Accept both `abc` and `"abc"` bodies
fn unwrap_text_body(text: &str) -> String {
    match serde_json::from_str::<String>(text) {
        Ok(value) => value,
        Err(_) => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;
    use std::sync::Arc;

    fn client_with_tokens() -> (BlogApiClient, TokenStore) {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        let client = BlogApiClient::new("http://api.test/", tokens.clone()).unwrap();
        (client, tokens)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let (client, _tokens) = client_with_tokens();
        assert_eq!(client.base_url(), "http://api.test");
        assert_eq!(client.url("/api/categories"), "http://api.test/api/categories");
    }

    #[test]
    fn test_bearer_header_follows_token_store() {
        let (client, tokens) = client_with_tokens();

        let anonymous = client.request(Method::GET, "/api/categories").build().unwrap();
        assert!(anonymous.headers().get("authorization").is_none());

        tokens.set_token("tok123").unwrap();
        let authed = client.request(Method::GET, "/api/categories").build().unwrap();
        assert_eq!(
            authed.headers().get("authorization").unwrap(),
            "Bearer tok123"
        );
    }

    #[test]
    fn test_query_parameters() {
        let (client, _tokens) = client_with_tokens();

        let like = client
            .request(Method::POST, "/api/posts/5/like")
            .query(&[("positive", false)])
            .build()
            .unwrap();
        assert_eq!(like.url().as_str(), "http://api.test/api/posts/5/like?positive=false");

        let update = with_category(client.request(Method::PUT, "/api/posts/update/5"), None)
            .build()
            .unwrap();
        assert_eq!(update.url().query(), None);

        let update = with_category(
            client.request(Method::PUT, "/api/posts/update/5"),
            Some("my shares"),
        )
        .build()
        .unwrap();
        assert_eq!(update.url().query(), Some("categorySlug=my+shares"));
    }

    #[test]
    fn test_unwrap_text_body() {
        assert_eq!(unwrap_text_body("\"abc\""), "abc");
        assert_eq!(unwrap_text_body("abc\n"), "abc");
        assert_eq!(
            unwrap_text_body("https://cdn.test/a.png"),
            "https://cdn.test/a.png"
        );
    }

    #[test]
    fn test_unauthorized_status() {
        let err = ApiError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
        assert!(!ApiError::Status {
            status: 500,
            body: String::new()
        }
        .is_unauthorized());
    }

    #[tokio::test]
    async fn test_file_form_reports_missing_file() {
        let result = file_form(Path::new("/definitely/not/here.png")).await;
        assert!(matches!(result, Err(ApiError::Io(_))));
    }
}
