// Content Models
// Blog API data transfer objects (categories, posts, pages, comments)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl CategoryDto {
    /// Categories without a name or slug cannot be linked to and are skipped
    pub fn is_navigable(&self) -> bool {
        !self.name.is_empty() && !self.slug.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub name: String,
    pub email: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislike_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Full post. Every field is optional because the same shape doubles as the
/// create/update request body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislike_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentDto>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponseDto {
    pub likes: i64,
    pub dislikes: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Request body for category create/update; the server assigns ids
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRequest<'a> {
    pub name: &'a str,
    pub slug: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_summary_parses_optional_counts() {
        let json = serde_json::json!({
            "id": 7,
            "title": "Hello",
            "slug": "hello",
            "createdAt": "2024-05-01T10:00:00",
            "likeCount": 3
        });
        let post: PostSummaryDto = serde_json::from_value(json).unwrap();
        assert_eq!(post.like_count, Some(3));
        assert_eq!(post.view_count, None);
        assert_eq!(post.excerpt, None);
    }

    #[test]
    fn test_post_detail_body_skips_missing_fields() {
        let body = PostDetailDto {
            title: Some("T".to_string()),
            slug: Some("t".to_string()),
            content: Some("# T".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&body).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_category_navigable() {
        let category: CategoryDto =
            serde_json::from_value(serde_json::json!({ "id": 1, "name": "Blog" })).unwrap();
        assert!(!category.is_navigable());
        assert!(CategoryDto {
            id: None,
            name: "Blog".to_string(),
            slug: "blog".to_string(),
        }
        .is_navigable());
    }
}
