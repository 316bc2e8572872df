// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::UserSummary;

/// Maximum number of media attachments accepted on a single post.
pub const MAX_MEDIA_ITEMS: usize = 4;

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub content: String,
    pub media: serde_json::Value,
    pub likes_count: i32,
    pub comments_count: i32,
    pub reposts_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub author_id: i32,
    pub content: String,
    pub media: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author-initiated edit; None fields are left untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostChanges {
    pub content: Option<String>,
    pub media: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

/// A single media attachment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Rejected post/comment input, mapped to a 400 at the API boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("post needs text content or at least one media attachment")]
    EmptyPost,
    #[error("comment content must not be empty")]
    EmptyComment,
    #[error("a post can carry at most {MAX_MEDIA_ITEMS} media attachments")]
    TooManyMedia,
    #[error("media attachment url must not be empty")]
    EmptyMediaUrl,
    #[error("update must include content or media")]
    EmptyUpdate,
}

/// A post needs text or media; media items need non-empty urls.
pub fn validate_post_input(content: &str, media: &[MediaItem]) -> Result<(), ValidationError> {
    if content.trim().is_empty() && media.is_empty() {
        return Err(ValidationError::EmptyPost);
    }
    if media.len() > MAX_MEDIA_ITEMS {
        return Err(ValidationError::TooManyMedia);
    }
    if media.iter().any(|item| item.url.trim().is_empty()) {
        return Err(ValidationError::EmptyMediaUrl);
    }
    Ok(())
}

pub fn validate_comment_input(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(())
}

/// An edit must touch at least one field, and whatever it touches follows
/// the creation rules. Blanking either field without new content arriving
/// in the other is rejected rather than checked against stored state.
pub fn validate_post_update(
    content: Option<&str>,
    media: Option<&[MediaItem]>,
) -> Result<(), ValidationError> {
    if content.is_none() && media.is_none() {
        return Err(ValidationError::EmptyUpdate);
    }
    if let Some(media) = media {
        if media.len() > MAX_MEDIA_ITEMS {
            return Err(ValidationError::TooManyMedia);
        }
        if media.iter().any(|item| item.url.trim().is_empty()) {
            return Err(ValidationError::EmptyMediaUrl);
        }
    }

    let supplies_text = content.map_or(false, |c| !c.trim().is_empty());
    let supplies_media = media.map_or(false, |m| !m.is_empty());
    let clears_text = content.is_some() && !supplies_text;
    let clears_media = media.is_some() && !supplies_media;
    if (clears_text || clears_media) && !supplies_text && !supplies_media {
        return Err(ValidationError::EmptyPost);
    }
    Ok(())
}

/// A post as served to clients: author identity joined in and membership
/// flags computed for the requesting viewer.
#[derive(Debug, Serialize)]
pub struct FeedPost {
    pub id: i32,
    pub author: UserSummary,
    pub content: String,
    pub media: serde_json::Value,
    pub likes_count: i32,
    pub comments_count: i32,
    pub reposts_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_liked: bool,
    pub is_reposted: bool,
    pub is_saved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str) -> MediaItem {
        MediaItem {
            url: url.to_string(),
            kind: MediaKind::Image,
        }
    }

    #[test]
    fn text_only_post_is_valid() {
        assert!(validate_post_input("hello", &[]).is_ok());
    }

    #[test]
    fn media_only_post_is_valid() {
        assert!(validate_post_input("", &[image("https://cdn.example/a.jpg")]).is_ok());
    }

    #[test]
    fn empty_post_is_rejected() {
        assert!(matches!(
            validate_post_input("   ", &[]),
            Err(ValidationError::EmptyPost)
        ));
    }

    #[test]
    fn media_overflow_is_rejected() {
        let media: Vec<_> = (0..=MAX_MEDIA_ITEMS)
            .map(|i| image(&format!("https://cdn.example/{i}.jpg")))
            .collect();
        assert!(matches!(
            validate_post_input("hi", &media),
            Err(ValidationError::TooManyMedia)
        ));
    }

    #[test]
    fn blank_media_url_is_rejected() {
        assert!(matches!(
            validate_post_input("hi", &[image(" ")]),
            Err(ValidationError::EmptyMediaUrl)
        ));
    }

    #[test]
    fn update_must_touch_a_field() {
        assert!(matches!(
            validate_post_update(None, None),
            Err(ValidationError::EmptyUpdate)
        ));
    }

    #[test]
    fn update_cannot_blank_out_a_post() {
        assert!(matches!(
            validate_post_update(Some("  "), None),
            Err(ValidationError::EmptyPost)
        ));
        // An empty media list is a clear, not an omission.
        assert!(matches!(
            validate_post_update(None, Some(&[])),
            Err(ValidationError::EmptyPost)
        ));
        assert!(matches!(
            validate_post_update(Some(""), Some(&[])),
            Err(ValidationError::EmptyPost)
        ));
        // Blanking one side is fine while the other brings content.
        assert!(validate_post_update(Some(""), Some(&[image("https://cdn.example/a.jpg")])).is_ok());
        assert!(validate_post_update(Some("text stays"), Some(&[])).is_ok());
    }

    #[test]
    fn update_media_follows_creation_rules() {
        let media: Vec<_> = (0..=MAX_MEDIA_ITEMS)
            .map(|i| image(&format!("https://cdn.example/{i}.jpg")))
            .collect();
        assert!(matches!(
            validate_post_update(None, Some(&media)),
            Err(ValidationError::TooManyMedia)
        ));
        assert!(matches!(
            validate_post_update(Some("text"), Some(&[image("")])),
            Err(ValidationError::EmptyMediaUrl)
        ));
    }

    #[test]
    fn media_kind_serializes_lowercase() {
        let item = image("https://cdn.example/clip.mp4");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "image");
        let parsed: MediaItem =
            serde_json::from_value(serde_json::json!({"url": "u", "type": "video"})).unwrap();
        assert_eq!(parsed.kind, MediaKind::Video);
    }
}
